//! Configuration handed to the driver at instance creation: display
//! geometry, timing bounds, and the per-register parameter blocks the
//! initialization sequencer writes.

use crate::command::{consts, Orientation};
use crate::error::Error;

/// The parameter bytes written to each controller register during
/// initialization. No defaults hide inside the sequencer: it sends exactly
/// what this block contains, and [`Default`] supplies the factory values
/// known to work with the reference panel wiring.
#[derive(Clone, Copy, Debug)]
pub struct HwConfig {
    pub(crate) power_control_a: [u8; 5],
    pub(crate) power_control_b: [u8; 3],
    pub(crate) driver_timing_a: [u8; 3],
    pub(crate) driver_timing_b: [u8; 2],
    pub(crate) power_on_sequence: [u8; 4],
    pub(crate) pump_ratio: u8,
    pub(crate) power_control_1: u8,
    pub(crate) power_control_2: u8,
    pub(crate) vcom_control_1: [u8; 2],
    pub(crate) vcom_control_2: u8,
    pub(crate) pixel_format: u8,
    pub(crate) frame_rate: [u8; 2],
    pub(crate) display_function: [u8; 3],
    pub(crate) gamma_3_enable: bool,
    pub(crate) gamma_curve: u8,
    pub(crate) positive_gamma: [u8; 15],
    pub(crate) negative_gamma: [u8; 15],
}

impl Default for HwConfig {
    fn default() -> Self {
        HwConfig {
            power_control_a: [0x39, 0x2C, 0x00, 0x34, 0x02],
            power_control_b: [0x00, 0xC1, 0x30],
            driver_timing_a: [0x85, 0x00, 0x78],
            driver_timing_b: [0x00, 0x00],
            power_on_sequence: [0x64, 0x03, 0x12, 0x81],
            pump_ratio: 0x20,
            power_control_1: 0x23,
            power_control_2: 0x10,
            vcom_control_1: [0x3E, 0x28],
            vcom_control_2: 0x86,
            pixel_format: 0x55,
            frame_rate: [0x00, 0x18],
            display_function: [0x08, 0x82, 0x27],
            gamma_3_enable: false,
            gamma_curve: 0x01,
            positive_gamma: [
                0x0F, 0x31, 0x2B, 0x0C, 0x0E, 0x08, 0x4E, 0xF1, 0x37, 0x07, 0x10, 0x03, 0x0E,
                0x09, 0x00,
            ],
            negative_gamma: [
                0x00, 0x0E, 0x14, 0x03, 0x11, 0x07, 0x31, 0xC1, 0x48, 0x08, 0x0F, 0x0C, 0x31,
                0x36, 0x0F,
            ],
        }
    }
}

impl HwConfig {
    /// Override the vendor power control A block.
    pub fn power_control_a(self, params: [u8; 5]) -> Self {
        Self {
            power_control_a: params,
            ..self
        }
    }

    /// Override the vendor power control B block.
    pub fn power_control_b(self, params: [u8; 3]) -> Self {
        Self {
            power_control_b: params,
            ..self
        }
    }

    /// Override the GVDD reference level (VRH, 6 bits).
    pub fn power_control_1(self, vrh: u8) -> Self {
        Self {
            power_control_1: vrh,
            ..self
        }
    }

    /// Override the step-up factor (BT, 3 bits).
    pub fn power_control_2(self, bt: u8) -> Self {
        Self {
            power_control_2: bt,
            ..self
        }
    }

    /// Override the VCOM high/low voltages (VMH/VML, 7 bits each).
    pub fn vcom_control_1(self, vmh: u8, vml: u8) -> Self {
        Self {
            vcom_control_1: [vmh, vml],
            ..self
        }
    }

    /// Override the VCOM offset byte.
    pub fn vcom_control_2(self, vmf: u8) -> Self {
        Self {
            vcom_control_2: vmf,
            ..self
        }
    }

    /// Override the pixel format byte. The default, 0x55, selects 16
    /// bit/pixel RGB565 on both the serial and RGB interfaces.
    pub fn pixel_format(self, format: u8) -> Self {
        Self {
            pixel_format: format,
            ..self
        }
    }

    /// Override the normal-mode frame rate (division ratio and RTNA line
    /// period).
    pub fn frame_rate(self, diva: u8, rtna: u8) -> Self {
        Self {
            frame_rate: [diva, rtna],
            ..self
        }
    }

    /// Override the display function control block.
    pub fn display_function(self, params: [u8; 3]) -> Self {
        Self {
            display_function: params,
            ..self
        }
    }

    /// Override the gamma curve selector and correction tables.
    pub fn gamma(self, curve: u8, positive: [u8; 15], negative: [u8; 15]) -> Self {
        Self {
            gamma_curve: curve,
            positive_gamma: positive,
            negative_gamma: negative,
            ..self
        }
    }
}

/// A configuration for one driver instance. Geometry and orientation are
/// mandatory; timing parameters and register blocks can be adjusted with the
/// builder methods or left at their defaults.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) orientation: Orientation,
    pub(crate) timeout_ms: u32,
    pub(crate) restart_delay_ms: u32,
    pub(crate) wakeup_delay_ms: u32,
    pub(crate) hw: HwConfig,
}

impl Config {
    /// Create a configuration for a panel of `width` x `height` pixels in
    /// the controller's native (unswapped) axes, displayed with the given
    /// default orientation.
    ///
    /// The timing defaults are a 50 ms single-transfer timeout and the
    /// datasheet's 120 ms settle time after software reset and sleep-out.
    pub fn new(width: u16, height: u16, orientation: Orientation) -> Self {
        Config {
            width,
            height,
            orientation,
            timeout_ms: 50,
            restart_delay_ms: 120,
            wakeup_delay_ms: 120,
            hw: HwConfig::default(),
        }
    }

    /// Maximum wait for a single transfer to become ready.
    pub fn timeout_ms(self, ms: u32) -> Self {
        Self {
            timeout_ms: ms,
            ..self
        }
    }

    /// Settle delay after the software reset command.
    pub fn restart_delay_ms(self, ms: u32) -> Self {
        Self {
            restart_delay_ms: ms,
            ..self
        }
    }

    /// Settle delay after the sleep-out command.
    pub fn wakeup_delay_ms(self, ms: u32) -> Self {
        Self {
            wakeup_delay_ms: ms,
            ..self
        }
    }

    /// Replace the register parameter blocks written at initialization.
    pub fn hw(self, hw: HwConfig) -> Self {
        Self { hw, ..self }
    }

    /// Check that the geometry fits the controller's frame memory and the
    /// timing bounds are usable.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        let (long, short) = if self.width >= self.height {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        };
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidParam);
        }
        if long > consts::NUM_ROWS || short > consts::NUM_COLS {
            return Err(Error::InvalidParam);
        }
        if self.timeout_ms == 0 {
            return Err(Error::InvalidParam);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_validates() {
        assert!(Config::new(240, 320, Orientation::Horizontal)
            .validate()
            .is_ok());
        assert!(Config::new(320, 240, Orientation::Vertical)
            .validate()
            .is_ok());
    }

    #[test]
    fn zero_or_oversized_geometry_is_rejected() {
        let invalid = [(0, 320), (240, 0), (240, 321), (250, 250), (321, 100)];
        for &(w, h) in invalid.iter() {
            assert_eq!(
                Config::new(w, h, Orientation::Horizontal).validate(),
                Err(Error::InvalidParam),
                "{}x{}",
                w,
                h
            );
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert_eq!(
            Config::new(240, 320, Orientation::Horizontal)
                .timeout_ms(0)
                .validate(),
            Err(Error::InvalidParam)
        );
    }

    #[test]
    fn builders_override_register_blocks() {
        let cfg = Config::new(240, 320, Orientation::Horizontal)
            .timeout_ms(10)
            .hw(HwConfig::default()
                .power_control_1(0x21)
                .vcom_control_1(0x31, 0x3C)
                .frame_rate(0x00, 0x1B));
        assert_eq!(cfg.timeout_ms, 10);
        assert_eq!(cfg.hw.power_control_1, 0x21);
        assert_eq!(cfg.hw.vcom_control_1, [0x31, 0x3C]);
        assert_eq!(cfg.hw.frame_rate, [0x00, 0x1B]);
        // Untouched blocks keep their factory defaults.
        assert_eq!(cfg.hw.pump_ratio, 0x20);
        assert_eq!(cfg.hw.pixel_format, 0x55);
    }
}
