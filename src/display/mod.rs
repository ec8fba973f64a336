//! The driver state machine for one panel: the initialization sequencer,
//! orientation and address-window tracking, and the chunked pixel streamer.


use itertools::repeat_n;

use crate::bus::Bus;
use crate::clock::Clock;
use crate::command::Command;
use crate::config::Config;
use crate::error::{Error, Outcome};
use crate::interface::{DisplayChannel, PinState};
use crate::Orientation;

/// A pixel coordinate pair of `x` (column axis) and `y` (row axis), in the
/// current orientation's logical frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coord(pub u16, pub u16);

/// Size of the chunk buffer a solid fill streams through. Pixel payloads of
/// any length pass through this much stack at a time while chip select stays
/// asserted across the whole stream.
const FILL_CHUNK_LEN: usize = 128;

/// A driver instance for one ILI9341-controlled panel.
pub struct Display<CH, C> {
    bus: Bus<CH, C>,
    default_width: u16,
    default_height: u16,
    current_width: u16,
    current_height: u16,
    default_orientation: Orientation,
    current_orientation: Orientation,
    restart_delay_ms: u32,
    wakeup_delay_ms: u32,
    /// The last address window sent to the controller; the streamer derives
    /// its pixel count from this.
    region: Option<(Coord, Coord)>,
}

impl<CH, C> Display<CH, C>
where
    CH: DisplayChannel,
    C: Clock,
{
    pub(crate) fn new(chan: CH, clock: C, config: &Config) -> Self {
        Display {
            bus: Bus::new(chan, clock, config.timeout_ms),
            default_width: config.width,
            default_height: config.height,
            current_width: config.width,
            current_height: config.height,
            default_orientation: config.orientation,
            current_orientation: config.orientation,
            restart_delay_ms: config.restart_delay_ms,
            wakeup_delay_ms: config.wakeup_delay_ms,
            region: None,
        }
    }

    pub(crate) fn clock(&self) -> &C {
        self.bus.clock()
    }

    /// Orientation-adjusted logical width.
    pub fn width(&self) -> u16 {
        self.current_width
    }

    /// Orientation-adjusted logical height.
    pub fn height(&self) -> u16 {
        self.current_height
    }

    pub fn orientation(&self) -> Orientation {
        self.current_orientation
    }

    /// The active address window, if one has been set.
    pub fn region(&self) -> Option<(Coord, Coord)> {
        self.region
    }

    /// Run the controller's power-up script: reset, the register parameter
    /// blocks in the mandated order, sleep-out, display-on, then the default
    /// orientation and a full-screen address window.
    ///
    /// A failing step does not abort the script. Stopping halfway leaves
    /// the controller in a worse, partially configured state than writing
    /// the remaining registers, so the sequence always runs to completion
    /// and the first failure is reported at the end.
    pub(crate) fn init(&mut self, config: &Config) -> Result<(), Error> {
        let hw = &config.hw;
        self.bus.set_reset(PinState::Deasserted);

        let mut outcome = Outcome::new();
        outcome.record(Command::SoftwareReset.send(&mut self.bus));
        self.bus.delay_ms(self.restart_delay_ms);

        outcome.record(Command::PowerControlA(hw.power_control_a).send(&mut self.bus));
        outcome.record(Command::PowerControlB(hw.power_control_b).send(&mut self.bus));
        outcome.record(Command::DriverTimingA(hw.driver_timing_a).send(&mut self.bus));
        outcome.record(Command::DriverTimingB(hw.driver_timing_b).send(&mut self.bus));
        outcome.record(Command::PowerOnSequence(hw.power_on_sequence).send(&mut self.bus));
        outcome.record(Command::PumpRatio(hw.pump_ratio).send(&mut self.bus));
        outcome.record(Command::PowerControl1(hw.power_control_1).send(&mut self.bus));
        outcome.record(Command::PowerControl2(hw.power_control_2).send(&mut self.bus));
        outcome.record(
            Command::VcomControl1(hw.vcom_control_1[0], hw.vcom_control_1[1])
                .send(&mut self.bus),
        );
        outcome.record(Command::VcomControl2(hw.vcom_control_2).send(&mut self.bus));
        outcome.record(Command::SetMemoryAccess(self.default_orientation).send(&mut self.bus));
        outcome.record(Command::SetPixelFormat(hw.pixel_format).send(&mut self.bus));
        outcome.record(
            Command::SetFrameRate(hw.frame_rate[0], hw.frame_rate[1]).send(&mut self.bus),
        );
        outcome.record(Command::SetDisplayFunction(hw.display_function).send(&mut self.bus));
        outcome.record(Command::Enable3Gamma(hw.gamma_3_enable).send(&mut self.bus));
        outcome.record(Command::GammaSet(hw.gamma_curve).send(&mut self.bus));
        outcome.record(Command::PositiveGamma(hw.positive_gamma).send(&mut self.bus));
        outcome.record(Command::NegativeGamma(hw.negative_gamma).send(&mut self.bus));

        outcome.record(Command::SleepOut.send(&mut self.bus));
        self.bus.delay_ms(self.wakeup_delay_ms);
        outcome.record(Command::DisplayOn.send(&mut self.bus));

        outcome.record(self.set_orientation(self.default_orientation));
        outcome.record(self.set_region(
            Coord(0, 0),
            Coord(self.current_width - 1, self.current_height - 1),
        ));
        outcome.into_result()
    }

    /// Change the scan-direction transform. Recomputes the logical
    /// dimensions and writes the memory access register.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), Error> {
        let mut outcome = Outcome::new();
        outcome.record(Command::SetMemoryAccess(orientation).send(&mut self.bus));
        let (width, height) = if orientation.swaps_axes() {
            (self.default_height, self.default_width)
        } else {
            (self.default_width, self.default_height)
        };
        self.current_width = width;
        self.current_height = height;
        self.current_orientation = orientation;
        outcome.into_result()
    }

    /// Set the address window for subsequent pixel writes and arm the
    /// controller's memory-write mode.
    ///
    /// Both corners are inclusive and must lie inside the current logical
    /// dimensions. An inverted window (bottom-right above or left of
    /// top-left) is stored but describes zero pixels, so later fills send
    /// nothing.
    pub fn set_region(&mut self, top_left: Coord, bottom_right: Coord) -> Result<(), Error> {
        if bottom_right.0 >= self.current_width || bottom_right.1 >= self.current_height {
            return Err(Error::InvalidParam);
        }
        self.region = Some((top_left, bottom_right));
        let mut outcome = Outcome::new();
        outcome.record(Command::SetColumnAddress(top_left.0, bottom_right.0).send(&mut self.bus));
        outcome.record(Command::SetPageAddress(top_left.1, bottom_right.1).send(&mut self.bus));
        outcome.record(Command::WriteMemory.send(&mut self.bus));
        outcome.into_result()
    }

    /// Pixels described by the active window, zero when no window has been
    /// set or the window is inverted.
    fn region_pixel_count(&self) -> u32 {
        match self.region {
            Some((tl, br)) if br.0 >= tl.0 && br.1 >= tl.1 => {
                (u32::from(br.0 - tl.0) + 1) * (u32::from(br.1 - tl.1) + 1)
            }
            _ => 0,
        }
    }

    /// Fill the active window with one RGB565 color.
    pub fn fill(&mut self, color: u16) -> Result<(), Error> {
        let count = self.region_pixel_count();
        self.push_pixels(repeat_n(color, count as usize), FILL_CHUNK_LEN)
    }

    /// Stream RGB565 pixels from an iterator into the active window. The
    /// caller provides exactly as many pixels as the window holds; the
    /// controller wraps surplus pixels into the window again rather than
    /// detecting the mismatch.
    pub fn draw_pixels<I>(&mut self, pixels: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = u16>,
    {
        self.push_pixels(pixels.into_iter(), FILL_CHUNK_LEN)
    }

    /// Write caller-encoded pixel bytes into the active window as a single
    /// data transfer. The bytes must already be in the controller's wire
    /// format; a size that does not match the window is visual corruption,
    /// not a detected error.
    pub fn draw_raw(&mut self, buffer: &[u8]) -> Result<(), Error> {
        self.bus.send_data(buffer)
    }

    /// Enter or leave sleep mode. Leaving waits out the wakeup settle
    /// delay before returning.
    pub fn sleep(&mut self, enable: bool) -> Result<(), Error> {
        if enable {
            Command::EnterSleep.send(&mut self.bus)
        } else {
            let result = Command::SleepOut.send(&mut self.bus);
            self.bus.delay_ms(self.wakeup_delay_ms);
            result
        }
    }

    /// Enable or disable display inversion.
    pub fn invert(&mut self, enable: bool) -> Result<(), Error> {
        if enable {
            Command::InversionOn.send(&mut self.bus)
        } else {
            Command::InversionOff.send(&mut self.bus)
        }
    }

    /// The chunked-transfer core shared by `fill` and `draw_pixels`: encode
    /// pixels low byte first into a bounded buffer and transfer it whenever
    /// it runs full, all under one chip-select span. The final chunk is
    /// however much remains, and an empty remainder sends nothing.
    fn push_pixels<I>(&mut self, mut pixels: I, chunk_len: usize) -> Result<(), Error>
    where
        I: Iterator<Item = u16>,
    {
        let mut buf = [0u8; FILL_CHUNK_LEN];
        let chunk_len = chunk_len.min(buf.len()).max(2) & !1;

        self.bus.begin_data();
        let mut outcome = Outcome::new();
        loop {
            let mut filled = 0;
            while filled < chunk_len {
                match pixels.next() {
                    Some(pixel) => {
                        buf[filled] = pixel as u8;
                        buf[filled + 1] = (pixel >> 8) as u8;
                        filled += 2;
                    }
                    None => break,
                }
            }
            if filled > 0 {
                outcome.record(self.bus.write_chunk(&buf[..filled]));
            }
            if filled < chunk_len {
                break;
            }
        }
        outcome.record(self.bus.end_data());
        outcome.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::SimClock;
    use crate::interface::test_spy::{Sent, TestSpyChannel};

    fn display(
        config: &Config,
    ) -> (TestSpyChannel, Display<TestSpyChannel, SimClock>) {
        let spy = TestSpyChannel::new();
        let disp = Display::new(spy.split(), SimClock::new(), config);
        (spy, disp)
    }

    fn initialized(
        config: &Config,
    ) -> (TestSpyChannel, Display<TestSpyChannel, SimClock>) {
        let (spy, mut disp) = display(config);
        disp.init(config).unwrap();
        spy.clear();
        (spy, disp)
    }

    #[test]
    fn init_defaults() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (spy, mut disp) = display(&config);
        disp.init(&config).unwrap();
        #[cfg_attr(rustfmt, rustfmt_skip)]
        spy.check_multi(sends!(
            0x01, // software reset
            0xCB, [0x39, 0x2C, 0x00, 0x34, 0x02], // power control A
            0xCF, [0x00, 0xC1, 0x30], // power control B
            0xE8, [0x85, 0x00, 0x78], // driver timing A
            0xEA, [0x00, 0x00], // driver timing B
            0xED, [0x64, 0x03, 0x12, 0x81], // power-on sequence
            0xF7, [0x20], // pump ratio
            0xC0, [0x23], // power control 1
            0xC1, [0x10], // power control 2
            0xC5, [0x3E, 0x28], // VCOM control 1
            0xC7, [0x86], // VCOM control 2
            0x36, [0x08], // memory access, default orientation
            0x3A, [0x55], // pixel format RGB565
            0xB1, [0x00, 0x18], // frame rate
            0xB6, [0x08, 0x82, 0x27], // display function
            0xF2, [0x00], // 3-gamma disabled
            0x26, [0x01], // gamma curve 1
            0xE0, [0x0F, 0x31, 0x2B, 0x0C, 0x0E, 0x08, 0x4E, 0xF1,
                   0x37, 0x07, 0x10, 0x03, 0x0E, 0x09, 0x00], // positive gamma
            0xE1, [0x00, 0x0E, 0x14, 0x03, 0x11, 0x07, 0x31, 0xC1,
                   0x48, 0x08, 0x0F, 0x0C, 0x31, 0x36, 0x0F], // negative gamma
            0x11, // sleep out
            0x29, // display on
            0x36, [0x08], // default orientation applied
            0x2A, [0x00, 0x00, 0x00, 0xEF], // full-screen columns
            0x2B, [0x00, 0x00, 0x01, 0x3F], // full-screen rows
            0x2C // memory write armed
        ));
        assert_eq!(disp.width(), 240);
        assert_eq!(disp.height(), 320);
        assert_eq!(disp.region(), Some((Coord(0, 0), Coord(239, 319))));
    }

    #[test]
    fn orientation_keeps_or_swaps_dimensions() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (_spy, mut disp) = initialized(&config);

        for &orientation in &[Orientation::Horizontal, Orientation::HorizontalFlipped] {
            disp.set_orientation(orientation).unwrap();
            assert_eq!((disp.width(), disp.height()), (240, 320));
        }
        for &orientation in &[Orientation::Vertical, Orientation::VerticalFlipped] {
            disp.set_orientation(orientation).unwrap();
            assert_eq!((disp.width(), disp.height()), (320, 240));
        }
    }

    #[test]
    fn orientation_change_emits_one_madctl_write() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (spy, mut disp) = initialized(&config);
        disp.set_orientation(Orientation::Vertical).unwrap();
        assert_eq!((disp.width(), disp.height()), (320, 240));
        // Bit 3 (BGR) and bit 5 (row/column exchange), nothing else.
        spy.check_multi(sends!(0x36, [0x28]));
    }

    #[test]
    fn set_region_emits_window_and_arms_write() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (spy, mut disp) = initialized(&config);
        disp.set_region(Coord(10, 20), Coord(49, 89)).unwrap();
        #[cfg_attr(rustfmt, rustfmt_skip)]
        spy.check_multi(sends!(
            0x2A, [0x00, 0x0A, 0x00, 0x31],
            0x2B, [0x00, 0x14, 0x00, 0x59],
            0x2C
        ));
    }

    #[test]
    fn set_region_bounds_follow_orientation() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (spy, mut disp) = initialized(&config);
        // 300 exceeds the 240-wide horizontal frame.
        assert_eq!(
            disp.set_region(Coord(0, 0), Coord(300, 10)),
            Err(Error::InvalidParam)
        );
        spy.check_multi(&[]);
        // After swapping axes the same x is addressable.
        disp.set_orientation(Orientation::Vertical).unwrap();
        spy.clear();
        disp.set_region(Coord(0, 0), Coord(300, 10)).unwrap();
        #[cfg_attr(rustfmt, rustfmt_skip)]
        spy.check_multi(sends!(
            0x2A, [0x00, 0x00, 0x01, 0x2C],
            0x2B, [0x00, 0x00, 0x00, 0x0A],
            0x2C
        ));
    }

    #[test]
    fn fill_emits_two_bytes_per_pixel_low_byte_first() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (spy, mut disp) = initialized(&config);
        disp.set_region(Coord(0, 0), Coord(9, 9)).unwrap();
        spy.clear();
        disp.fill(0xF800).unwrap();
        let bytes = spy.data_bytes();
        assert_eq!(bytes.len(), 200);
        for pair in bytes.chunks(2) {
            assert_eq!(pair, &[0x00, 0xF8]);
        }
        // 200 bytes pass through the 128-byte chunk buffer as one full
        // chunk plus the remainder, under a single chip-select span.
        assert_eq!(spy.data_chunk_sizes(), vec![128, 72]);
        assert_eq!(spy.cs_asserts(), 1);
        assert!(spy.cs_is_deasserted());
    }

    #[test]
    fn fill_exact_chunk_multiple_sends_no_empty_tail() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (spy, mut disp) = initialized(&config);
        // 8x8 pixels = 128 bytes = exactly one chunk.
        disp.set_region(Coord(0, 0), Coord(7, 7)).unwrap();
        spy.clear();
        disp.fill(0x07E0).unwrap();
        assert_eq!(spy.data_chunk_sizes(), vec![128]);
    }

    #[test]
    fn fill_total_is_chunk_size_invariant() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        for &chunk_len in &[2usize, 16, 50, 128] {
            let (spy, mut disp) = initialized(&config);
            disp.set_region(Coord(0, 0), Coord(9, 9)).unwrap();
            spy.clear();
            disp.push_pixels(repeat_n(0x1234u16, 100), chunk_len).unwrap();
            assert_eq!(spy.data_bytes().len(), 200, "chunk_len {}", chunk_len);
        }
    }

    #[test]
    fn fill_without_region_is_zero_work() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (spy, mut disp) = display(&config);
        disp.fill(0xFFFF).unwrap();
        assert_eq!(spy.data_bytes().len(), 0);
    }

    #[test]
    fn inverted_region_fills_nothing() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (spy, mut disp) = initialized(&config);
        // Caller contract violation: reported, stored, streams zero pixels.
        assert_eq!(
            disp.set_region(Coord(5, 5), Coord(2, 2)),
            Err(Error::InvalidParam)
        );
        spy.clear();
        disp.fill(0xFFFF).unwrap();
        assert_eq!(spy.data_bytes().len(), 0);
    }

    #[test]
    fn draw_raw_passes_bytes_through() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (spy, mut disp) = initialized(&config);
        disp.draw_raw(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        spy.check_multi(sends!([0xDE, 0xAD, 0xBE, 0xEF]));
    }

    #[test]
    fn draw_pixels_encodes_low_byte_first() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (spy, mut disp) = initialized(&config);
        disp.set_region(Coord(0, 0), Coord(2, 0)).unwrap();
        spy.clear();
        disp.draw_pixels([0xF800u16, 0x07E0, 0x001F].iter().cloned())
            .unwrap();
        assert_eq!(
            spy.data_bytes(),
            vec![0x00, 0xF8, 0xE0, 0x07, 0x1F, 0x00]
        );
    }

    #[test]
    fn sleep_and_inversion_commands() {
        let config = Config::new(240, 320, Orientation::Horizontal);
        let (spy, mut disp) = initialized(&config);
        disp.sleep(true).unwrap();
        disp.sleep(false).unwrap();
        disp.invert(true).unwrap();
        disp.invert(false).unwrap();
        spy.check_multi(sends!(0x10, 0x11, 0x21, 0x20));
    }
}
