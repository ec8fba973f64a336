//! The command set for the ILI9341.
//!
//! Note 1: The controller's frame memory is fixed at 240 columns by 320
//! rows. The column and page address windows are given as 16-bit start/end
//! pairs; which logical axis maps to columns depends on the row/column
//! exchange bit of the memory access register, so both windows accept the
//! full 0-319 range here and the driver checks them against the current
//! orientation-adjusted dimensions.

use crate::bus::Bus;
use crate::clock::Clock;
use crate::error::{Error, Outcome};
use crate::interface::DisplayChannel;

pub mod consts {
    /// Frame memory columns in the controller's native (unswapped) axis.
    pub const NUM_COLS: u16 = 240;
    /// Frame memory rows in the controller's native (unswapped) axis.
    pub const NUM_ROWS: u16 = 320;
    pub const COL_MAX: u16 = NUM_COLS - 1;
    pub const ROW_MAX: u16 = NUM_ROWS - 1;
}

// Memory access register (MADCTL) bit assignments.
const MADCTL_MY: u8 = 0x80;
const MADCTL_MX: u8 = 0x40;
const MADCTL_MV: u8 = 0x20;
const MADCTL_BGR: u8 = 0x08;

/// Scan-direction transform applied by the memory access register. The
/// `Horizontal` variants keep the configured width/height; the `Vertical`
/// variants exchange rows and columns, swapping the logical dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    HorizontalFlipped,
    Vertical,
    VerticalFlipped,
}

impl Orientation {
    /// True when this orientation exchanges rows and columns, so the
    /// logical width/height swap relative to the configured defaults.
    pub fn swaps_axes(self) -> bool {
        match self {
            Orientation::Horizontal | Orientation::HorizontalFlipped => false,
            Orientation::Vertical | Orientation::VerticalFlipped => true,
        }
    }

    /// The memory access control byte: row/column exchange and ordering
    /// bits, with BGR panel ordering always selected.
    pub fn madctl(self) -> u8 {
        match self {
            Orientation::Horizontal => MADCTL_BGR,
            Orientation::HorizontalFlipped => MADCTL_MX | MADCTL_MY | MADCTL_BGR,
            Orientation::Vertical => MADCTL_MV | MADCTL_BGR,
            Orientation::VerticalFlipped => MADCTL_MV | MADCTL_MX | MADCTL_MY | MADCTL_BGR,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Command {
    /// No-op.
    Nop,
    /// Software reset. The controller needs a settle delay before it will
    /// accept further commands; the initialization sequencer provides it.
    SoftwareReset,
    /// Enter the minimum-power sleep mode.
    EnterSleep,
    /// Leave sleep mode. The controller needs a wakeup settle delay before
    /// display-on produces a stable image.
    SleepOut,
    /// Disable display inversion.
    InversionOff,
    /// Enable display inversion.
    InversionOn,
    /// Select the gamma curve. The argument is a one-hot selector; only
    /// curve 1 (0x01) is defined on current silicon, 0x02/0x04/0x08 are
    /// reserved encodings the register nonetheless accepts.
    GammaSet(u8),
    /// Turn the display off (output blanked, frame memory retained).
    DisplayOff,
    /// Turn the display on.
    DisplayOn,
    /// Set the column start and end address of the active window. Start
    /// must not exceed end. (Note 1)
    SetColumnAddress(u16, u16),
    /// Set the page (row) start and end address of the active window.
    /// Start must not exceed end. (Note 1)
    SetPageAddress(u16, u16),
    /// Arm the controller to accept pixel data for the active window.
    WriteMemory,
    /// Set the memory access control register from an orientation.
    SetMemoryAccess(Orientation),
    /// Set the pixel format (DPI/DBI fields packed as the register wants
    /// them; 0x55 selects 16 bit/pixel on both interfaces).
    SetPixelFormat(u8),
    /// Frame rate control for normal mode: internal clock division ratio
    /// (2 bits) and line period RTNA (5 bits).
    SetFrameRate(u8, u8),
    /// Display function control block, raw per the datasheet.
    SetDisplayFunction([u8; 3]),
    /// GVDD level, 6-bit VRH field.
    PowerControl1(u8),
    /// Step-up factor, 3-bit BT field.
    PowerControl2(u8),
    /// VCOM high and low voltages, 7-bit VMH and VML fields.
    VcomControl1(u8, u8),
    /// VCOM offset, raw (top bit enables the NV-stored value).
    VcomControl2(u8),
    /// Vendor power control block A, raw factory bytes.
    PowerControlA([u8; 5]),
    /// Vendor power control block B, raw factory bytes.
    PowerControlB([u8; 3]),
    /// Driver timing control A, raw factory bytes.
    DriverTimingA([u8; 3]),
    /// Driver timing control B, raw factory bytes.
    DriverTimingB([u8; 2]),
    /// Power-on sequence control, raw factory bytes.
    PowerOnSequence([u8; 4]),
    /// Charge pump ratio control.
    PumpRatio(u8),
    /// Enable or disable the 3-gamma interpolation feature.
    Enable3Gamma(bool),
    /// Positive gamma correction table.
    PositiveGamma([u8; 15]),
    /// Negative gamma correction table.
    NegativeGamma([u8; 15]),
}

macro_rules! ok_command {
    ($buf:ident, $cmd:expr, []) => {
        Ok(($cmd, &$buf[..0]))
    };
    ($buf:ident, $cmd:expr, $params:expr) => {{
        let params = $params;
        let len = params.len();
        $buf[..len].copy_from_slice(&params[..]);
        Ok(($cmd, &$buf[..len]))
    }};
}

impl Command {
    /// Transmit this command and its parameter bytes over `bus`.
    ///
    /// Parameter validation failures are reported before anything is put on
    /// the wire. Once transmission starts, a failing sub-step does not stop
    /// the remaining bytes; the first failure is surfaced once at the end.
    pub fn send<CH, C>(self, bus: &mut Bus<CH, C>) -> Result<(), Error>
    where
        CH: DisplayChannel,
        C: Clock,
    {
        let mut arg_buf = [0u8; 15];
        let (cmd, data) = match self {
            Command::Nop => ok_command!(arg_buf, 0x00, []),
            Command::SoftwareReset => ok_command!(arg_buf, 0x01, []),
            Command::EnterSleep => ok_command!(arg_buf, 0x10, []),
            Command::SleepOut => ok_command!(arg_buf, 0x11, []),
            Command::InversionOff => ok_command!(arg_buf, 0x20, []),
            Command::InversionOn => ok_command!(arg_buf, 0x21, []),
            Command::GammaSet(curve) => match curve {
                0x01 | 0x02 | 0x04 | 0x08 => ok_command!(arg_buf, 0x26, [curve]),
                _ => Err(Error::InvalidParam),
            },
            Command::DisplayOff => ok_command!(arg_buf, 0x28, []),
            Command::DisplayOn => ok_command!(arg_buf, 0x29, []),
            Command::SetColumnAddress(start, end) => match (start, end) {
                (s, e) if s <= e && e <= consts::ROW_MAX => ok_command!(
                    arg_buf,
                    0x2A,
                    [(start >> 8) as u8, start as u8, (end >> 8) as u8, end as u8]
                ),
                _ => Err(Error::InvalidParam),
            },
            Command::SetPageAddress(start, end) => match (start, end) {
                (s, e) if s <= e && e <= consts::ROW_MAX => ok_command!(
                    arg_buf,
                    0x2B,
                    [(start >> 8) as u8, start as u8, (end >> 8) as u8, end as u8]
                ),
                _ => Err(Error::InvalidParam),
            },
            Command::WriteMemory => ok_command!(arg_buf, 0x2C, []),
            Command::SetMemoryAccess(orientation) => {
                ok_command!(arg_buf, 0x36, [orientation.madctl()])
            }
            Command::SetPixelFormat(format) => ok_command!(arg_buf, 0x3A, [format]),
            Command::SetFrameRate(diva, rtna) => match (diva, rtna) {
                (0..=0x03, 0x00..=0x1F) => ok_command!(arg_buf, 0xB1, [diva, rtna]),
                _ => Err(Error::InvalidParam),
            },
            Command::SetDisplayFunction(params) => ok_command!(arg_buf, 0xB6, params),
            Command::PowerControl1(vrh) => match vrh {
                0..=0x3F => ok_command!(arg_buf, 0xC0, [vrh]),
                _ => Err(Error::InvalidParam),
            },
            Command::PowerControl2(bt) => match bt {
                0..=0x07 => ok_command!(arg_buf, 0xC1, [bt]),
                _ => Err(Error::InvalidParam),
            },
            Command::VcomControl1(vmh, vml) => match (vmh, vml) {
                (0..=0x7F, 0..=0x7F) => ok_command!(arg_buf, 0xC5, [vmh, vml]),
                _ => Err(Error::InvalidParam),
            },
            Command::VcomControl2(vmf) => ok_command!(arg_buf, 0xC7, [vmf]),
            Command::PowerControlA(params) => ok_command!(arg_buf, 0xCB, params),
            Command::PowerControlB(params) => ok_command!(arg_buf, 0xCF, params),
            Command::DriverTimingA(params) => ok_command!(arg_buf, 0xE8, params),
            Command::DriverTimingB(params) => ok_command!(arg_buf, 0xEA, params),
            Command::PowerOnSequence(params) => ok_command!(arg_buf, 0xED, params),
            Command::PumpRatio(ratio) => ok_command!(arg_buf, 0xF7, [ratio]),
            Command::Enable3Gamma(enable) => ok_command!(
                arg_buf,
                0xF2,
                [match enable {
                    true => 0x03,
                    false => 0x00,
                }]
            ),
            Command::PositiveGamma(table) => ok_command!(arg_buf, 0xE0, table),
            Command::NegativeGamma(table) => ok_command!(arg_buf, 0xE1, table),
        }?;
        let mut outcome = Outcome::new();
        outcome.record(bus.send_command(cmd));
        if !data.is_empty() {
            outcome.record(bus.send_data(data));
        }
        outcome.into_result()
    }
}
