//! The hardware capability contract the driver core consumes, and the
//! `embedded-hal` implementation of it.

/// Logical state of a control line. The mapping to electrical levels (the
/// reset and chip-select lines of the ILI9341 are active low) is the
/// implementation's concern; the core only speaks in assertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinState {
    Asserted,
    Deasserted,
}

/// What the bytes of the next transfer mean to the controller, as signalled
/// on the data/command select line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Command,
    Data,
}

/// The five capabilities a driver instance needs from its hardware channel.
///
/// One implementation is bound per instance at creation and never swapped.
/// Two instances must bind physically distinct channels; nothing in the core
/// arbitrates a shared bus.
pub trait DisplayChannel {
    /// Start transferring `bytes` and return. The transfer may still be in
    /// flight when this returns; the core polls [`transfer_ready`] before
    /// starting another one.
    ///
    /// [`transfer_ready`]: DisplayChannel::transfer_ready
    fn transfer(&mut self, bytes: &[u8]) -> Result<(), ()>;

    /// True exactly when the last started transfer has completed and a new
    /// one may begin.
    fn transfer_ready(&mut self) -> bool;

    fn set_reset(&mut self, state: PinState);

    fn set_chip_select(&mut self, state: PinState);

    fn set_mode(&mut self, mode: Mode);
}

pub mod spi {
    //! [`DisplayChannel`] over an `embedded-hal` SPI master and three GPIO
    //! output pins. The ILI9341's serial interface is the common "4-wire"
    //! arrangement: 8-bit SPI words plus a D/C select line.

    use embedded_hal as hal;
    use hal::digital::v2::OutputPin;
    use nb::block;

    use super::{DisplayChannel, Mode, PinState};

    pub struct SpiChannel<SPI, RST, CS, DC> {
        spi: SPI,
        /// Output pin on the RESX line (active low).
        rst: RST,
        /// Output pin on the CSX line (active low).
        cs: CS,
        /// Output pin on the D/CX line (low selects command).
        dc: DC,
    }

    impl<SPI, RST, CS, DC> SpiChannel<SPI, RST, CS, DC>
    where
        SPI: hal::spi::FullDuplex<u8>,
        RST: OutputPin,
        CS: OutputPin,
        DC: OutputPin,
    {
        pub fn new(spi: SPI, rst: RST, cs: CS, dc: DC) -> Self {
            Self { spi, rst, cs, dc }
        }
    }

    impl<SPI, RST, CS, DC> DisplayChannel for SpiChannel<SPI, RST, CS, DC>
    where
        SPI: hal::spi::FullDuplex<u8>,
        RST: OutputPin,
        CS: OutputPin,
        DC: OutputPin,
    {
        fn transfer(&mut self, bytes: &[u8]) -> Result<(), ()> {
            for &byte in bytes {
                block!(self.spi.send(byte)).map_err(|_| ())?;
                block!(self.spi.read()).map_err(|_| ())?;
            }
            Ok(())
        }

        fn transfer_ready(&mut self) -> bool {
            // `transfer` completes the words synchronously, so the channel
            // is idle whenever control returns to the core.
            true
        }

        fn set_reset(&mut self, state: PinState) {
            let _ = match state {
                PinState::Asserted => self.rst.set_low(),
                PinState::Deasserted => self.rst.set_high(),
            };
        }

        fn set_chip_select(&mut self, state: PinState) {
            let _ = match state {
                PinState::Asserted => self.cs.set_low(),
                PinState::Deasserted => self.cs.set_high(),
            };
        }

        fn set_mode(&mut self, mode: Mode) {
            let _ = match mode {
                Mode::Command => self.dc.set_low(),
                Mode::Data => self.dc.set_high(),
            };
        }
    }
}
