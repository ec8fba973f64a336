//! The transaction engine: framed command/data transfers over a
//! [`DisplayChannel`] with bounded readiness polling.
//!
//! Every transaction is either a 1-byte command (D/C line low) or an N-byte
//! parameter/pixel payload (D/C line high), framed by a chip-select
//! assert/deassert. The channel's transfer primitive is non-blocking, so the
//! engine waits for readiness before starting a transfer and again before
//! releasing chip select, each wait bounded by the configured timeout.

use crate::clock::{self, Clock};
use crate::error::{Error, Outcome};
use crate::interface::{DisplayChannel, Mode, PinState};

pub struct Bus<CH, C> {
    chan: CH,
    clock: C,
    timeout_ms: u32,
}

impl<CH, C> Bus<CH, C>
where
    CH: DisplayChannel,
    C: Clock,
{
    pub fn new(chan: CH, clock: C, timeout_ms: u32) -> Self {
        Bus {
            chan,
            clock,
            timeout_ms,
        }
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }

    pub fn set_reset(&mut self, state: PinState) {
        self.chan.set_reset(state);
    }

    /// Busy-wait for a fixed settle time.
    pub fn delay_ms(&mut self, ms: u32) {
        clock::delay(&mut self.clock, ms);
    }

    fn wait_ready(&mut self) -> Result<(), Error> {
        let chan = &mut self.chan;
        clock::wait_until(&mut self.clock, self.timeout_ms, || chan.transfer_ready())
    }

    fn framed(&mut self, mode: Mode, bytes: &[u8]) -> Result<(), Error> {
        self.chan.set_mode(mode);
        self.chan.set_chip_select(PinState::Asserted);
        let mut outcome = Outcome::new();
        outcome.record(self.wait_ready());
        // A failed wait does not skip the transfer: matching the best-effort
        // policy, every sub-step still runs and the first failure is
        // reported once at the end.
        outcome.record(self.chan.transfer(bytes).map_err(|_| Error::CommTimeout));
        outcome.record(self.wait_ready());
        self.chan.set_chip_select(PinState::Deasserted);
        outcome.into_result()
    }

    /// Send a single command opcode.
    pub fn send_command(&mut self, code: u8) -> Result<(), Error> {
        self.framed(Mode::Command, &[code])
    }

    /// Send a parameter or pixel payload under its own chip-select frame.
    /// An empty payload is a no-op, not an empty transfer.
    pub fn send_data(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.framed(Mode::Data, bytes)
    }

    /// Open a data span: several [`write_chunk`] transfers under one
    /// chip-select assertion, closed by [`end_data`]. Used by the region
    /// streamer to avoid re-toggling chip select per chunk.
    ///
    /// [`write_chunk`]: Bus::write_chunk
    /// [`end_data`]: Bus::end_data
    pub fn begin_data(&mut self) {
        self.chan.set_mode(Mode::Data);
        self.chan.set_chip_select(PinState::Asserted);
    }

    /// Transfer one chunk inside an open data span.
    pub fn write_chunk(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let mut outcome = Outcome::new();
        outcome.record(self.wait_ready());
        outcome.record(self.chan.transfer(bytes).map_err(|_| Error::CommTimeout));
        outcome.into_result()
    }

    /// Close a data span. Chip select is released even when the final
    /// readiness wait times out, so the bus is never left asserted.
    pub fn end_data(&mut self) -> Result<(), Error> {
        let result = self.wait_ready();
        self.chan.set_chip_select(PinState::Deasserted);
        result
    }
}
