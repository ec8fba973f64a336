//! A fixed-capacity registry of driver instances, for firmware that owns a
//! known small number of panels and wants one place to create them and one
//! place to tick their timebases from an interrupt.

use crate::clock::{Clock, Tick};
use crate::config::Config;
use crate::display::Display;
use crate::error::Error;
use crate::interface::DisplayChannel;

/// How many driver instances a pool can hold.
pub const MAX_DRIVERS_CNT: usize = 2;

/// An opaque handle to an instance inside a [`DriverPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriverSlot(usize);

/// Storage for up to [`MAX_DRIVERS_CNT`] driver instances.
///
/// Slots are claimed at creation and never released. A create that fails
/// during hardware initialization still consumes its slot: the channel and
/// clock have been moved into it and the controller may be half configured,
/// so the slot is not safe to hand out again.
pub struct DriverPool<CH, C> {
    slots: [Option<Display<CH, C>>; MAX_DRIVERS_CNT],
}

impl<CH, C> Default for DriverPool<CH, C> {
    fn default() -> Self {
        DriverPool {
            slots: Default::default(),
        }
    }
}

impl<CH, C> DriverPool<CH, C>
where
    CH: DisplayChannel,
    C: Clock,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `config`, claim a free slot, and run the initialization
    /// sequence on the new instance. Returns the slot handle, or the first
    /// error; a full pool reports [`Error::InvalidParam`].
    pub fn create(&mut self, chan: CH, clock: C, config: &Config) -> Result<DriverSlot, Error> {
        config.validate()?;
        let index = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(Error::InvalidParam)?;
        // The slot is claimed before init so that a concurrent tick source
        // already reaches the instance's clock during the init delays.
        let slot = &mut self.slots[index];
        *slot = Some(Display::new(chan, clock, config));
        if let Some(display) = slot.as_mut() {
            display.init(config)?;
        }
        Ok(DriverSlot(index))
    }

    pub fn get(&self, slot: DriverSlot) -> Option<&Display<CH, C>> {
        self.slots.get(slot.0)?.as_ref()
    }

    pub fn get_mut(&mut self, slot: DriverSlot) -> Option<&mut Display<CH, C>> {
        self.slots.get_mut(slot.0)?.as_mut()
    }
}

impl<CH, C> DriverPool<CH, C>
where
    CH: DisplayChannel,
    C: Clock + Tick,
{
    /// Advance every occupied slot's timebase by one millisecond. Meant to
    /// be called from a 1 ms periodic interrupt; takes `&self` so the
    /// handler does not contend for the mutable handle the main loop draws
    /// with.
    pub fn tick(&self) {
        for display in self.slots.iter().flatten() {
            display.clock().tick();
        }
    }
}
