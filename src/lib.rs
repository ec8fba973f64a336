//! Driver core for the Ilitek ILI9341 TFT display controller.
//!
//! The crate translates drawing intents (orientation changes, address-window
//! selection, solid fills, pixel streams) into the exact command/parameter
//! byte sequences the controller requires, over a non-blocking byte-transfer
//! capability with strict data/command and chip-select line ordering. Timing
//! (transfer readiness polling, reset and wakeup settle delays) is driven by
//! an injected millisecond clock, so a host supplies one periodic tick and
//! tests can simulate time deterministically.
//!
//! Driver instances live in a fixed-capacity [`pool::DriverPool`]; no heap
//! allocation is performed anywhere in the crate.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod bus;
pub mod clock;
pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod interface;
pub mod pool;

// Re-exports for primary API.
pub use crate::bus::Bus;
pub use crate::clock::{Clock, Tick, TickClock};
pub use crate::command::{consts, Command, Orientation};
pub use crate::config::{Config, HwConfig};
pub use crate::display::{Coord, Display};
pub use crate::error::{Error, Outcome};
pub use crate::interface::{spi::SpiChannel, DisplayChannel, Mode, PinState};
pub use crate::pool::{DriverPool, DriverSlot, MAX_DRIVERS_CNT};
