//! Debounced input channels.
//!
//! Every channel is sampled from a periodic timer callback and reports what
//! it saw as [`Event`] codes in its own lossy FIFO, which the foreground
//! drains with [`InputChannel::get_event`].

mod button;
mod debounce;
mod encoder;
mod keypad;

pub use button::{ButtonBank, ButtonConfig};
pub use debounce::{Debounce, DebounceState, Edge};
pub use encoder::{quadrature_step, EncoderBank, EncoderConfig, SpeedBands};
pub use keypad::{Keypad, KeypadConfig};

use drivers::hal::gpio::GpioController;

bitflags::bitflags! {
    /// Flag bits carried in the upper two bits of an event code.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct EventFlags: u8 {
        /// A confirmed press ended.
        const RELEASE = 0x80;
        /// Encoder step in the negative direction.
        const REVERSE = 0x40;
    }
}

/// Event code: a 6-bit button, key or encoder index plus [`EventFlags`].
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Event(u8);

impl Event {
    pub const INDEX_MASK: u8 = 0x3F;
    /// Largest index an event can carry.
    pub const MAX_INDEX: u8 = Self::INDEX_MASK;

    pub const fn new(index: u8, flags: EventFlags) -> Self {
        Self((index & Self::INDEX_MASK) | flags.bits())
    }

    pub const fn press(index: u8) -> Self {
        Self::new(index, EventFlags::empty())
    }

    pub const fn release(index: u8) -> Self {
        Self::new(index, EventFlags::RELEASE)
    }

    pub const fn from_code(code: u8) -> Self {
        Self(code)
    }

    pub const fn code(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> u8 {
        self.0 & Self::INDEX_MASK
    }

    pub const fn flags(self) -> EventFlags {
        EventFlags::from_bits_truncate(self.0)
    }

    pub const fn is_release(self) -> bool {
        self.flags().contains(EventFlags::RELEASE)
    }

    pub const fn is_reverse(self) -> bool {
        self.flags().contains(EventFlags::REVERSE)
    }
}

impl core::fmt::Debug for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Event")
            .field("index", &self.index())
            .field("flags", &self.flags())
            .finish()
    }
}

impl From<Event> for u8 {
    fn from(event: Event) -> u8 {
        event.code()
    }
}

/// Errors from channel accessors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputError {
    InvalidIndex,
    /// Channel state is locked further up this call chain.
    Busy,
}

/// A group of inputs sampled on a fixed period.
pub trait InputChannel<P: GpioController> {
    /// Set pin modes and capture any initial state.
    fn configure(&self, pins: &mut P) -> Result<(), P::Error>;

    /// Sampling period; zero means the channel needs no timer.
    fn scan_period_ms(&self) -> u32;

    /// Sample every input once. Called from the tick interrupt.
    ///
    /// Pin errors during a scan leave the affected input untouched.
    fn scan(&self, pins: &mut P, now_ms: u64);

    /// Events waiting in the FIFO.
    fn waiting(&self) -> usize;

    /// Oldest waiting event.
    fn get_event(&self) -> Option<Event>;
}

/// Placeholder for a board without this kind of input.
impl<P: GpioController> InputChannel<P> for () {
    fn configure(&self, _pins: &mut P) -> Result<(), P::Error> {
        Ok(())
    }

    fn scan_period_ms(&self) -> u32 {
        0
    }

    fn scan(&self, _pins: &mut P, _now_ms: u64) {}

    fn waiting(&self) -> usize {
        0
    }

    fn get_event(&self) -> Option<Event> {
        None
    }
}
