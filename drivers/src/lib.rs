//! Hardware Driver Subsystem
//!
//! Layered the same way on every board:
//!
//! # Module Organization
//!
//! - [`hal`]: Platform-independent trait definitions (pin capability, tick timer)
//! - [`platform`]: Platform-specific drivers implementing those traits
//!
//! # Usage Example
//!
//! ```
//! use drivers::hal::gpio::{GpioController, PinId, PinLevel, PinMode};
//! use drivers::platform::sim::SimGpio;
//!
//! let mut gpio = SimGpio::new();
//! let button = PinId::new(1, 4);
//! gpio.set_mode(button, PinMode::InputPullUp).unwrap();
//! assert_eq!(gpio.read(button).unwrap(), PinLevel::High);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod hal;
pub mod platform;

// Re-export commonly used types
pub use hal::gpio::{GpioController, PinId, PinLevel, PinMode};
pub use hal::timer::{Prescale, TickClock, TickTimer};
