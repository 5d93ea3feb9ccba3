//! Hardware Abstraction Layer (HAL) - Platform-Independent Traits
//!
//! These traits are implemented by platform-specific drivers, so the
//! scheduler and input channels are written once for every board.
//!
//! # Design Principles
//!
//! - **Zero-cost abstractions**: Traits compile to direct hardware access
//! - **No platform leakage**: Traits must not reference platform-specific types
//! - **Never block**: every operation returns immediately
//!
//! # Available Interfaces
//!
//! - [`gpio`]: read/write/mode-set on logical pins
//! - [`timer`]: the periodic overflow interrupt behind the system tick

pub mod gpio;
pub mod timer;
