//! Primitives shared by every layer of the firmware.
//!
//! - [`sync`]: interrupt masking (`IrqControl`) and the critical-section lock
//!   built on it.
//! - [`collections`]: fixed-capacity, allocation-free containers that are safe
//!   to share between interrupt and foreground code.
//! - [`arch`]: `IrqControl` implementations per target.

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod collections;
pub mod sync;
