//! Platform Abstraction Layer
//!
//! Each supported board bundles a pin controller, a tick timer and the
//! interrupt-masking primitive for its core.
//!
//! # Usage
//!
//! ```rust
//! use drivers::platform::{CurrentPlatform, Platform};
//!
//! let (gpio, timer) = unsafe { CurrentPlatform::take() };
//! # let _ = (gpio, timer);
//! ```

use crate::hal::gpio::GpioController;
use crate::hal::timer::TickTimer;
use common::sync::IrqControl;

/// Platform trait - implemented by each supported platform
pub trait Platform {
    /// Pin capability.
    type Gpio: GpioController;

    /// Hardware behind the system tick.
    type Timer: TickTimer;

    /// Interrupt masking for this core.
    type Irq: IrqControl;

    /// Platform name for debugging
    fn name() -> &'static str;

    /// Hand out the peripheral drivers.
    ///
    /// # Safety
    /// Must only be called once; the returned drivers own the registers.
    unsafe fn take() -> (Self::Gpio, Self::Timer);
}

pub mod sim;

// Platform selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(all(feature = "bcm2835", target_arch = "arm"))] {
        pub mod bcm2835;
        pub use bcm2835::Bcm2835Platform as CurrentPlatform;
    } else if #[cfg(feature = "sim")] {
        pub use sim::SimPlatform as CurrentPlatform;
    } else {
        compile_error!(
            "No platform selected!\n\
            Use: cargo build --features sim\n\
            Or:  cargo build --features bcm2835 --target <arm target>"
        );
    }
}
