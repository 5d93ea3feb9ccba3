mod gpio;
mod interrupt;
mod timer;

pub use gpio::{Bcm2835Gpio, GpioError};
pub use timer::{Bcm2835Timer, Channel, TimerError};

use super::Platform;
use common::arch::arm::ArmIrq;

/// Start of the peripheral window as seen from the ARM core.
pub const PERIPHERAL_BASE: usize = 0x2000_0000;

pub struct Bcm2835Platform;

impl Platform for Bcm2835Platform {
    type Gpio = Bcm2835Gpio;
    type Timer = Bcm2835Timer;
    type Irq = ArmIrq;

    fn name() -> &'static str {
        "BCM2835 (Raspberry Pi 1/Zero)"
    }

    unsafe fn take() -> (Bcm2835Gpio, Bcm2835Timer) {
        // Compare channel 1 is free; 0 and 2 belong to the VideoCore.
        unsafe { (Bcm2835Gpio::new(), Bcm2835Timer::new(Channel::Channel1)) }
    }
}
