//! Simulated board for host builds and tests.
//!
//! Pins, switches and the tick timer are plain memory; the scheduler and the
//! input channels run against them exactly as they would against registers.

mod gpio;
mod timer;

pub use gpio::{SimGpio, SimGpioError, SIM_PINS};
pub use timer::{SimTimer, SimTimerError};

use super::Platform;
use common::arch::host::HostIrq;

pub struct SimPlatform;

impl Platform for SimPlatform {
    type Gpio = SimGpio;
    type Timer = SimTimer;
    type Irq = HostIrq;

    fn name() -> &'static str {
        "Simulated (host)"
    }

    unsafe fn take() -> (SimGpio, SimTimer) {
        (SimGpio::new(), SimTimer::default())
    }
}
