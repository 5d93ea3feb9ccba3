//! Simulated interrupt flag for host builds.
//!
//! There is no interrupt controller on the host, so the "enable" flag is a
//! process-wide atomic. It exists so that code written against [`IrqControl`]
//! runs unchanged under test and so that the save/restore discipline can be
//! observed.

use crate::sync::irq::IrqControl;
use core::sync::atomic::{AtomicBool, Ordering};

static ENABLED: AtomicBool = AtomicBool::new(true);

pub struct HostIrq;

impl HostIrq {
    pub fn enabled() -> bool {
        ENABLED.load(Ordering::SeqCst)
    }
}

impl IrqControl for HostIrq {
    type State = bool;

    fn disable() -> bool {
        ENABLED.swap(false, Ordering::SeqCst)
    }

    fn restore(was_enabled: bool) {
        if was_enabled {
            ENABLED.store(true, Ordering::SeqCst);
        }
    }

    fn enable() {
        ENABLED.store(true, Ordering::SeqCst);
    }
}
