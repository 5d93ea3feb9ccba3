//! The host interrupt flag is process-wide, so everything touching it lives in
//! this one test.

use common::arch::host::HostIrq;
use common::sync::IrqControl;

#[test]
fn save_restore_and_bring_up_enable() {
    HostIrq::enable();
    let outer = HostIrq::disable();
    let inner = HostIrq::disable();
    assert!(!HostIrq::enabled());

    HostIrq::restore(inner);
    assert!(!HostIrq::enabled(), "inner restore must not unmask");

    HostIrq::restore(outer);
    assert!(HostIrq::enabled());

    // Reset leaves the core masked; bring-up unmasks it whatever was saved.
    let _ = HostIrq::disable();
    let saved = HostIrq::disable();
    HostIrq::enable();
    assert!(HostIrq::enabled());
    HostIrq::restore(saved);
    assert!(HostIrq::enabled(), "a masked snapshot does not re-mask");
}
