//! Bring-up of the build-selected platform. Kept alone in its binary because
//! it watches the process-wide host interrupt flag.

use common::arch::host::HostIrq;
use common::sync::IrqControl;
use drivers::hal::timer::Prescale;
use firmware::config::{self, PlatformBoard};

#[test]
fn init_starts_the_tick_and_unmasks_interrupts() {
    // Out of reset the core has IRQs masked.
    let _ = HostIrq::disable();
    assert!(!HostIrq::enabled());

    let (board, mut timer): (PlatformBoard, _) = unsafe { config::take_reference_board() };
    let scale = board.init(&mut timer, Prescale::Div64).unwrap();

    assert!(HostIrq::enabled());
    assert_eq!(timer.prescale(), Some(Prescale::Div64));
    assert_eq!(scale.ticks_per_second(), 976);
    assert_eq!(board.systick().free_slots(), config::defaults::TIMER_SLOTS - 3);

    timer.raise();
    board.handle_interrupt(&mut timer).unwrap();
    assert_eq!(timer.acknowledged(), 1);
    assert!(HostIrq::enabled(), "the tick restores the unmasked state");
}
