use std::cell::RefCell;

use common::arch::host::HostIrq;
use drivers::hal::timer::{Prescale, TickClock};
use firmware::time::{Systick, TimerError, TimerId};

type Scheduler = Systick<u8, HostIrq, 4>;

/// 1 ms per tick.
fn scheduler() -> Scheduler {
    let systick = Scheduler::new();
    systick
        .init(TickClock::new(1_000, 1), Prescale::Div1)
        .unwrap();
    systick
}

fn sweep(systick: &Scheduler, fired: &RefCell<Vec<(u8, u64)>>) {
    systick.on_tick(|cb, ctx| fired.borrow_mut().push((cb, ctx.ticks())));
}

#[test]
fn one_shot_five_milliseconds() {
    let systick = scheduler();
    let fired = RefCell::new(Vec::new());

    let id = systick.allocate_ms(5, false, Some(1)).unwrap();
    assert_eq!(id.index(), 0);

    for _ in 0..4 {
        sweep(&systick, &fired);
    }
    assert_eq!(systick.remaining_ticks(id), Ok(1));
    assert!(fired.borrow().is_empty());

    sweep(&systick, &fired);
    assert_eq!(*fired.borrow(), [(1, 5)]);

    for _ in 0..20 {
        sweep(&systick, &fired);
    }
    let slot = systick.slot(id).unwrap();
    assert_eq!(slot.period_ticks, 5);
    assert_eq!(slot.remaining_ticks, 0);
    assert_eq!(fired.borrow().len(), 1);

    // Still occupied until reused.
    assert_eq!(systick.allocate_ms(1, false, None).unwrap().index(), 1);
}

#[test]
fn repeating_timer_fires_once_per_period() {
    let systick = scheduler();
    let fired = RefCell::new(Vec::new());
    systick.allocate_ticks(7, true, Some(3)).unwrap();

    for _ in 0..7 * 50 {
        sweep(&systick, &fired);
    }

    let fired = fired.into_inner();
    assert_eq!(fired.len(), 50);
    for (k, &(cb, tick)) in fired.iter().enumerate() {
        assert_eq!(cb, 3);
        assert_eq!(tick, 7 * (k as u64 + 1));
    }
}

#[test]
fn exhaustion_and_reuse() {
    let systick = scheduler();
    let ids: Vec<TimerId> = (0..4)
        .map(|_| systick.allocate_ticks(10, true, None).unwrap())
        .collect();
    assert_eq!(
        systick.allocate_ticks(10, true, None),
        Err(TimerError::NoFreeSlot)
    );

    systick.disarm(ids[2]).unwrap();
    assert_eq!(systick.allocate_ticks(3, false, None), Ok(ids[2]));
    assert_eq!(
        systick.allocate_ticks(10, true, None),
        Err(TimerError::NoFreeSlot)
    );
}

#[test]
fn disarm_inside_sweep_suppresses_later_slot() {
    let systick = scheduler();
    let first = systick.allocate_ticks(2, true, Some(1)).unwrap();
    let second = systick.allocate_ticks(2, true, Some(2)).unwrap();
    let mut fired = Vec::new();

    systick.on_tick(|_, _| unreachable!());
    systick.on_tick(|cb, ctx| {
        fired.push(cb);
        if cb == 1 {
            ctx.timers().disarm(second).unwrap();
        }
    });

    assert_eq!(fired, [1]);
    assert!(systick.slot(second).unwrap().is_free());
    assert!(!systick.slot(first).unwrap().is_free());
}

#[test]
fn ticks_never_go_backwards() {
    let systick = scheduler();
    systick.allocate_ticks(1, true, Some(0)).unwrap();
    let mut last = systick.ticks_long();
    for _ in 0..1_000 {
        systick.on_tick(|_, _| {});
        let now = systick.ticks_long();
        assert!(now > last);
        last = now;
    }
    assert_eq!(systick.milliseconds_long(), 1_000);
}

#[test]
fn remaining_in_milliseconds_on_a_slow_tick() {
    let systick = Scheduler::new();
    // 16 MHz, 8-bit counter, /1024: 16.384 ms per tick.
    systick
        .init(TickClock::new(16_000_000, 256), Prescale::Div1024)
        .unwrap();
    let id = systick.allocate_ms(100, false, None).unwrap();
    assert_eq!(systick.remaining_ticks(id), Ok(6));
    assert_eq!(systick.remaining_ms(id), Ok(98));
    assert_eq!(systick.allocate_ms(10, false, None), Err(TimerError::ZeroPeriod));
    assert_eq!(systick.irq_frequency().map(|hz| hz as u32), Some(61));
}

#[test]
fn retarget_a_running_timer() {
    let systick = scheduler();
    let fired = RefCell::new(Vec::new());
    let id = systick.allocate_ms(3, true, Some(1)).unwrap();

    for _ in 0..3 {
        sweep(&systick, &fired);
    }
    systick.set_callback(id, Some(2)).unwrap();
    for _ in 0..3 {
        sweep(&systick, &fired);
    }

    // New period and callback, restarted from the current tick.
    systick.modify_ms(id, 4, false, Some(9)).unwrap();
    assert_eq!(systick.remaining_ms(id), Ok(4));
    for _ in 0..10 {
        sweep(&systick, &fired);
    }
    assert_eq!(*fired.borrow(), [(1, 3), (2, 6), (9, 10)]);

    // Clearing the callback keeps the timer counting silently.
    systick.modify_ms(id, 2, true, None).unwrap();
    for _ in 0..6 {
        sweep(&systick, &fired);
    }
    assert_eq!(fired.borrow().len(), 3);
    assert_eq!(systick.slot(id).unwrap().remaining_ticks, 2);
}
