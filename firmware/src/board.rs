//! The single interrupt entry point.
//!
//! A [`Board`] owns the scheduler, the pin controller and up to three input
//! channels. `init` registers one repeating scan timer per channel; every
//! tick then fans out through [`Board::on_tick`].

use core::fmt;

use common::sync::{IrqControl, IrqLock};
use drivers::hal::gpio::GpioController;
use drivers::hal::timer::{Prescale, TickTimer};
use log::{debug, info};

use crate::input::InputChannel;
use crate::time::{Systick, TickContext, TickScale, TimerError, TimerId};

/// What a timer slot on the board runs when it fires.
#[derive(Copy, Clone)]
pub enum Callback {
    Buttons,
    Keypad,
    Encoders,
    /// Application callback, run inside the tick interrupt.
    Func(fn(&mut TickContext<'_, Callback>)),
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Buttons => f.write_str("Buttons"),
            Callback::Keypad => f.write_str("Keypad"),
            Callback::Encoders => f.write_str("Encoders"),
            Callback::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Board bring-up errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoardError<G, H> {
    Timer(TimerError),
    /// Pin configuration failed.
    Gpio(G),
    /// Starting the tick timer failed.
    Hardware(H),
    /// Pin controller already locked in this call chain.
    Busy,
}

impl<G, H> From<TimerError> for BoardError<G, H> {
    fn from(err: TimerError) -> Self {
        BoardError::Timer(err)
    }
}

pub struct Board<P, I: IrqControl, B, K, E, const N: usize> {
    systick: Systick<Callback, I, N>,
    pins: IrqLock<P, I>,
    buttons: B,
    keypad: K,
    encoders: E,
}

impl<P, I, B, K, E, const N: usize> Board<P, I, B, K, E, N>
where
    P: GpioController,
    I: IrqControl,
    B: InputChannel<P>,
    K: InputChannel<P>,
    E: InputChannel<P>,
{
    pub const fn new(pins: P, buttons: B, keypad: K, encoders: E) -> Self {
        Self {
            systick: Systick::new(),
            pins: IrqLock::new(pins),
            buttons,
            keypad,
            encoders,
        }
    }

    /// Bring the board up: scheduler, pin modes, scan timers, then the
    /// hardware tick. Interrupts are unmasked last.
    pub fn init<H: TickTimer>(
        &self,
        hw: &mut H,
        prescale: Prescale,
    ) -> Result<TickScale, BoardError<P::Error, H::Error>> {
        let scale = self.systick.init(hw.clock(), prescale)?;

        {
            let mut pins = self.pins.lock().ok_or(BoardError::Busy)?;
            self.buttons.configure(&mut pins).map_err(BoardError::Gpio)?;
            self.keypad.configure(&mut pins).map_err(BoardError::Gpio)?;
            self.encoders.configure(&mut pins).map_err(BoardError::Gpio)?;
        }

        self.register(&scale, Callback::Buttons, self.buttons.scan_period_ms())?;
        self.register(&scale, Callback::Keypad, self.keypad.scan_period_ms())?;
        self.register(&scale, Callback::Encoders, self.encoders.scan_period_ms())?;

        hw.start(prescale).map_err(BoardError::Hardware)?;
        I::enable();
        info!(
            "board: tick {} Hz, {} of {} timer slots free",
            scale.ticks_per_second(),
            self.systick.free_slots(),
            N
        );
        Ok(scale)
    }

    /// Arm a repeating scan timer. A period shorter than one tick scans on
    /// every tick.
    fn register(
        &self,
        scale: &TickScale,
        callback: Callback,
        period_ms: u32,
    ) -> Result<Option<TimerId>, TimerError> {
        if period_ms == 0 {
            return Ok(None);
        }
        let ticks = scale.ms_to_ticks(period_ms).max(1);
        let id = self.systick.allocate_ticks(ticks, true, Some(callback))?;
        debug!("board: {:?} scans every {} ticks in slot {}", callback, ticks, id.index());
        Ok(Some(id))
    }

    /// Tick interrupt body.
    pub fn on_tick(&self) {
        self.systick.on_tick(|callback, ctx| {
            let now_ms = ctx.milliseconds();
            match callback {
                Callback::Buttons => self.scan(&self.buttons, now_ms),
                Callback::Keypad => self.scan(&self.keypad, now_ms),
                Callback::Encoders => self.scan(&self.encoders, now_ms),
                Callback::Func(f) => f(ctx),
            }
        });
    }

    fn scan<C: InputChannel<P>>(&self, channel: &C, now_ms: u64) {
        if let Some(mut pins) = self.pins.lock() {
            channel.scan(&mut pins, now_ms);
        }
    }

    /// Acknowledge the hardware, then run the tick.
    pub fn handle_interrupt<H: TickTimer>(&self, hw: &mut H) -> Result<(), H::Error> {
        let ack = hw.acknowledge();
        self.on_tick();
        ack
    }

    pub fn systick(&self) -> &Systick<Callback, I, N> {
        &self.systick
    }

    pub fn buttons(&self) -> &B {
        &self.buttons
    }

    pub fn keypad(&self) -> &K {
        &self.keypad
    }

    pub fn encoders(&self) -> &E {
        &self.encoders
    }

    /// Run `f` on the pin controller inside a critical section.
    pub fn with_pins<R>(&self, f: impl FnOnce(&mut P) -> R) -> Option<R> {
        self.pins.with(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ButtonBank, ButtonConfig};
    use common::arch::host::HostIrq;
    use drivers::hal::gpio::{PinId, PinLevel};
    use drivers::hal::timer::TickClock;
    use drivers::platform::sim::{SimGpio, SimTimer};

    const BUTTON: PinId = PinId::new(3, 7);

    type TestBoard = Board<SimGpio, HostIrq, ButtonBank<HostIrq, 1, 4>, (), (), 2>;

    fn board() -> (TestBoard, SimTimer) {
        let buttons = ButtonBank::new([ButtonConfig::active_low(BUTTON, 2)], 3);
        let board = Board::new(SimGpio::new(), buttons, (), ());
        let mut timer = SimTimer::new(TickClock::new(1_000, 1));
        board.init(&mut timer, Prescale::Div1).unwrap();
        (board, timer)
    }

    #[test]
    fn init_registers_only_present_channels() {
        let (board, timer) = board();
        assert_eq!(board.systick().free_slots(), 1);
        assert_eq!(timer.prescale(), Some(Prescale::Div1));
        let slot = board.systick().slot(TimerId::from_index(0)).unwrap();
        assert_eq!(slot.period_ticks, 3);
        assert!(matches!(slot.callback, Some(Callback::Buttons)));
    }

    #[test]
    fn buttons_scan_on_their_period() {
        let (board, mut timer) = board();
        board.with_pins(|pins| pins.drive_external(BUTTON, PinLevel::Low).unwrap());

        // Two scans are needed: ticks 3 and 6.
        for _ in 0..5 {
            timer.raise();
            board.handle_interrupt(&mut timer).unwrap();
        }
        assert_eq!(board.buttons().waiting(), 0);
        timer.raise();
        board.handle_interrupt(&mut timer).unwrap();
        assert_eq!(board.buttons().waiting(), 1);
        assert_eq!(timer.acknowledged(), 6);
    }

    #[test]
    fn application_callback_runs_in_the_sweep() {
        fn stop_button_scan(ctx: &mut TickContext<'_, Callback>) {
            let timers = ctx.timers();
            timers.disarm(TimerId::from_index(0)).unwrap();
        }

        let (board, _) = board();
        board
            .systick()
            .allocate_ticks(1, false, Some(Callback::Func(stop_button_scan)))
            .unwrap();
        board.on_tick();
        assert_eq!(board.systick().free_slots(), 1);
        assert!(board.systick().slot(TimerId::from_index(0)).unwrap().is_free());
    }

    #[test]
    fn too_many_channels_for_the_table() {
        let buttons = ButtonBank::<HostIrq, 1, 4>::new([ButtonConfig::active_low(BUTTON, 2)], 3);
        let more = ButtonBank::<HostIrq, 1, 4>::new([ButtonConfig::active_low(PinId::new(3, 6), 2)], 3);
        let board: Board<SimGpio, HostIrq, _, (), _, 1> = Board::new(SimGpio::new(), buttons, (), more);
        let mut timer = SimTimer::new(TickClock::new(1_000, 1));

        assert_eq!(
            board.init(&mut timer, Prescale::Div1),
            Err(BoardError::Timer(TimerError::NoFreeSlot))
        );
        assert_eq!(timer.prescale(), None);
    }
}
