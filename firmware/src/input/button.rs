use common::collections::EventFifo;
use common::sync::{IrqControl, IrqLock};
use drivers::hal::gpio::{GpioController, PinId, PinLevel, PinMode};

use super::{Debounce, Edge, Event, InputChannel, InputError};

/// One push button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ButtonConfig {
    pub pin: PinId,
    /// Level read while the button is held.
    pub active: PinLevel,
    /// Consecutive active samples needed for a press.
    pub stable_count: u16,
}

impl ButtonConfig {
    /// Button shorting the pin to ground, using the internal pull-up.
    pub const fn active_low(pin: PinId, stable_count: u16) -> Self {
        Self {
            pin,
            active: PinLevel::Low,
            stable_count,
        }
    }

    /// Button pulling the pin high against an external pull-down.
    pub const fn active_high(pin: PinId, stable_count: u16) -> Self {
        Self {
            pin,
            active: PinLevel::High,
            stable_count,
        }
    }

    const fn mode(&self) -> PinMode {
        match self.active {
            PinLevel::Low => PinMode::InputPullUp,
            PinLevel::High => PinMode::Input,
        }
    }
}

/// `N` independently debounced buttons sharing one event FIFO of depth `Q`.
///
/// Button `i` reports `Event::press(i)`, and `Event::release(i)` when
/// release reporting is on.
pub struct ButtonBank<I: IrqControl, const N: usize, const Q: usize> {
    buttons: [ButtonConfig; N],
    scan_period_ms: u32,
    report_release: bool,
    state: IrqLock<[Debounce; N], I>,
    events: EventFifo<Event, I, Q>,
}

impl<I: IrqControl, const N: usize, const Q: usize> ButtonBank<I, N, Q> {
    const VALID_COUNT: () = assert!(
        N as u64 <= Event::MAX_INDEX as u64 + 1,
        "too many buttons for a 6-bit event index"
    );

    pub const fn new(buttons: [ButtonConfig; N], scan_period_ms: u32) -> Self {
        let () = Self::VALID_COUNT;
        Self {
            buttons,
            scan_period_ms,
            report_release: true,
            state: IrqLock::new([Debounce::new(); N]),
            events: EventFifo::new(),
        }
    }

    pub const fn with_release_events(mut self, report: bool) -> Self {
        self.report_release = report;
        self
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn config(&self, index: usize) -> Option<&ButtonConfig> {
        self.buttons.get(index)
    }

    /// Whether button `index` is currently a confirmed press.
    pub fn is_pressed(&self, index: usize) -> bool {
        let Some(config) = self.buttons.get(index) else {
            return false;
        };
        self.state
            .with(|state| state[index].is_confirmed(config.stable_count))
            .unwrap_or(false)
    }

    /// Consecutive active samples seen on button `index`.
    pub fn press_count(&self, index: usize) -> Result<u16, InputError> {
        if index >= N {
            return Err(InputError::InvalidIndex);
        }
        self.state
            .with(|state| state[index].count())
            .ok_or(InputError::Busy)
    }

    pub fn scan_period_ms(&self) -> u32 {
        self.scan_period_ms
    }

    pub fn waiting(&self) -> usize {
        self.events.len()
    }

    pub fn get_event(&self) -> Option<Event> {
        self.events.pop()
    }

    /// Drop pending events and forget partial presses.
    pub fn clear(&self) {
        self.events.clear();
        self.state.with(|state| state.iter_mut().for_each(Debounce::reset));
    }
}

impl<P: GpioController, I: IrqControl, const N: usize, const Q: usize> InputChannel<P>
    for ButtonBank<I, N, Q>
{
    fn configure(&self, pins: &mut P) -> Result<(), P::Error> {
        for button in &self.buttons {
            pins.set_mode(button.pin, button.mode())?;
        }
        Ok(())
    }

    fn scan_period_ms(&self) -> u32 {
        ButtonBank::scan_period_ms(self)
    }

    fn scan(&self, pins: &mut P, _now_ms: u64) {
        let Some(mut state) = self.state.lock() else {
            return;
        };

        for (index, (button, debounce)) in self.buttons.iter().zip(state.iter_mut()).enumerate() {
            let Ok(level) = pins.read(button.pin) else {
                continue;
            };
            let event = match debounce.update(level == button.active, button.stable_count) {
                Some(Edge::Pressed) => Event::press(index as u8),
                Some(Edge::Released) if self.report_release => Event::release(index as u8),
                _ => continue,
            };
            self.events.push(event);
        }
    }

    fn waiting(&self) -> usize {
        ButtonBank::waiting(self)
    }

    fn get_event(&self) -> Option<Event> {
        ButtonBank::get_event(self)
    }
}
