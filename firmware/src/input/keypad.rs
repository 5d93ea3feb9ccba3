use common::collections::EventFifo;
use common::sync::{IrqControl, IrqLock};
use drivers::hal::gpio::{GpioController, PinId, PinLevel, PinMode};

use super::{Debounce, Edge, Event, InputChannel, InputError};

/// Wiring of an `R` x `C` switch matrix.
///
/// Rows are driven, columns are read with pull-ups. A closed key connects
/// its row to its column.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeypadConfig<const R: usize, const C: usize> {
    pub rows: [PinId; R],
    pub cols: [PinId; C],
    pub stable_count: u16,
    pub scan_period_ms: u32,
}

/// Row-scanned key matrix with per-key debouncing.
///
/// Key `(row, col)` reports code `row * C + col`.
pub struct Keypad<I: IrqControl, const R: usize, const C: usize, const Q: usize> {
    config: KeypadConfig<R, C>,
    report_release: bool,
    state: IrqLock<[[Debounce; C]; R], I>,
    events: EventFifo<Event, I, Q>,
}

impl<I: IrqControl, const R: usize, const C: usize, const Q: usize> Keypad<I, R, C, Q> {
    const VALID_SIZE: () = assert!(
        R * C <= Event::MAX_INDEX as usize + 1,
        "keypad too large for a 6-bit event index"
    );

    pub const fn new(config: KeypadConfig<R, C>) -> Self {
        let () = Self::VALID_SIZE;
        Self {
            config,
            report_release: true,
            state: IrqLock::new([[Debounce::new(); C]; R]),
            events: EventFifo::new(),
        }
    }

    pub const fn with_release_events(mut self, report: bool) -> Self {
        self.report_release = report;
        self
    }

    pub const fn key_code(row: usize, col: usize) -> u8 {
        (row * C + col) as u8
    }

    pub fn config(&self) -> &KeypadConfig<R, C> {
        &self.config
    }

    pub fn is_pressed(&self, row: usize, col: usize) -> bool {
        if row >= R || col >= C {
            return false;
        }
        self.state
            .with(|state| state[row][col].is_confirmed(self.config.stable_count))
            .unwrap_or(false)
    }

    pub fn press_count(&self, row: usize, col: usize) -> Result<u16, InputError> {
        if row >= R || col >= C {
            return Err(InputError::InvalidIndex);
        }
        self.state
            .with(|state| state[row][col].count())
            .ok_or(InputError::Busy)
    }

    pub fn scan_period_ms(&self) -> u32 {
        self.config.scan_period_ms
    }

    pub fn waiting(&self) -> usize {
        self.events.len()
    }

    pub fn get_event(&self) -> Option<Event> {
        self.events.pop()
    }

    pub fn clear(&self) {
        self.events.clear();
        self.state
            .with(|state| state.iter_mut().flatten().for_each(Debounce::reset));
    }
}

impl<P, I, const R: usize, const C: usize, const Q: usize> InputChannel<P> for Keypad<I, R, C, Q>
where
    P: GpioController,
    I: IrqControl,
{
    fn configure(&self, pins: &mut P) -> Result<(), P::Error> {
        for &row in &self.config.rows {
            pins.set_mode(row, PinMode::Output)?;
            pins.write(row, PinLevel::High)?;
        }
        for &col in &self.config.cols {
            pins.set_mode(col, PinMode::InputPullUp)?;
        }
        Ok(())
    }

    fn scan_period_ms(&self) -> u32 {
        Keypad::scan_period_ms(self)
    }

    fn scan(&self, pins: &mut P, _now_ms: u64) {
        let Some(mut state) = self.state.lock() else {
            return;
        };

        for (r, (&row, keys)) in self.config.rows.iter().zip(state.iter_mut()).enumerate() {
            if pins.write(row, PinLevel::Low).is_err() {
                continue;
            }

            for (c, (&col, debounce)) in self.config.cols.iter().zip(keys.iter_mut()).enumerate() {
                let Ok(level) = pins.read(col) else {
                    continue;
                };
                let code = Self::key_code(r, c);
                let event = match debounce.update(level == PinLevel::Low, self.config.stable_count) {
                    Some(Edge::Pressed) => Event::press(code),
                    Some(Edge::Released) if self.report_release => Event::release(code),
                    _ => continue,
                };
                self.events.push(event);
            }

            // Leaving a row low would ghost it into the next row's reads.
            let _ = pins.write(row, PinLevel::High);
        }
    }

    fn waiting(&self) -> usize {
        Keypad::waiting(self)
    }

    fn get_event(&self) -> Option<Event> {
        Keypad::get_event(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::arch::host::HostIrq;
    use drivers::platform::sim::SimGpio;

    const ROWS: [PinId; 2] = [PinId::new(1, 0), PinId::new(1, 1)];
    const COLS: [PinId; 3] = [PinId::new(2, 0), PinId::new(2, 1), PinId::new(2, 2)];

    fn keypad() -> (Keypad<HostIrq, 2, 3, 8>, SimGpio) {
        let keypad = Keypad::new(KeypadConfig {
            rows: ROWS,
            cols: COLS,
            stable_count: 2,
            scan_period_ms: 5,
        });
        let mut gpio = SimGpio::new();
        keypad.configure(&mut gpio).unwrap();
        (keypad, gpio)
    }

    #[test]
    fn configure_parks_rows_high() {
        let (_, gpio) = keypad();
        for row in ROWS {
            assert_eq!(gpio.mode(row), Some(PinMode::Output));
            assert_eq!(gpio.latch(row), Some(PinLevel::High));
        }
        for col in COLS {
            assert_eq!(gpio.mode(col), Some(PinMode::InputPullUp));
        }
    }

    #[test]
    fn closed_key_reports_its_code() {
        let (keypad, mut gpio) = keypad();
        gpio.close_switch(ROWS[1], COLS[2]).unwrap();
        keypad.scan(&mut gpio, 0);
        assert_eq!(keypad.waiting(), 0);
        keypad.scan(&mut gpio, 5);

        assert_eq!(keypad.get_event(), Some(Event::press(5)));
        assert!(keypad.is_pressed(1, 2));
        assert!(!keypad.is_pressed(0, 2));

        gpio.open_switch(ROWS[1], COLS[2]);
        keypad.scan(&mut gpio, 10);
        assert_eq!(keypad.get_event(), Some(Event::release(5)));
    }

    #[test]
    fn rows_are_released_after_scan() {
        let (keypad, mut gpio) = keypad();
        keypad.scan(&mut gpio, 0);
        for row in ROWS {
            assert_eq!(gpio.latch(row), Some(PinLevel::High));
        }
    }

    #[test]
    fn two_keys_in_one_column() {
        let (keypad, mut gpio) = keypad();
        gpio.close_switch(ROWS[0], COLS[1]).unwrap();
        gpio.close_switch(ROWS[1], COLS[1]).unwrap();
        keypad.scan(&mut gpio, 0);
        keypad.scan(&mut gpio, 5);

        assert_eq!(keypad.get_event(), Some(Event::press(1)));
        assert_eq!(keypad.get_event(), Some(Event::press(4)));
    }

    #[test]
    fn invalid_key() {
        let (keypad, _) = keypad();
        assert!(!keypad.is_pressed(2, 0));
        assert_eq!(keypad.press_count(0, 3), Err(InputError::InvalidIndex));
    }
}
