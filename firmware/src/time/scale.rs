use drivers::hal::timer::{Prescale, TickClock};

use super::TimerError;

/// Conversion between ticks and milliseconds for one clock configuration.
///
/// Kept as the exact ratio `cycles_per_tick / input_hz` so conversions are
/// integer-only and truncate toward zero, whatever the divider.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TickScale {
    input_hz: u32,
    cycles_per_tick: u64,
}

impl TickScale {
    pub fn new(clock: TickClock, prescale: Prescale) -> Result<Self, TimerError> {
        let cycles_per_tick = clock.cycles_per_tick(prescale);
        if clock.input_hz == 0 || cycles_per_tick == 0 {
            return Err(TimerError::InvalidClock);
        }
        Ok(Self {
            input_hz: clock.input_hz,
            cycles_per_tick,
        })
    }

    /// Whole ticks per second.
    pub fn ticks_per_second(&self) -> u32 {
        (self.input_hz as u64 / self.cycles_per_tick) as u32
    }

    /// Tick interrupt rate in Hz.
    pub fn irq_frequency(&self) -> f32 {
        self.input_hz as f32 / self.cycles_per_tick as f32
    }

    pub fn ms_per_tick(&self) -> f32 {
        1000.0 * self.cycles_per_tick as f32 / self.input_hz as f32
    }

    /// Whole ticks in `ms` milliseconds, saturating at `u32::MAX`.
    pub fn ms_to_ticks(&self, ms: u32) -> u32 {
        // u32 * u32 always fits in u64; cycles_per_tick * 1000 does too.
        let ticks = ms as u64 * self.input_hz as u64 / (self.cycles_per_tick * 1000);
        ticks.min(u32::MAX as u64) as u32
    }

    /// Whole milliseconds in `ticks` ticks, saturating at `u64::MAX`.
    ///
    /// Stays in 64-bit arithmetic unless the product overflows it.
    pub fn ticks_to_ms(&self, ticks: u64) -> u64 {
        match ticks.checked_mul(self.cycles_per_tick * 1000) {
            Some(cycles_ms) => cycles_ms / self.input_hz as u64,
            None => {
                let ms = ticks as u128 * self.cycles_per_tick as u128 * 1000
                    / self.input_hz as u128;
                ms.min(u64::MAX as u128) as u64
            }
        }
    }
}
