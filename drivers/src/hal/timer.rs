//! Timer Hardware Abstraction Layer.
//!
//! The hardware half of the system tick: a counter that overflows (or hits a
//! compare value) periodically and raises one interrupt per period.

/// Clock divider applied in front of the tick counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Prescale {
    Div1,
    Div8,
    Div64,
    Div256,
    Div1024,
}

impl Prescale {
    pub const fn divider(self) -> u32 {
        match self {
            Prescale::Div1 => 1,
            Prescale::Div8 => 8,
            Prescale::Div64 => 64,
            Prescale::Div256 => 256,
            Prescale::Div1024 => 1024,
        }
    }
}

/// Frequency description of a tick counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TickClock {
    /// Frequency feeding the prescaler, in Hz.
    pub input_hz: u32,
    /// Counter increments per interrupt (256 for an 8-bit overflow counter,
    /// 1 for a compare-match timer programmed in input-clock units).
    pub counter_span: u32,
}

impl TickClock {
    pub const fn new(input_hz: u32, counter_span: u32) -> Self {
        Self {
            input_hz,
            counter_span,
        }
    }

    /// Input-clock cycles between two interrupts.
    pub const fn cycles_per_tick(&self, prescale: Prescale) -> u64 {
        prescale.divider() as u64 * self.counter_span as u64
    }

    /// Interrupts per second, truncated.
    pub const fn ticks_per_second(&self, prescale: Prescale) -> u32 {
        let cycles = self.cycles_per_tick(prescale);
        if cycles == 0 {
            0
        } else {
            (self.input_hz as u64 / cycles) as u32
        }
    }
}

/// Periodic tick interrupt source.
pub trait TickTimer {
    /// Error type for timer operations.
    type Error: core::fmt::Debug;

    /// Clock feeding the counter.
    fn clock(&self) -> TickClock;

    /// Program the divider and enable the periodic interrupt.
    fn start(&mut self, prescale: Prescale) -> Result<(), Self::Error>;

    /// Disable the periodic interrupt.
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Clear the pending interrupt and arm the next period.
    ///
    /// Called first thing in the interrupt handler.
    fn acknowledge(&mut self) -> Result<(), Self::Error>;

    /// Check if a tick interrupt is pending.
    fn is_pending(&self) -> Result<bool, Self::Error>;
}
