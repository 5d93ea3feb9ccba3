use crate::hal::timer::{Prescale, TickClock, TickTimer};
use log::debug;

/// Tick timer with no hardware behind it; tests raise the overflow by hand.
#[derive(Debug)]
pub struct SimTimer {
    clock: TickClock,
    prescale: Option<Prescale>,
    pending: bool,
    acknowledged: u32,
}

/// Simulated timer errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SimTimerError {
    NotStarted,
}

impl SimTimer {
    pub const fn new(clock: TickClock) -> Self {
        Self {
            clock,
            prescale: None,
            pending: false,
            acknowledged: 0,
        }
    }

    /// Flag an overflow, as the counter wrapping would.
    pub fn raise(&mut self) {
        if self.prescale.is_some() {
            self.pending = true;
        }
    }

    pub fn prescale(&self) -> Option<Prescale> {
        self.prescale
    }

    pub fn acknowledged(&self) -> u32 {
        self.acknowledged
    }
}

impl Default for SimTimer {
    /// 16 MHz core clock into an 8-bit overflow counter.
    fn default() -> Self {
        Self::new(TickClock::new(16_000_000, 256))
    }
}

impl TickTimer for SimTimer {
    type Error = SimTimerError;

    fn clock(&self) -> TickClock {
        self.clock
    }

    fn start(&mut self, prescale: Prescale) -> Result<(), Self::Error> {
        debug!("sim timer: start {:?}", prescale);
        self.prescale = Some(prescale);
        self.pending = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        debug!("sim timer: stop");
        self.prescale = None;
        self.pending = false;
        Ok(())
    }

    fn acknowledge(&mut self) -> Result<(), Self::Error> {
        if self.prescale.is_none() {
            return Err(SimTimerError::NotStarted);
        }
        self.pending = false;
        self.acknowledged += 1;
        Ok(())
    }

    fn is_pending(&self) -> Result<bool, Self::Error> {
        Ok(self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_only_after_start() {
        let mut timer = SimTimer::default();
        timer.raise();
        assert_eq!(timer.is_pending(), Ok(false));
        assert_eq!(timer.acknowledge(), Err(SimTimerError::NotStarted));

        timer.start(Prescale::Div64).unwrap();
        timer.raise();
        assert_eq!(timer.is_pending(), Ok(true));
        timer.acknowledge().unwrap();
        assert_eq!(timer.is_pending(), Ok(false));
        assert_eq!(timer.acknowledged(), 1);
    }
}
