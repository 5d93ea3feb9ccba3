/// Software timer errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Every slot is armed.
    NoFreeSlot,
    /// Slot index outside the table.
    InvalidSlot,
    /// A period of zero ticks cannot be armed.
    ZeroPeriod,
    /// `init` has not configured a clock yet.
    NotInitialized,
    /// Clock and prescaler give no usable tick rate.
    InvalidClock,
    /// The timer table is already locked further up this call chain; use
    /// the [`TickContext`](super::TickContext) handed to the callback.
    Busy,
}

/// Index of a slot in the timer table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u8);

impl TimerId {
    pub const fn from_index(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One entry of the timer table.
///
/// `period_ticks == 0` marks a free slot. A one-shot slot that fired stays
/// allocated with `remaining_ticks == 0` until it is modified or disarmed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerSlot<C> {
    pub period_ticks: u32,
    pub remaining_ticks: u32,
    pub repeat: bool,
    pub callback: Option<C>,
}

impl<C> TimerSlot<C> {
    pub const fn free() -> Self {
        Self {
            period_ticks: 0,
            remaining_ticks: 0,
            repeat: false,
            callback: None,
        }
    }

    pub const fn is_free(&self) -> bool {
        self.period_ticks == 0
    }

    /// Allocated, not repeating, and already fired.
    pub const fn is_expired(&self) -> bool {
        !self.is_free() && self.remaining_ticks == 0
    }

    pub(super) fn arm(&mut self, ticks: u32, repeat: bool, callback: Option<C>) {
        self.period_ticks = ticks;
        self.remaining_ticks = ticks;
        self.repeat = repeat;
        self.callback = callback;
    }

    pub(super) fn release(&mut self) {
        *self = Self::free();
    }

    /// Advance by one tick. Returns `true` when the slot fires.
    ///
    /// A repeating slot is reloaded in the same step that fires it, so it
    /// fires exactly once every `period_ticks`.
    pub(super) fn tick(&mut self) -> bool {
        if self.is_free() || self.remaining_ticks == 0 {
            return false;
        }

        self.remaining_ticks -= 1;
        if self.remaining_ticks != 0 {
            return false;
        }

        if self.repeat {
            self.remaining_ticks = self.period_ticks;
        }
        true
    }
}

impl<C> Default for TimerSlot<C> {
    fn default() -> Self {
        Self::free()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_slot_never_fires() {
        let mut slot = TimerSlot::<()>::free();
        for _ in 0..10 {
            assert!(!slot.tick());
        }
        assert!(slot.is_free());
    }

    #[test]
    fn one_shot_fires_once_and_stays_expired() {
        let mut slot = TimerSlot::<()>::free();
        slot.arm(3, false, None);

        assert!(!slot.tick());
        assert!(!slot.tick());
        assert!(slot.tick());
        assert!(slot.is_expired());

        for _ in 0..5 {
            assert!(!slot.tick());
        }
        assert_eq!(slot.period_ticks, 3);
        assert_eq!(slot.remaining_ticks, 0);
    }

    #[test]
    fn repeating_slot_reloads_when_firing() {
        let mut slot = TimerSlot::<()>::free();
        slot.arm(2, true, None);

        let fired = (0..10).filter(|_| slot.tick()).count();
        assert_eq!(fired, 5);
        assert_eq!(slot.remaining_ticks, 2);
    }

    #[test]
    fn period_of_one_fires_every_tick() {
        let mut slot = TimerSlot::<()>::free();
        slot.arm(1, true, None);
        assert!((0..4).all(|_| slot.tick()));
    }

    #[test]
    fn release_frees_the_slot() {
        let mut slot = TimerSlot::free();
        slot.arm(7, true, Some(1u8));
        slot.release();
        assert_eq!(slot, TimerSlot::free());
    }
}
