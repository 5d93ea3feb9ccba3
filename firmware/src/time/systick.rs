use common::sync::{IrqControl, IrqLock};
use drivers::hal::timer::{Prescale, TickClock};
use log::{debug, warn};

use super::{TickScale, TimerError, TimerId, TimerSlot};

struct Clock {
    ticks: u64,
    scale: Option<TickScale>,
}

/// Tick counter plus a fixed table of `N` software timers.
///
/// `C` is the callback token stored in a slot. When a slot fires, the token
/// is handed back to the closure passed to [`on_tick`](Self::on_tick) together
/// with a [`TickContext`] through which the callback may arm, modify or
/// disarm slots without re-entering the lock.
///
/// Foreground calls mask interrupts for the duration of the table access.
pub struct Systick<C, I: IrqControl, const N: usize> {
    clock: IrqLock<Clock, I>,
    slots: IrqLock<[TimerSlot<C>; N], I>,
}

impl<C: Copy, I: IrqControl, const N: usize> Systick<C, I, N> {
    const VALID_SLOTS: () = assert!(N >= 1 && N <= 255, "Systick needs 1..=255 timer slots");

    pub const fn new() -> Self {
        let () = Self::VALID_SLOTS;
        Self {
            clock: IrqLock::new(Clock {
                ticks: 0,
                scale: None,
            }),
            slots: IrqLock::new([const { TimerSlot::free() }; N]),
        }
    }

    /// Reset the counter, free every slot and fix the tick rate.
    ///
    /// Starting the hardware timer is left to the caller.
    pub fn init(&self, clock: TickClock, prescale: Prescale) -> Result<TickScale, TimerError> {
        let scale = TickScale::new(clock, prescale)?;

        let mut slots = self.slots.lock().ok_or(TimerError::Busy)?;
        let mut state = self.clock.lock().ok_or(TimerError::Busy)?;
        slots.iter_mut().for_each(TimerSlot::release);
        state.ticks = 0;
        state.scale = Some(scale);
        drop(state);
        drop(slots);

        debug!(
            "systick: {:?} on {} Hz, {} ticks/s, {} slots",
            prescale,
            clock.input_hz,
            scale.ticks_per_second(),
            N
        );
        Ok(scale)
    }

    pub fn scale(&self) -> Option<TickScale> {
        // The clock lock never encloses user code, so it cannot be re-entered.
        self.clock.with(|c| c.scale).flatten()
    }

    /// Ticks since `init`, truncated to 32 bits.
    pub fn ticks(&self) -> u32 {
        self.ticks_long() as u32
    }

    pub fn ticks_long(&self) -> u64 {
        self.clock.with(|c| c.ticks).unwrap_or(0)
    }

    /// Milliseconds since `init`, truncated to 32 bits.
    pub fn milliseconds(&self) -> u32 {
        self.milliseconds_long() as u32
    }

    pub fn milliseconds_long(&self) -> u64 {
        self.clock
            .with(|c| c.scale.map_or(0, |s| s.ticks_to_ms(c.ticks)))
            .unwrap_or(0)
    }

    pub fn irq_frequency(&self) -> Option<f32> {
        self.scale().map(|s| s.irq_frequency())
    }

    pub fn ms_per_tick(&self) -> Option<f32> {
        self.scale().map(|s| s.ms_per_tick())
    }

    fn table<R>(
        &self,
        f: impl FnOnce(&mut TimerTable<'_, C>) -> Result<R, TimerError>,
    ) -> Result<R, TimerError> {
        let scale = self.scale();
        let mut slots = self.slots.lock().ok_or(TimerError::Busy)?;
        f(&mut TimerTable {
            scale,
            slots: slots.as_mut_slice(),
        })
    }

    pub fn allocate_ticks(
        &self,
        ticks: u32,
        repeat: bool,
        callback: Option<C>,
    ) -> Result<TimerId, TimerError> {
        let result = self.table(|t| t.allocate_ticks(ticks, repeat, callback));
        if result == Err(TimerError::NoFreeSlot) {
            warn!("systick: all {} timer slots in use", N);
        }
        result
    }

    pub fn allocate_ms(
        &self,
        ms: u32,
        repeat: bool,
        callback: Option<C>,
    ) -> Result<TimerId, TimerError> {
        let result = self.table(|t| t.allocate_ms(ms, repeat, callback));
        if result == Err(TimerError::NoFreeSlot) {
            warn!("systick: all {} timer slots in use", N);
        }
        result
    }

    pub fn modify_ticks(
        &self,
        id: TimerId,
        ticks: u32,
        repeat: bool,
        callback: Option<C>,
    ) -> Result<(), TimerError> {
        self.table(|t| t.modify_ticks(id, ticks, repeat, callback))
    }

    pub fn modify_ms(
        &self,
        id: TimerId,
        ms: u32,
        repeat: bool,
        callback: Option<C>,
    ) -> Result<(), TimerError> {
        self.table(|t| t.modify_ms(id, ms, repeat, callback))
    }

    pub fn disarm(&self, id: TimerId) -> Result<(), TimerError> {
        self.table(|t| t.disarm(id))
    }

    pub fn remaining_ticks(&self, id: TimerId) -> Result<u32, TimerError> {
        self.table(|t| t.remaining_ticks(id))
    }

    pub fn remaining_ms(&self, id: TimerId) -> Result<u32, TimerError> {
        self.table(|t| t.remaining_ms(id))
    }

    pub fn set_callback(&self, id: TimerId, callback: Option<C>) -> Result<(), TimerError> {
        self.table(|t| t.set_callback(id, callback))
    }

    /// Snapshot of one slot.
    pub fn slot(&self, id: TimerId) -> Result<TimerSlot<C>, TimerError> {
        self.table(|t| t.slot(id))
    }

    pub fn free_slots(&self) -> usize {
        self.table(|t| Ok(t.free_slots())).unwrap_or(0)
    }

    /// Tick interrupt body.
    ///
    /// Advances the counter, then sweeps the slots in index order. Each slot
    /// that fires and carries a callback is passed to `dispatch`. Changes a
    /// callback makes through the context are visible to the rest of the
    /// sweep, so a slot disarmed by an earlier callback does not fire.
    pub fn on_tick(&self, mut dispatch: impl FnMut(C, &mut TickContext<'_, C>)) {
        let Some((ticks, scale)) = self.clock.with(|c| {
            c.ticks = c.ticks.wrapping_add(1);
            (c.ticks, c.scale)
        }) else {
            return;
        };
        let Some(mut slots) = self.slots.lock() else {
            return;
        };

        for index in 0..N {
            if !slots[index].tick() {
                continue;
            }
            let Some(callback) = slots[index].callback else {
                continue;
            };

            let mut ctx = TickContext {
                ticks,
                table: TimerTable {
                    scale,
                    slots: slots.as_mut_slice(),
                },
            };
            dispatch(callback, &mut ctx);
        }
    }
}

impl<C: Copy, I: IrqControl, const N: usize> Default for Systick<C, I, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed view of the timer table.
pub struct TimerTable<'a, C> {
    scale: Option<TickScale>,
    slots: &'a mut [TimerSlot<C>],
}

impl<C: Copy> TimerTable<'_, C> {
    fn scale(&self) -> Result<TickScale, TimerError> {
        self.scale.ok_or(TimerError::NotInitialized)
    }

    fn slot_mut(&mut self, id: TimerId) -> Result<&mut TimerSlot<C>, TimerError> {
        self.slots.get_mut(id.index()).ok_or(TimerError::InvalidSlot)
    }

    /// Arm the lowest-numbered free slot.
    pub fn allocate_ticks(
        &mut self,
        ticks: u32,
        repeat: bool,
        callback: Option<C>,
    ) -> Result<TimerId, TimerError> {
        self.scale()?;
        if ticks == 0 {
            return Err(TimerError::ZeroPeriod);
        }

        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_free())
            .ok_or(TimerError::NoFreeSlot)?;
        slot.arm(ticks, repeat, callback);
        Ok(TimerId::from_index(index as u8))
    }

    /// Like `allocate_ticks`, with the duration truncated to whole ticks.
    pub fn allocate_ms(
        &mut self,
        ms: u32,
        repeat: bool,
        callback: Option<C>,
    ) -> Result<TimerId, TimerError> {
        let ticks = self.scale()?.ms_to_ticks(ms);
        self.allocate_ticks(ticks, repeat, callback)
    }

    /// Overwrite every parameter of a slot and restart it, whether or not it
    /// was allocated.
    ///
    /// A period of zero disarms the slot.
    pub fn modify_ticks(
        &mut self,
        id: TimerId,
        ticks: u32,
        repeat: bool,
        callback: Option<C>,
    ) -> Result<(), TimerError> {
        self.scale()?;
        let slot = self.slot_mut(id)?;
        if ticks == 0 {
            slot.release();
        } else {
            slot.arm(ticks, repeat, callback);
        }
        Ok(())
    }

    pub fn modify_ms(
        &mut self,
        id: TimerId,
        ms: u32,
        repeat: bool,
        callback: Option<C>,
    ) -> Result<(), TimerError> {
        let ticks = self.scale()?.ms_to_ticks(ms);
        self.modify_ticks(id, ticks, repeat, callback)
    }

    /// Free a slot and drop its callback.
    pub fn disarm(&mut self, id: TimerId) -> Result<(), TimerError> {
        self.slot_mut(id)?.release();
        Ok(())
    }

    pub fn remaining_ticks(&self, id: TimerId) -> Result<u32, TimerError> {
        self.slot(id).map(|slot| slot.remaining_ticks)
    }

    pub fn remaining_ms(&self, id: TimerId) -> Result<u32, TimerError> {
        let scale = self.scale()?;
        let ticks = self.remaining_ticks(id)?;
        Ok(scale.ticks_to_ms(ticks as u64).min(u32::MAX as u64) as u32)
    }

    pub fn set_callback(&mut self, id: TimerId, callback: Option<C>) -> Result<(), TimerError> {
        self.slot_mut(id)?.callback = callback;
        Ok(())
    }

    pub fn slot(&self, id: TimerId) -> Result<TimerSlot<C>, TimerError> {
        self.slots
            .get(id.index())
            .copied()
            .ok_or(TimerError::InvalidSlot)
    }

    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_free()).count()
    }
}

/// What a firing callback gets to see.
pub struct TickContext<'a, C> {
    ticks: u64,
    table: TimerTable<'a, C>,
}

impl<'a, C> TickContext<'a, C> {
    /// Counter value of the tick being swept.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Milliseconds at the tick being swept; zero before `init`.
    pub fn milliseconds(&self) -> u64 {
        self.table.scale.map_or(0, |s| s.ticks_to_ms(self.ticks))
    }

    pub fn timers(&mut self) -> &mut TimerTable<'a, C> {
        &mut self.table
    }
}
