use core::{
    cell::UnsafeCell,
    marker::PhantomData,
    sync::atomic::{AtomicBool, Ordering},
};

use super::irq::IrqControl;

/// Critical-section lock for state shared with an interrupt handler.
///
/// - Masks interrupts on lock
/// - Restores the saved interrupt state on drop
/// - Never spins: on a single core the only way to find it held is a
///   re-entrant lock from the same context, which is reported as `None`
///
/// Safe to use from:
/// - IRQ context
/// - Foreground context
///
/// Not reentrant.
pub struct IrqLock<T, I: IrqControl> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
    _irq: PhantomData<fn() -> I>,
}

unsafe impl<T: Send, I: IrqControl> Send for IrqLock<T, I> {}
unsafe impl<T: Send, I: IrqControl> Sync for IrqLock<T, I> {}

impl<T, I: IrqControl> IrqLock<T, I> {
    pub const fn new(data: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(data),
            _irq: PhantomData,
        }
    }

    /// Mask interrupts and take the lock.
    ///
    /// Returns `None` (with the interrupt state already restored) if the lock
    /// is held further up the current call chain.
    pub fn lock(&self) -> Option<IrqLockGuard<'_, T, I>> {
        let irq_state = I::disable();

        if self.locked.swap(true, Ordering::Acquire) {
            I::restore(irq_state);
            return None;
        }

        Some(IrqLockGuard {
            lock: self,
            irq_state,
        })
    }

    /// Run `f` on the protected value inside a critical section.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.lock()?;
        Some(f(&mut guard))
    }

    /// Exclusive access without masking; `&mut self` proves nobody else holds it.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

/// Guard returned by `IrqLock::lock`.
///
/// Restores interrupt state on drop.
pub struct IrqLockGuard<'a, T, I: IrqControl> {
    lock: &'a IrqLock<T, I>,
    irq_state: I::State,
}

impl<T, I: IrqControl> core::ops::Deref for IrqLockGuard<'_, T, I> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: the flag is held and interrupts are masked
        unsafe { &*self.lock.data.get() }
    }
}

impl<T, I: IrqControl> core::ops::DerefMut for IrqLockGuard<'_, T, I> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: the flag is held and interrupts are masked
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T, I: IrqControl> Drop for IrqLockGuard<'_, T, I> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
        I::restore(self.irq_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    std::thread_local! {
        static MASKED: Cell<bool> = const { Cell::new(false) };
    }

    /// Per-thread flag so tests running in parallel don't observe each other.
    struct TestIrq;

    impl IrqControl for TestIrq {
        type State = bool;

        fn disable() -> bool {
            MASKED.with(|m| m.replace(true))
        }

        fn restore(was_masked: bool) {
            MASKED.with(|m| m.set(was_masked));
        }

        fn enable() {
            MASKED.with(|m| m.set(false));
        }
    }

    fn masked() -> bool {
        MASKED.with(|m| m.get())
    }

    #[test]
    fn guard_masks_and_restores() {
        let lock: IrqLock<u32, TestIrq> = IrqLock::new(1);
        assert!(!masked());
        {
            let mut guard = lock.lock().unwrap();
            assert!(masked());
            *guard += 1;
        }
        assert!(!masked());
        assert_eq!(lock.with(|v| *v), Some(2));
    }

    #[test]
    fn reentrant_lock_is_refused_without_unmasking() {
        let lock: IrqLock<u32, TestIrq> = IrqLock::new(0);
        let outer = lock.lock().unwrap();
        assert!(lock.lock().is_none());
        assert!(masked(), "refused inner lock must keep the outer section masked");
        drop(outer);
        assert!(!masked());
        assert!(lock.lock().is_some());
    }

    #[test]
    fn lock_inside_existing_section_keeps_it_masked() {
        let lock: IrqLock<u8, TestIrq> = IrqLock::new(0);
        let saved = TestIrq::disable();
        lock.with(|v| *v = 7);
        assert!(masked());
        TestIrq::restore(saved);
        assert_eq!(lock.into_inner(), 7);
    }
}
