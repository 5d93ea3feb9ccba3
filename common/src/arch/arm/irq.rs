use crate::sync::irq::IrqControl;

const CPSR_I_BIT: u32 = 1 << 7;

/// IRQ masking through the CPSR `I` bit.
///
/// `disable` returns the whole CPSR as it was before masking; `restore` only
/// unmasks when that snapshot had IRQs enabled, so a critical section opened
/// inside another one (or inside the tick handler, where the core has already
/// masked IRQs) leaves them masked on exit.
pub struct ArmIrq;

impl IrqControl for ArmIrq {
    type State = u32;

    #[inline(always)]
    fn disable() -> u32 {
        let cpsr: u32;
        unsafe {
            core::arch::asm!(
                "mrs {0}, cpsr",
                "cpsid i",
                out(reg) cpsr,
                options(nomem, nostack)
            );
        }
        cpsr
    }

    #[inline(always)]
    fn restore(saved_cpsr: u32) {
        if saved_cpsr & CPSR_I_BIT == 0 {
            unsafe {
                core::arch::asm!("cpsie i", options(nomem, nostack));
            }
        }
    }

    #[inline(always)]
    fn enable() {
        unsafe { core::arch::asm!("cpsie i", options(nomem, nostack)) }
    }
}
