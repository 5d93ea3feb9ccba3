//! BCM2835 interrupt controller: routing of peripheral lines to the ARM IRQ.

use super::PERIPHERAL_BASE;
use core::ptr::write_volatile;
use log::debug;

/// Interrupt controller base address.
pub const INT_CONTROLLER_BASE: usize = PERIPHERAL_BASE + 0xb000;

#[repr(C)]
struct Registers {
    _padding: [u8; 0x200],
    _irq_basic_pend: u32,
    _irq_1_pend: u32,
    _irq_2_pend: u32,
    _fiq_ctrl: u32,
    enable_irqs_1: u32,
    enable_irqs_2: u32,
    enable_basic_irqs: u32,
    disable_irqs_1: u32,
    disable_irqs_2: u32,
    disable_basic_irqs: u32,
}

#[inline(always)]
fn regs() -> *mut Registers {
    INT_CONTROLLER_BASE as *mut Registers
}

/// Register bank and bit of a line. GPU lines 0-63 sit in banks 1 and 2,
/// ARM-local lines follow from 64.
enum IrqLine {
    Irq1(u32),
    Irq2(u32),
    Basic(u32),
}

impl IrqLine {
    fn split(irq: u32) -> Self {
        match irq {
            0..=31 => IrqLine::Irq1(irq),
            32..=63 => IrqLine::Irq2(irq - 32),
            _ => IrqLine::Basic(irq - 64),
        }
    }
}

/// Route a line to the ARM IRQ input.
pub fn enable_irq(irq: u32) {
    debug!("intc: enable line {}", irq);
    unsafe {
        let r = regs();
        match IrqLine::split(irq) {
            IrqLine::Irq1(bit) => write_volatile(&raw mut (*r).enable_irqs_1, 1 << bit),
            IrqLine::Irq2(bit) => write_volatile(&raw mut (*r).enable_irqs_2, 1 << bit),
            IrqLine::Basic(bit) => write_volatile(&raw mut (*r).enable_basic_irqs, 1 << bit),
        }
    }
}

/// Stop routing a line. Enable and disable registers are write-1-to-act.
pub fn disable_irq(irq: u32) {
    debug!("intc: disable line {}", irq);
    unsafe {
        let r = regs();
        match IrqLine::split(irq) {
            IrqLine::Irq1(bit) => write_volatile(&raw mut (*r).disable_irqs_1, 1 << bit),
            IrqLine::Irq2(bit) => write_volatile(&raw mut (*r).disable_irqs_2, 1 << bit),
            IrqLine::Basic(bit) => write_volatile(&raw mut (*r).disable_basic_irqs, 1 << bit),
        }
    }
}
