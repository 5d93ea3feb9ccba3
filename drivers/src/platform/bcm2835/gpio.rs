//! BCM2835 GPIO Controller Driver
//!
//! Raw register access plus the pin-capability implementation. BCM2835 pins
//! are numbered flat (0..=53), so a [`PinId`] is used by its raw value.

use super::PERIPHERAL_BASE;
use crate::hal::gpio::{GpioController, PinId, PinLevel, PinMode};
use core::ptr::{read_volatile, write_volatile};

/// GPIO base address.
pub const GPIO_BASE: usize = PERIPHERAL_BASE + 0x20_0000;

const MAX_PIN: u8 = 53;

/// GPIO function selection.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Function {
    Input = 0b000,
    Output = 0b001,
}

/// Internal pull resistor configuration.
#[repr(u32)]
#[derive(Copy, Clone, Debug)]
enum Pull {
    Off = 0b00,
    Up = 0b10,
}

/// Memory-mapped register layout, up to the pull-up/down clocks.
#[repr(C)]
struct Registers {
    gpfsel: [u32; 6],
    _r0: u32,
    gpset: [u32; 2],
    _r1: u32,
    gpclr: [u32; 2],
    _r2: u32,
    gplev: [u32; 2],
    _r3: [u32; 22],
    gppud: u32,
    gppudclk: [u32; 2],
}

#[inline(always)]
fn regs() -> *mut Registers {
    GPIO_BASE as *mut Registers
}

fn check_pin(pin: PinId) -> Result<u8, GpioError> {
    if pin.raw() <= MAX_PIN {
        Ok(pin.raw())
    } else {
        Err(GpioError::InvalidPin)
    }
}

fn pin_reg_and_bit(pin: u8) -> (usize, u32) {
    ((pin / 32) as usize, 1u32 << (pin % 32))
}

/// The pull-up clocking sequence needs 150 cycles of setup and hold.
fn delay_cycles(mut count: u32) {
    while count != 0 {
        unsafe { core::arch::asm!("nop", options(nomem, nostack)) };
        count -= 1;
    }
}

// ============================================================================
// Raw Hardware Functions
// ============================================================================

fn set_function(pin: u8, func: Function) {
    let reg = (pin / 10) as usize;
    let shift = (pin % 10) * 3;
    let mask = 0b111 << shift;

    unsafe {
        let fsel = &raw mut (*regs()).gpfsel[reg];
        let val = read_volatile(fsel);
        write_volatile(fsel, (val & !mask) | ((func as u32) << shift));
    }
}

fn set_pull(pin: u8, pull: Pull) {
    let (reg, bit) = pin_reg_and_bit(pin);

    unsafe {
        let gppud = &raw mut (*regs()).gppud;
        let clk = &raw mut (*regs()).gppudclk[reg];

        write_volatile(gppud, pull as u32);
        delay_cycles(150);

        write_volatile(clk, bit);
        delay_cycles(150);

        write_volatile(gppud, 0);
        write_volatile(clk, 0);
    }
}

fn drive(pin: u8, level: PinLevel) {
    let (reg, bit) = pin_reg_and_bit(pin);

    unsafe {
        match level {
            PinLevel::High => write_volatile(&raw mut (*regs()).gpset[reg], bit),
            PinLevel::Low => write_volatile(&raw mut (*regs()).gpclr[reg], bit),
        }
    }
}

fn level(pin: u8) -> PinLevel {
    let (reg, bit) = pin_reg_and_bit(pin);
    let val = unsafe { read_volatile(&raw const (*regs()).gplev[reg]) };
    (val & bit != 0).into()
}

// ============================================================================
// HAL Implementation
// ============================================================================

/// BCM2835 GPIO controller.
#[derive(Debug)]
pub struct Bcm2835Gpio;

impl Bcm2835Gpio {
    /// Create a new GPIO controller.
    ///
    /// # Safety
    ///
    /// GPIO registers must be properly mapped.
    pub const unsafe fn new() -> Self {
        Self
    }
}

impl GpioController for Bcm2835Gpio {
    type Error = GpioError;

    fn set_mode(&mut self, pin: PinId, mode: PinMode) -> Result<(), Self::Error> {
        let pin = check_pin(pin)?;
        match mode {
            PinMode::Output => set_function(pin, Function::Output),
            PinMode::Input => {
                set_function(pin, Function::Input);
                set_pull(pin, Pull::Off);
            }
            PinMode::InputPullUp => {
                set_function(pin, Function::Input);
                set_pull(pin, Pull::Up);
            }
        }
        Ok(())
    }

    fn read(&self, pin: PinId) -> Result<PinLevel, Self::Error> {
        Ok(level(check_pin(pin)?))
    }

    fn write(&mut self, pin: PinId, level: PinLevel) -> Result<(), Self::Error> {
        drive(check_pin(pin)?, level);
        Ok(())
    }
}

/// GPIO errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GpioError {
    InvalidPin,
}
