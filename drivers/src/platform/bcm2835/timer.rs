//! BCM2835 System Timer Driver
//!
//! The BCM2835 has a free-running counter at 1MHz and four compare channels.
//! The tick is produced by re-arming one compare channel a fixed number of
//! microseconds ahead on every acknowledge.

use super::PERIPHERAL_BASE;
use super::interrupt::{disable_irq, enable_irq};
use crate::hal::timer::{Prescale, TickClock, TickTimer};
use core::ptr::{read_volatile, write_volatile};
use log::debug;

/// System timer base address.
pub const TIMER_BASE: usize = PERIPHERAL_BASE + 0x3000;

/// Counter frequency.
pub const TIMER_HZ: u32 = 1_000_000;

/// System timer compare channels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum Channel {
    Channel0 = 0,
    Channel1 = 1,
    Channel2 = 2,
    Channel3 = 3,
}

impl Channel {
    /// IRQ line of this channel on the ARM interrupt controller.
    pub fn irq_number(self) -> u32 {
        self as u32
    }

    fn bitmask(self) -> u32 {
        1 << (self as u32)
    }
}

/// Memory-mapped system timer registers.
#[repr(C)]
struct Registers {
    cs: u32,
    clo: u32,
    chi: u32,
    c: [u32; 4],
}

#[inline(always)]
fn regs() -> *mut Registers {
    TIMER_BASE as *mut Registers
}

fn read_clo() -> u32 {
    unsafe { read_volatile(&raw const (*regs()).clo) }
}

fn write_compare(channel: Channel, value: u32) {
    unsafe { write_volatile(&raw mut (*regs()).c[channel as usize], value) }
}

fn read_compare(channel: Channel) -> u32 {
    unsafe { read_volatile(&raw const (*regs()).c[channel as usize]) }
}

fn clear_match(channel: Channel) {
    // Write-1-to-clear
    unsafe { write_volatile(&raw mut (*regs()).cs, channel.bitmask()) }
}

fn match_pending(channel: Channel) -> bool {
    unsafe { read_volatile(&raw const (*regs()).cs) & channel.bitmask() != 0 }
}

/// BCM2835 system timer driving one compare channel.
#[derive(Debug)]
pub struct Bcm2835Timer {
    channel: Channel,
    interval_us: u32,
}

impl Bcm2835Timer {
    /// # Safety
    ///
    /// Timer registers must be properly mapped and `channel` unused elsewhere.
    pub const unsafe fn new(channel: Channel) -> Self {
        Self {
            channel,
            interval_us: 0,
        }
    }
}

/// Timer errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerError {
    NotStarted,
}

impl TickTimer for Bcm2835Timer {
    type Error = TimerError;

    fn clock(&self) -> TickClock {
        TickClock::new(TIMER_HZ, 1)
    }

    fn start(&mut self, prescale: Prescale) -> Result<(), Self::Error> {
        self.interval_us = prescale.divider();
        clear_match(self.channel);
        write_compare(self.channel, read_clo().wrapping_add(self.interval_us));
        enable_irq(self.channel.irq_number());
        debug!("timer: {:?} every {} us", self.channel, self.interval_us);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        disable_irq(self.channel.irq_number());
        self.interval_us = 0;
        clear_match(self.channel);
        debug!("timer: {:?} stopped", self.channel);
        Ok(())
    }

    fn acknowledge(&mut self) -> Result<(), Self::Error> {
        if self.interval_us == 0 {
            return Err(TimerError::NotStarted);
        }
        clear_match(self.channel);
        // Advance from the previous compare value so the period doesn't drift
        // by the interrupt latency.
        let next = read_compare(self.channel).wrapping_add(self.interval_us);
        write_compare(self.channel, next);
        Ok(())
    }

    fn is_pending(&self) -> Result<bool, Self::Error> {
        Ok(match_pending(self.channel))
    }
}
