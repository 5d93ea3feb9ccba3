//! GPIO (General Purpose Input/Output) Hardware Abstraction Layer.
//!
//! The pin capability consumed by the input channels: set a pin's mode, read
//! it, drive it. Pins are named by a [`PinId`], a small integer whose mapping
//! to hardware is board configuration.

/// Pin logic level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinLevel {
    /// Logic low (0V or ground).
    Low,
    /// Logic high (VDD or 3.3V/5V depending on system).
    High,
}

impl PinLevel {
    pub const fn inverted(self) -> Self {
        match self {
            PinLevel::Low => PinLevel::High,
            PinLevel::High => PinLevel::Low,
        }
    }
}

impl From<bool> for PinLevel {
    fn from(value: bool) -> Self {
        if value {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

impl From<PinLevel> for bool {
    fn from(level: PinLevel) -> bool {
        matches!(level, PinLevel::High)
    }
}

/// Pin direction and pull configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinMode {
    /// High-impedance input.
    Input,
    /// Push-pull output.
    Output,
    /// Input with the internal pull-up enabled.
    InputPullUp,
}

impl PinMode {
    pub const fn is_input(self) -> bool {
        !matches!(self, PinMode::Output)
    }
}

/// Logical pin identifier.
///
/// The low three bits are the bit offset within a port and the remaining bits
/// select the port, so `PinId::new(1, 4)` is bit 4 of port 1. Controllers
/// with a flat pin numbering use [`PinId::from_raw`] and ignore the split.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(u8);

impl PinId {
    pub const fn new(port: u8, bit: u8) -> Self {
        PinId((port << 3) | (bit & 0x07))
    }

    pub const fn from_raw(raw: u8) -> Self {
        PinId(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn port(self) -> u8 {
        self.0 >> 3
    }

    pub const fn bit(self) -> u8 {
        self.0 & 0x07
    }

    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }
}

/// GPIO controller trait.
///
/// This trait represents a GPIO controller capable of configuring
/// and controlling multiple GPIO pins.
pub trait GpioController {
    /// Error type for GPIO operations.
    type Error: core::fmt::Debug;

    /// Configure direction and pull resistor of a pin.
    fn set_mode(&mut self, pin: PinId, mode: PinMode) -> Result<(), Self::Error>;

    /// Read the current logic level of a pin.
    fn read(&self, pin: PinId) -> Result<PinLevel, Self::Error>;

    /// Drive an output pin.
    fn write(&mut self, pin: PinId, level: PinLevel) -> Result<(), Self::Error>;

    /// Set a pin to logic high.
    fn set_high(&mut self, pin: PinId) -> Result<(), Self::Error> {
        self.write(pin, PinLevel::High)
    }

    /// Set a pin to logic low.
    fn set_low(&mut self, pin: PinId) -> Result<(), Self::Error> {
        self.write(pin, PinLevel::Low)
    }

    /// Toggle the output state of a pin.
    fn toggle(&mut self, pin: PinId) -> Result<(), Self::Error> {
        let level = self.read(pin)?;
        self.write(pin, level.inverted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_id_splits_port_and_bit() {
        let pin = PinId::new(3, 2);
        assert_eq!(pin.raw(), 26);
        assert_eq!(pin.port(), 3);
        assert_eq!(pin.bit(), 2);
        assert_eq!(pin.mask(), 0b100);
    }

    #[test]
    fn bit_offset_is_masked() {
        assert_eq!(PinId::new(1, 9), PinId::new(1, 1));
    }
}
