use crate::hal::gpio::{GpioController, PinId, PinLevel, PinMode};

/// Pins addressable on the simulated board.
pub const SIM_PINS: usize = 64;

const MAX_SWITCHES: usize = 32;

#[derive(Debug, Copy, Clone)]
struct PinState {
    mode: PinMode,
    latch: PinLevel,
    external: Option<PinLevel>,
}

impl PinState {
    const RESET: PinState = PinState {
        mode: PinMode::Input,
        latch: PinLevel::Low,
        external: None,
    };
}

/// A mechanical contact between two pins (a key in a scanned matrix).
#[derive(Debug, Copy, Clone)]
struct Switch {
    a: PinId,
    b: PinId,
    closed: bool,
}

impl Switch {
    fn joins(&self, a: PinId, b: PinId) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }

    fn other_end(&self, pin: PinId) -> Option<PinId> {
        if self.a == pin {
            Some(self.b)
        } else if self.b == pin {
            Some(self.a)
        } else {
            None
        }
    }
}

/// In-memory GPIO block.
///
/// An input reads, in order of precedence: the level of an output it is
/// connected to through a closed switch (any low output pulls it low), a
/// level forced from outside with [`SimGpio::drive_external`], then its pull
/// resistor (high with pull-up, low when floating).
#[derive(Debug)]
pub struct SimGpio {
    pins: [PinState; SIM_PINS],
    switches: [Option<Switch>; MAX_SWITCHES],
}

/// Simulated GPIO errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SimGpioError {
    InvalidPin,
    TooManySwitches,
}

fn index(pin: PinId) -> Result<usize, SimGpioError> {
    let idx = pin.raw() as usize;
    if idx < SIM_PINS {
        Ok(idx)
    } else {
        Err(SimGpioError::InvalidPin)
    }
}

impl SimGpio {
    pub const fn new() -> Self {
        Self {
            pins: [PinState::RESET; SIM_PINS],
            switches: [None; MAX_SWITCHES],
        }
    }

    /// Force the level seen on a pin, as an external signal would.
    pub fn drive_external(&mut self, pin: PinId, level: PinLevel) -> Result<(), SimGpioError> {
        self.pins[index(pin)?].external = Some(level);
        Ok(())
    }

    /// Stop forcing a pin; it falls back to its pull resistor.
    pub fn release_external(&mut self, pin: PinId) -> Result<(), SimGpioError> {
        self.pins[index(pin)?].external = None;
        Ok(())
    }

    /// Close the contact between `a` and `b`, wiring it up on first use.
    pub fn close_switch(&mut self, a: PinId, b: PinId) -> Result<(), SimGpioError> {
        index(a)?;
        index(b)?;

        if let Some(switch) = self.switches.iter_mut().flatten().find(|s| s.joins(a, b)) {
            switch.closed = true;
            return Ok(());
        }

        let slot = self
            .switches
            .iter_mut()
            .find(|s| s.is_none())
            .ok_or(SimGpioError::TooManySwitches)?;
        *slot = Some(Switch { a, b, closed: true });
        Ok(())
    }

    /// Open the contact between `a` and `b`. Unknown contacts are ignored.
    pub fn open_switch(&mut self, a: PinId, b: PinId) {
        if let Some(switch) = self.switches.iter_mut().flatten().find(|s| s.joins(a, b)) {
            switch.closed = false;
        }
    }

    pub fn mode(&self, pin: PinId) -> Option<PinMode> {
        index(pin).ok().map(|i| self.pins[i].mode)
    }

    /// Last level written to a pin.
    pub fn latch(&self, pin: PinId) -> Option<PinLevel> {
        index(pin).ok().map(|i| self.pins[i].latch)
    }

    fn switched_level(&self, pin: PinId) -> Option<PinLevel> {
        let mut level = None;
        for switch in self.switches.iter().flatten().filter(|s| s.closed) {
            let Some(other) = switch.other_end(pin) else {
                continue;
            };
            let Ok(i) = index(other) else {
                continue;
            };
            let state = &self.pins[i];
            if state.mode != PinMode::Output {
                continue;
            }
            match state.latch {
                PinLevel::Low => return Some(PinLevel::Low),
                PinLevel::High => level = Some(PinLevel::High),
            }
        }
        level
    }
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioController for SimGpio {
    type Error = SimGpioError;

    fn set_mode(&mut self, pin: PinId, mode: PinMode) -> Result<(), Self::Error> {
        self.pins[index(pin)?].mode = mode;
        Ok(())
    }

    fn read(&self, pin: PinId) -> Result<PinLevel, Self::Error> {
        let state = self.pins[index(pin)?];

        if state.mode == PinMode::Output {
            return Ok(state.latch);
        }

        if let Some(level) = self.switched_level(pin) {
            return Ok(level);
        }

        Ok(state.external.unwrap_or(match state.mode {
            PinMode::InputPullUp => PinLevel::High,
            _ => PinLevel::Low,
        }))
    }

    fn write(&mut self, pin: PinId, level: PinLevel) -> Result<(), Self::Error> {
        self.pins[index(pin)?].latch = level;
        Ok(())
    }
}
