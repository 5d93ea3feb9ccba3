use common::collections::EventFifo;
use common::sync::{IrqControl, IrqLock};
use drivers::hal::gpio::{GpioController, PinId, PinLevel, PinMode};

use super::{Event, EventFlags, InputChannel, InputError};

/// Count change for a move from `[previous]` to `[current]`, where a state is
/// `A << 1 | B`. Invalid double transitions count as zero.
const TRANSITIONS: [[i8; 4]; 4] = [
    [0, 1, -1, 0],
    [-1, 0, 0, 1],
    [1, 0, 0, -1],
    [0, -1, 1, 0],
];

/// Signed step between two 2-bit quadrature states.
pub const fn quadrature_step(previous: u8, current: u8) -> i8 {
    TRANSITIONS[(previous & 0b11) as usize][(current & 0b11) as usize]
}

/// Channel A/B pins of one encoder, both read with pull-ups.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    pub a: PinId,
    pub b: PinId,
}

/// Speed-dependent count increment.
///
/// The time since the encoder last moved selects one of four bands; faster
/// rotation uses a bigger increment.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SpeedBands {
    /// Ascending band limits in ms: very high, high, medium.
    limits_ms: [u32; 3],
    /// Increments for very high, high, medium and low speed.
    increments: [i32; 4],
}

impl SpeedBands {
    /// Every step counts one.
    pub const UNIT: SpeedBands = SpeedBands {
        limits_ms: [0, 0, 0],
        increments: [1; 4],
    };

    /// `thresholds_ms` are the low/medium, medium/high and high/very-high
    /// boundaries; they are sorted, so order does not matter.
    /// `increments` run from low to very high speed.
    pub const fn new(thresholds_ms: [u32; 3], increments: [i32; 4]) -> Self {
        let [mut x, mut y, mut z] = thresholds_ms;
        if x > y {
            (x, y) = (y, x);
        }
        if y > z {
            (y, z) = (z, y);
        }
        if x > y {
            (x, y) = (y, x);
        }
        let [low, medium, high, very_high] = increments;
        Self {
            limits_ms: [x, y, z],
            increments: [very_high, high, medium, low],
        }
    }

    /// Increment for a step that came `elapsed_ms` after the previous one.
    /// `None` means the encoder has not moved before and counts as slow.
    pub fn increment(&self, elapsed_ms: Option<u64>) -> i32 {
        let Some(elapsed) = elapsed_ms else {
            return self.increments[3];
        };
        self.limits_ms
            .iter()
            .position(|&limit| elapsed <= limit as u64)
            .map_or(self.increments[3], |band| self.increments[band])
    }
}

#[derive(Debug, Copy, Clone, Default)]
struct EncoderState {
    last: u8,
    last_step_ms: Option<u64>,
    count: i32,
}

/// `N` quadrature encoders with speed scaling.
///
/// Each detected step adjusts the encoder's count and queues
/// `Event::new(i, flags)`, with [`EventFlags::REVERSE`] set for negative
/// steps.
pub struct EncoderBank<I: IrqControl, const N: usize, const Q: usize> {
    encoders: [EncoderConfig; N],
    bands: SpeedBands,
    scan_period_ms: u32,
    state: IrqLock<[EncoderState; N], I>,
    events: EventFifo<Event, I, Q>,
}

impl<I: IrqControl, const N: usize, const Q: usize> EncoderBank<I, N, Q> {
    const VALID_COUNT: () = assert!(
        N as u64 <= Event::MAX_INDEX as u64 + 1,
        "too many encoders for a 6-bit event index"
    );

    pub const fn new(encoders: [EncoderConfig; N], bands: SpeedBands, scan_period_ms: u32) -> Self {
        let () = Self::VALID_COUNT;
        Self {
            encoders,
            bands,
            scan_period_ms,
            state: IrqLock::new(
                [EncoderState {
                    last: 0,
                    last_step_ms: None,
                    count: 0,
                }; N],
            ),
            events: EventFifo::new(),
        }
    }

    pub fn bands(&self) -> &SpeedBands {
        &self.bands
    }

    /// Accumulated count of encoder `index`.
    pub fn count(&self, index: usize) -> Result<i32, InputError> {
        if index >= N {
            return Err(InputError::InvalidIndex);
        }
        self.state
            .with(|state| state[index].count)
            .ok_or(InputError::Busy)
    }

    pub fn set_count(&self, index: usize, count: i32) -> Result<(), InputError> {
        if index >= N {
            return Err(InputError::InvalidIndex);
        }
        self.state
            .with(|state| state[index].count = count)
            .ok_or(InputError::Busy)
    }

    pub fn scan_period_ms(&self) -> u32 {
        self.scan_period_ms
    }

    pub fn waiting(&self) -> usize {
        self.events.len()
    }

    pub fn get_event(&self) -> Option<Event> {
        self.events.pop()
    }
}

fn read_state<P: GpioController>(pins: &P, encoder: &EncoderConfig) -> Option<u8> {
    let a = pins.read(encoder.a).ok()? == PinLevel::High;
    let b = pins.read(encoder.b).ok()? == PinLevel::High;
    Some(((a as u8) << 1) | b as u8)
}

impl<P: GpioController, I: IrqControl, const N: usize, const Q: usize> InputChannel<P>
    for EncoderBank<I, N, Q>
{
    fn configure(&self, pins: &mut P) -> Result<(), P::Error> {
        for encoder in &self.encoders {
            pins.set_mode(encoder.a, PinMode::InputPullUp)?;
            pins.set_mode(encoder.b, PinMode::InputPullUp)?;
        }

        // Start from the resting position so the first scan sees no motion,
        // and forget step times from before a restart of the clock.
        self.state.with(|state| {
            for (encoder, state) in self.encoders.iter().zip(state.iter_mut()) {
                if let Some(current) = read_state(pins, encoder) {
                    state.last = current;
                }
                state.last_step_ms = None;
            }
        });
        Ok(())
    }

    fn scan_period_ms(&self) -> u32 {
        EncoderBank::scan_period_ms(self)
    }

    fn scan(&self, pins: &mut P, now_ms: u64) {
        let Some(mut state) = self.state.lock() else {
            return;
        };

        for (index, (encoder, state)) in self.encoders.iter().zip(state.iter_mut()).enumerate() {
            let Some(current) = read_state(pins, encoder) else {
                continue;
            };
            let step = quadrature_step(state.last, current);
            state.last = current;
            if step == 0 {
                continue;
            }

            // A clock that went backwards was restarted; treat the step as slow.
            let elapsed = state
                .last_step_ms
                .filter(|&last| last <= now_ms)
                .map(|last| now_ms - last);
            state.last_step_ms = Some(now_ms);
            let delta = (step as i32).wrapping_mul(self.bands.increment(elapsed));
            state.count = state.count.wrapping_add(delta);

            let flags = if step < 0 {
                EventFlags::REVERSE
            } else {
                EventFlags::empty()
            };
            self.events.push(Event::new(index as u8, flags));
        }
    }

    fn waiting(&self) -> usize {
        EncoderBank::waiting(self)
    }

    fn get_event(&self) -> Option<Event> {
        EncoderBank::get_event(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::arch::host::HostIrq;
    use drivers::platform::sim::SimGpio;

    const A: PinId = PinId::new(3, 2);
    const B: PinId = PinId::new(3, 3);

    // Forward Gray sequence starting from rest (both high).
    const FORWARD: [(PinLevel, PinLevel); 4] = [
        (PinLevel::High, PinLevel::Low),
        (PinLevel::Low, PinLevel::Low),
        (PinLevel::Low, PinLevel::High),
        (PinLevel::High, PinLevel::High),
    ];

    fn bands() -> SpeedBands {
        SpeedBands::new([200, 50, 10], [1, 100, 10_000, 1_000_000])
    }

    fn bank() -> (EncoderBank<HostIrq, 1, 8>, SimGpio) {
        let bank = EncoderBank::new([EncoderConfig { a: A, b: B }], bands(), 1);
        let mut gpio = SimGpio::new();
        bank.configure(&mut gpio).unwrap();
        (bank, gpio)
    }

    fn set(gpio: &mut SimGpio, (a, b): (PinLevel, PinLevel)) {
        gpio.drive_external(A, a).unwrap();
        gpio.drive_external(B, b).unwrap();
    }

    #[test]
    fn transition_table() {
        assert_eq!(quadrature_step(0b11, 0b10), 1);
        assert_eq!(quadrature_step(0b10, 0b11), -1);
        assert_eq!(quadrature_step(0b00, 0b01), 1);
        assert_eq!(quadrature_step(0b00, 0b11), 0);
        for state in 0..4 {
            assert_eq!(quadrature_step(state, state), 0);
        }
    }

    #[test]
    fn bands_are_sorted_and_matched_fastest_first() {
        let bands = bands();
        assert_eq!(bands.increment(None), 1);
        assert_eq!(bands.increment(Some(500)), 1);
        assert_eq!(bands.increment(Some(200)), 100);
        assert_eq!(bands.increment(Some(51)), 100);
        assert_eq!(bands.increment(Some(50)), 10_000);
        assert_eq!(bands.increment(Some(10)), 1_000_000);
        assert_eq!(bands.increment(Some(0)), 1_000_000);
    }

    #[test]
    fn unit_bands_always_count_one() {
        assert_eq!(SpeedBands::UNIT.increment(Some(0)), 1);
        assert_eq!(SpeedBands::UNIT.increment(Some(10_000)), 1);
    }

    #[test]
    fn resting_encoder_is_silent() {
        let (bank, mut gpio) = bank();
        for t in 0..10 {
            bank.scan(&mut gpio, t);
        }
        assert_eq!(bank.waiting(), 0);
        assert_eq!(bank.count(0), Ok(0));
    }

    #[test]
    fn slow_rotation_counts_single_steps() {
        let (bank, mut gpio) = bank();
        let mut now = 0;
        for levels in FORWARD {
            set(&mut gpio, levels);
            now += 1_000;
            bank.scan(&mut gpio, now);
        }
        assert_eq!(bank.count(0), Ok(4));
        assert_eq!(bank.waiting(), 4);
        let event = bank.get_event().unwrap();
        assert_eq!(event.index(), 0);
        assert!(!event.is_reverse());
    }

    #[test]
    fn fast_rotation_scales_up() {
        let (bank, mut gpio) = bank();
        // Backward through the sequence: 11 -> 01 -> 00 -> 10 -> 11.
        let backward = [
            (PinLevel::Low, PinLevel::High),
            (PinLevel::Low, PinLevel::Low),
            (PinLevel::High, PinLevel::Low),
            (PinLevel::High, PinLevel::High),
        ];
        let mut now = 0;
        for levels in backward {
            set(&mut gpio, levels);
            now += 5;
            bank.scan(&mut gpio, now);
        }
        // First step has no history and counts as slow.
        assert_eq!(bank.count(0), Ok(-(1 + 3 * 1_000_000)));
        assert!(bank.get_event().unwrap().is_reverse());
    }

    #[test]
    fn double_transition_is_ignored() {
        let (bank, mut gpio) = bank();
        set(&mut gpio, (PinLevel::Low, PinLevel::Low));
        bank.scan(&mut gpio, 1_000);
        assert_eq!(bank.count(0), Ok(0));
        assert_eq!(bank.waiting(), 0);

        set(&mut gpio, (PinLevel::High, PinLevel::High));
        bank.scan(&mut gpio, 1_001);
        assert_eq!(bank.count(0), Ok(0));
        assert_eq!(bank.waiting(), 0);

        // The skipped state is still tracked: 11 -> 10 is a normal step.
        set(&mut gpio, (PinLevel::High, PinLevel::Low));
        bank.scan(&mut gpio, 2_000);
        assert_eq!(bank.count(0), Ok(1));
    }

    #[test]
    fn extreme_increment_wraps_instead_of_panicking() {
        let bank: EncoderBank<HostIrq, 1, 8> = EncoderBank::new(
            [EncoderConfig { a: A, b: B }],
            SpeedBands::new([1, 2, 3], [i32::MIN; 4]),
            1,
        );
        let mut gpio = SimGpio::new();
        bank.configure(&mut gpio).unwrap();

        // 11 -> 01 is a reverse step.
        gpio.drive_external(A, PinLevel::Low).unwrap();
        bank.scan(&mut gpio, 10);
        assert_eq!(bank.count(0), Ok(i32::MIN));
        assert!(bank.get_event().unwrap().is_reverse());
    }

    #[test]
    fn reconfigure_forgets_step_times() {
        let (bank, mut gpio) = bank();
        set(&mut gpio, FORWARD[0]);
        bank.scan(&mut gpio, 5_000);
        assert_eq!(bank.count(0), Ok(1));

        // Scheduler restarted: the clock is back near zero.
        bank.configure(&mut gpio).unwrap();
        bank.set_count(0, 0).unwrap();
        set(&mut gpio, FORWARD[1]);
        bank.scan(&mut gpio, 3);
        assert_eq!(bank.count(0), Ok(1));
    }

    #[test]
    fn clock_running_backwards_counts_as_slow() {
        let (bank, mut gpio) = bank();
        set(&mut gpio, FORWARD[0]);
        bank.scan(&mut gpio, 5_000);
        set(&mut gpio, FORWARD[1]);
        bank.scan(&mut gpio, 4);
        assert_eq!(bank.count(0), Ok(2));
    }

    #[test]
    fn set_count_overrides() {
        let (bank, _) = bank();
        bank.set_count(0, 42).unwrap();
        assert_eq!(bank.count(0), Ok(42));
        assert_eq!(bank.set_count(1, 0), Err(InputError::InvalidIndex));
    }
}
