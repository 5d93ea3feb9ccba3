//! Configuration surface and the reference board's wiring.
//!
//! Capacities are const generics on the channel and scheduler types; the
//! constants here are the values the reference hardware was built with.

use common::sync::IrqControl;
use drivers::hal::gpio::{GpioController, PinId};
use drivers::platform::{CurrentPlatform, Platform};

use crate::board::Board;
use crate::input::{ButtonBank, ButtonConfig, EncoderBank, EncoderConfig, Keypad, KeypadConfig, SpeedBands};

pub mod defaults {
    /// Core clock feeding the tick counter.
    pub const F_CPU: u32 = 16_000_000;
    /// Counter increments per overflow of the 8-bit tick counter.
    pub const TICK_COUNTER_SPAN: u32 = 256;
    pub const TIMER_SLOTS: usize = 4;

    pub const BUTTON_COUNT: usize = 1;
    pub const BUTTON_BUFFER_SIZE: usize = 4;
    pub const BUTTON_STABLE_COUNT: u16 = 10;
    pub const BUTTON_SCAN_MS: u32 = 5;

    pub const KEYPAD_ROWS: usize = 4;
    pub const KEYPAD_COLS: usize = 4;
    pub const KEYPAD_BUFFER_SIZE: usize = 4;
    pub const KEYPAD_STABLE_COUNT: u16 = 5;
    pub const KEYPAD_SCAN_MS: u32 = 5;

    pub const ENCODER_COUNT: usize = 1;
    pub const ENCODER_BUFFER_SIZE: usize = 8;
    pub const ENCODER_SCAN_MS: u32 = 1;
    pub const ENCODER_INC_LOW: i32 = 1;
    pub const ENCODER_INC_MED: i32 = 100;
    pub const ENCODER_INC_HIGH: i32 = 10_000;
    pub const ENCODER_INC_VERY_HIGH: i32 = 1_000_000;
    pub const ENCODER_MS_LOW_MED: u32 = 200;
    pub const ENCODER_MS_MED_HIGH: u32 = 50;
    pub const ENCODER_MS_HIGH_VERY_HIGH: u32 = 10;
}

/// Port-and-bit pin names of the reference board.
pub mod pins {
    use drivers::hal::gpio::PinId;

    pub const PORT_B: u8 = 1;
    pub const PORT_C: u8 = 2;
    pub const PORT_D: u8 = 3;

    pub const B3: PinId = PinId::new(PORT_B, 3);
    pub const B4: PinId = PinId::new(PORT_B, 4);
    pub const B5: PinId = PinId::new(PORT_B, 5);
    pub const B6: PinId = PinId::new(PORT_B, 6);
    pub const C0: PinId = PinId::new(PORT_C, 0);
    pub const C1: PinId = PinId::new(PORT_C, 1);
    pub const C3: PinId = PinId::new(PORT_C, 3);
    pub const C4: PinId = PinId::new(PORT_C, 4);
    pub const D2: PinId = PinId::new(PORT_D, 2);
    pub const D3: PinId = PinId::new(PORT_D, 3);
    pub const D7: PinId = PinId::new(PORT_D, 7);
}

use defaults::*;

// B4 is a keypad row, so the push button sits on D7.
pub const BUTTON_PINS: [PinId; BUTTON_COUNT] = [pins::D7];
pub const KEYPAD_ROW_PINS: [PinId; KEYPAD_ROWS] = [pins::B3, pins::B4, pins::B5, pins::B6];
pub const KEYPAD_COL_PINS: [PinId; KEYPAD_COLS] = [pins::C0, pins::C1, pins::C3, pins::C4];
pub const ENCODER_PINS: [EncoderConfig; ENCODER_COUNT] = [EncoderConfig {
    a: pins::D2,
    b: pins::D3,
}];

pub const fn buttons() -> [ButtonConfig; BUTTON_COUNT] {
    let mut buttons = [ButtonConfig::active_low(BUTTON_PINS[0], BUTTON_STABLE_COUNT); BUTTON_COUNT];
    let mut i = 0;
    while i < BUTTON_COUNT {
        buttons[i] = ButtonConfig::active_low(BUTTON_PINS[i], BUTTON_STABLE_COUNT);
        i += 1;
    }
    buttons
}

pub const fn keypad() -> KeypadConfig<KEYPAD_ROWS, KEYPAD_COLS> {
    KeypadConfig {
        rows: KEYPAD_ROW_PINS,
        cols: KEYPAD_COL_PINS,
        stable_count: KEYPAD_STABLE_COUNT,
        scan_period_ms: KEYPAD_SCAN_MS,
    }
}

pub const fn speed_bands() -> SpeedBands {
    SpeedBands::new(
        [
            ENCODER_MS_LOW_MED,
            ENCODER_MS_MED_HIGH,
            ENCODER_MS_HIGH_VERY_HIGH,
        ],
        [
            ENCODER_INC_LOW,
            ENCODER_INC_MED,
            ENCODER_INC_HIGH,
            ENCODER_INC_VERY_HIGH,
        ],
    )
}

/// The reference board: one button, a 4x4 keypad and one encoder.
pub type ReferenceBoard<P, I> = Board<
    P,
    I,
    ButtonBank<I, BUTTON_COUNT, BUTTON_BUFFER_SIZE>,
    Keypad<I, KEYPAD_ROWS, KEYPAD_COLS, KEYPAD_BUFFER_SIZE>,
    EncoderBank<I, ENCODER_COUNT, ENCODER_BUFFER_SIZE>,
    TIMER_SLOTS,
>;

/// [`ReferenceBoard`] on the platform selected at build time.
pub type PlatformBoard = ReferenceBoard<
    <CurrentPlatform as Platform>::Gpio,
    <CurrentPlatform as Platform>::Irq,
>;

/// Claim the selected platform's peripherals and wire the reference board
/// onto its pins. The timer comes back separately for `Board::init` and the
/// interrupt vector.
///
/// # Safety
/// Must only be called once.
pub unsafe fn take_reference_board() -> (PlatformBoard, <CurrentPlatform as Platform>::Timer) {
    let (gpio, timer) = unsafe { CurrentPlatform::take() };
    (reference_board(gpio), timer)
}

pub const fn reference_board<P, I>(pins: P) -> ReferenceBoard<P, I>
where
    P: GpioController,
    I: IrqControl,
{
    Board::new(
        pins,
        ButtonBank::new(buttons(), BUTTON_SCAN_MS),
        Keypad::new(keypad()),
        EncoderBank::new(ENCODER_PINS, speed_bands(), ENCODER_SCAN_MS),
    )
}
