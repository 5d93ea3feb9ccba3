//! Tick-driven input firmware.
//!
//! One periodic hardware interrupt drives a fixed table of software timers;
//! the timers in turn sample buttons, a key matrix and quadrature encoders
//! and queue what they see for the foreground to drain.
//!
//! # Module Organization
//!
//! - [`time`]: tick counter, tick/millisecond scale, timer multiplexer
//! - [`input`]: debounce state machine and the three channel kinds
//! - [`board`]: ties the scheduler, the pins and the channels together
//! - [`irq`]: registration of the board with the tick vector
//! - [`config`]: reference board wiring and constants
//!
//! # Usage Example
//!
//! ```
//! use common::arch::host::HostIrq;
//! use drivers::hal::timer::Prescale;
//! use drivers::platform::sim::{SimGpio, SimTimer};
//! use firmware::config::{self, ReferenceBoard};
//!
//! let board: ReferenceBoard<SimGpio, HostIrq> = config::reference_board(SimGpio::new());
//! let mut timer = SimTimer::default();
//! board.init(&mut timer, Prescale::Div64).unwrap();
//!
//! timer.raise();
//! board.handle_interrupt(&mut timer).unwrap();
//! assert_eq!(board.systick().ticks(), 1);
//! assert_eq!(board.buttons().get_event(), None);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod config;
pub mod input;
pub mod irq;
pub mod time;

pub use board::{Board, BoardError, Callback};
pub use input::{Event, EventFlags, InputChannel};
pub use time::{Systick, TickContext, TimerError, TimerId};
