//! System tick and software timers.
//!
//! One hardware interrupt drives everything here: [`Systick::on_tick`]
//! advances the tick counter and sweeps a fixed table of [`TimerSlot`]s,
//! invoking the callback of every slot that reaches zero.

mod scale;
mod slot;
mod systick;

pub use scale::TickScale;
pub use slot::{TimerError, TimerId, TimerSlot};
pub use systick::{Systick, TickContext, TimerTable};
