//! Tick vector registration.
//!
//! The platform's interrupt vector cannot carry a `&Board`, so the board is
//! installed once as a `'static` handler and the vector calls [`dispatch`].

use spin::Once;

use common::sync::IrqControl;
use drivers::hal::gpio::GpioController;

use crate::board::Board;
use crate::input::InputChannel;

/// Something that runs once per hardware tick.
pub trait TickHandler: Sync {
    fn on_tick(&self);
}

impl<P, I, B, K, E, const N: usize> TickHandler for Board<P, I, B, K, E, N>
where
    P: GpioController,
    I: IrqControl,
    B: InputChannel<P>,
    K: InputChannel<P>,
    E: InputChannel<P>,
    Self: Sync,
{
    fn on_tick(&self) {
        Board::on_tick(self)
    }
}

static HANDLER: Once<&'static dyn TickHandler> = Once::new();

/// Install the tick handler. Only the first call wins; returns whether this
/// one did.
pub fn register(handler: &'static dyn TickHandler) -> bool {
    let mut installed = false;
    HANDLER.call_once(|| {
        installed = true;
        handler
    });
    installed
}

pub fn is_registered() -> bool {
    HANDLER.is_completed()
}

/// Run the installed handler. Called from the tick vector after the
/// hardware has been acknowledged; returns `false` if nothing is installed.
pub fn dispatch() -> bool {
    match HANDLER.get() {
        Some(handler) => {
            handler.on_tick();
            true
        }
        None => false,
    }
}
