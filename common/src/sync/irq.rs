use core::fmt::Debug;

/// Architecture-specific interrupt masking interface.
///
/// Foreground code brackets every access to state shared with the tick
/// interrupt with `disable`/`restore`. `restore` puts back whatever was saved
/// rather than unconditionally unmasking, so sections nest.
pub trait IrqControl {
    /// Saved interrupt state
    type State: Copy + Debug;

    /// Disable interrupts and return the previous state.
    fn disable() -> Self::State;

    /// Restore interrupts to a previous state.
    fn restore(state: Self::State);

    /// Unmask interrupts unconditionally, once at the end of bring-up.
    fn enable();
}
