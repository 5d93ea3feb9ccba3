//! Allocation-free containers.

pub mod fifo;
pub use fifo::EventFifo;
