pub mod irq;
pub use irq::HostIrq;
