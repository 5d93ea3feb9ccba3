pub mod irq;
pub use irq::ArmIrq;
