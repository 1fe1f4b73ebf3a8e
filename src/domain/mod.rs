//! Domain layer: value objects, pure analysis logic, and decision tables.

pub mod analysis;
pub mod assessment;
pub mod baseline;
pub mod checkpoint;
pub mod foundation;
pub mod message;
pub mod risk;
pub mod screening;
pub mod temporal;
