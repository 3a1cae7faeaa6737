//! Application layer
//!
//! Use cases that take raw caller input, validate it into domain value
//! objects and delegate to the domain services.

pub mod invoice;
pub mod recurring;
