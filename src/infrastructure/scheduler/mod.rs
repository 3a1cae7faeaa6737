pub mod due_sweep_runner;

pub use due_sweep_runner::DueSweepRunner;
