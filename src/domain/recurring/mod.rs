pub mod entities;
pub mod errors;
pub mod ports;
pub mod schedule;
pub mod services;
pub mod value_objects;

pub use entities::{InvoiceTemplate, RecurringSchedule};
pub use errors::RecurringError;
pub use ports::RecurringScheduleRepository;
pub use services::{
  RecurringService, RecurringServiceDependencies, ScheduleData, ScheduleRunOutcome,
  ScheduleUpdateData, SweepReport,
};
pub use value_objects::{Frequency, ScheduleDay};
