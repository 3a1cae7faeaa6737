pub mod calendar;
pub mod invoice;
pub mod recurring;
