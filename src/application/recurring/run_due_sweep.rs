use std::sync::Arc;

use crate::domain::recurring::{RecurringError, RecurringService, SweepReport};

/// Entry point for whatever drives the periodic sweep
pub struct RunDueSweepUseCase {
  recurring_service: Arc<RecurringService>,
}

impl RunDueSweepUseCase {
  pub fn new(recurring_service: Arc<RecurringService>) -> Self {
    Self { recurring_service }
  }

  pub async fn execute(&self) -> Result<SweepReport, RecurringError> {
    self.recurring_service.process_due_schedules().await
  }
}
