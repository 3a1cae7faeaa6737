use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::recurring::{RecurringError, RecurringService};

#[derive(Debug, Deserialize)]
pub struct DeleteScheduleCommand {
  pub schedule_id: Uuid,
}

/// Removes the schedule permanently. Invoices it already generated stay.
pub struct DeleteScheduleUseCase {
  recurring_service: Arc<RecurringService>,
}

impl DeleteScheduleUseCase {
  pub fn new(recurring_service: Arc<RecurringService>) -> Self {
    Self { recurring_service }
  }

  pub async fn execute(&self, command: DeleteScheduleCommand) -> Result<(), RecurringError> {
    self
      .recurring_service
      .delete_schedule(command.schedule_id)
      .await
  }
}
