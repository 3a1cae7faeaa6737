use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::recurring::{RecurringError, RecurringService, ScheduleRunOutcome};

#[derive(Debug, Deserialize)]
pub struct TriggerScheduleCommand {
  pub schedule_id: Uuid,
}

/// Generates an invoice from one schedule right now, due or not. A failed
/// firing is reported in the outcome; only an unknown schedule is an error.
pub struct TriggerScheduleUseCase {
  recurring_service: Arc<RecurringService>,
}

impl TriggerScheduleUseCase {
  pub fn new(recurring_service: Arc<RecurringService>) -> Self {
    Self { recurring_service }
  }

  pub async fn execute(
    &self,
    command: TriggerScheduleCommand,
  ) -> Result<ScheduleRunOutcome, RecurringError> {
    self
      .recurring_service
      .trigger_schedule(command.schedule_id)
      .await
  }
}
