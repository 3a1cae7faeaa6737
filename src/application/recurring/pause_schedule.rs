use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::dto::ScheduleDto;
use crate::domain::recurring::{RecurringError, RecurringService};

#[derive(Debug, Deserialize)]
pub struct PauseScheduleCommand {
  pub schedule_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PauseScheduleResponse {
  pub schedule: ScheduleDto,
}

pub struct PauseScheduleUseCase {
  recurring_service: Arc<RecurringService>,
}

impl PauseScheduleUseCase {
  pub fn new(recurring_service: Arc<RecurringService>) -> Self {
    Self { recurring_service }
  }

  pub async fn execute(
    &self,
    command: PauseScheduleCommand,
  ) -> Result<PauseScheduleResponse, RecurringError> {
    let schedule = self
      .recurring_service
      .pause_schedule(command.schedule_id)
      .await?;

    Ok(PauseScheduleResponse {
      schedule: ScheduleDto::from(&schedule),
    })
  }
}
