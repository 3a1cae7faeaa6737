use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::dto::ScheduleDto;
use crate::domain::recurring::{RecurringError, RecurringService};

#[derive(Debug, Deserialize)]
pub struct ResumeScheduleCommand {
  pub schedule_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ResumeScheduleResponse {
  pub schedule: ScheduleDto,
}

pub struct ResumeScheduleUseCase {
  recurring_service: Arc<RecurringService>,
}

impl ResumeScheduleUseCase {
  pub fn new(recurring_service: Arc<RecurringService>) -> Self {
    Self { recurring_service }
  }

  pub async fn execute(
    &self,
    command: ResumeScheduleCommand,
  ) -> Result<ResumeScheduleResponse, RecurringError> {
    let schedule = self
      .recurring_service
      .resume_schedule(command.schedule_id)
      .await?;

    Ok(ResumeScheduleResponse {
      schedule: ScheduleDto::from(&schedule),
    })
  }
}
