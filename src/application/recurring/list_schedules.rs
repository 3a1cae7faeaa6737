use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::dto::ScheduleDto;
use crate::domain::recurring::{RecurringError, RecurringService};

#[derive(Debug, Default, Deserialize)]
pub struct ListSchedulesCommand {
  #[serde(default)]
  pub active_only: bool,
}

#[derive(Debug, Serialize)]
pub struct ListSchedulesResponse {
  pub schedules: Vec<ScheduleDto>,
}

pub struct ListSchedulesUseCase {
  recurring_service: Arc<RecurringService>,
}

impl ListSchedulesUseCase {
  pub fn new(recurring_service: Arc<RecurringService>) -> Self {
    Self { recurring_service }
  }

  pub async fn execute(
    &self,
    command: ListSchedulesCommand,
  ) -> Result<ListSchedulesResponse, RecurringError> {
    let schedules = self
      .recurring_service
      .list_schedules(command.active_only)
      .await?;

    Ok(ListSchedulesResponse {
      schedules: schedules.iter().map(ScheduleDto::from).collect(),
    })
  }
}
