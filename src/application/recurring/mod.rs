pub mod create_schedule;
pub mod delete_schedule;
pub mod dto;
pub mod list_schedules;
pub mod pause_schedule;
pub mod resume_schedule;
pub mod run_due_sweep;
#[cfg(test)]
mod test_support;
pub mod trigger_schedule;
pub mod update_schedule;

pub use create_schedule::{CreateScheduleCommand, CreateScheduleResponse, CreateScheduleUseCase};
pub use delete_schedule::{DeleteScheduleCommand, DeleteScheduleUseCase};
pub use dto::{ScheduleDto, TemplateLineItemDto};
pub use list_schedules::{ListSchedulesCommand, ListSchedulesResponse, ListSchedulesUseCase};
pub use pause_schedule::{PauseScheduleCommand, PauseScheduleResponse, PauseScheduleUseCase};
pub use resume_schedule::{ResumeScheduleCommand, ResumeScheduleResponse, ResumeScheduleUseCase};
pub use run_due_sweep::RunDueSweepUseCase;
pub use trigger_schedule::{TriggerScheduleCommand, TriggerScheduleUseCase};
pub use update_schedule::{UpdateScheduleCommand, UpdateScheduleResponse, UpdateScheduleUseCase};
