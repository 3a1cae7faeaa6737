use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::entities::RecurringSchedule;
use super::errors::RecurringError;

#[async_trait]
pub trait RecurringScheduleRepository: Send + Sync {
  async fn create(&self, schedule: RecurringSchedule) -> Result<RecurringSchedule, RecurringError>;
  /// Writes client, frequency, schedule day and template. Activity, the next
  /// date and the last invoice are left as stored.
  async fn update(&self, schedule: RecurringSchedule) -> Result<RecurringSchedule, RecurringError>;
  async fn set_active(&self, id: Uuid, active: bool) -> Result<RecurringSchedule, RecurringError>;
  /// Explicit user move of `next_invoice_date`, backwards included.
  async fn reschedule(
    &self,
    id: Uuid,
    next_invoice_date: NaiveDate,
  ) -> Result<RecurringSchedule, RecurringError>;
  /// Sets the last invoice and advances the next date to
  /// `max(stored, computed_next)`. Nothing else on the row changes.
  async fn record_firing(
    &self,
    id: Uuid,
    invoice_id: Uuid,
    computed_next: NaiveDate,
  ) -> Result<RecurringSchedule, RecurringError>;
  async fn delete(&self, id: Uuid) -> Result<(), RecurringError>;
  async fn find_by_id(&self, id: Uuid) -> Result<Option<RecurringSchedule>, RecurringError>;
  /// Ordered by `next_invoice_date`.
  async fn find_all(&self, active_only: bool) -> Result<Vec<RecurringSchedule>, RecurringError>;
  /// Active schedules with `next_invoice_date <= today`, oldest first.
  async fn find_due(&self, today: NaiveDate) -> Result<Vec<RecurringSchedule>, RecurringError>;
}
