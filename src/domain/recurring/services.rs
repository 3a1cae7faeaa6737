use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::calendar::Clock;
use crate::domain::invoice::{
  ClientRepository, CurrencyCode, DocumentType, Invoice, InvoiceData, InvoiceService,
  LineItemData, PaymentTermsDays, TaxOverrides,
};

use super::entities::{InvoiceTemplate, RecurringSchedule};
use super::errors::RecurringError;
use super::ports::RecurringScheduleRepository;
use super::schedule::{initial_date, next_after_firing};
use super::value_objects::{Frequency, ScheduleDay};

/// Schedule creation data
#[derive(Debug, Clone)]
pub struct ScheduleData {
  pub client_id: Uuid,
  pub frequency: Frequency,
  pub schedule_day: i32,
  pub template: InvoiceTemplate,
  pub next_invoice_date: Option<NaiveDate>,
}

/// Schedule update data; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ScheduleUpdateData {
  pub client_id: Option<Uuid>,
  pub frequency: Option<Frequency>,
  pub schedule_day: Option<i32>,
  pub currency: Option<CurrencyCode>,
  pub payment_terms_days: Option<PaymentTermsDays>,
  pub notes: Option<String>,
  /// Supplied fields replace the stored overrides, the rest are kept
  pub tax: TaxOverrides,
  pub line_items: Option<Vec<LineItemData>>,
  pub next_invoice_date: Option<NaiveDate>,
}

/// Result of firing one schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRunOutcome {
  pub schedule_id: Uuid,
  pub success: bool,
  pub invoice_id: Option<Uuid>,
  pub invoice_number: Option<String>,
  pub next_invoice_date: Option<NaiveDate>,
  pub error: Option<String>,
}

impl ScheduleRunOutcome {
  fn fired(schedule: &RecurringSchedule, invoice: &Invoice) -> Self {
    Self {
      schedule_id: schedule.id,
      success: true,
      invoice_id: Some(invoice.id),
      invoice_number: Some(invoice.invoice_number.value().to_string()),
      next_invoice_date: Some(schedule.next_invoice_date),
      error: None,
    }
  }

  fn failed(schedule_id: Uuid, error: &RecurringError) -> Self {
    Self {
      schedule_id,
      success: false,
      invoice_id: None,
      invoice_number: None,
      next_invoice_date: None,
      error: Some(error.to_string()),
    }
  }
}

/// Aggregate result of one due-sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
  pub run_date: NaiveDate,
  pub processed: usize,
  pub succeeded: usize,
  pub failed: usize,
  pub outcomes: Vec<ScheduleRunOutcome>,
}

impl SweepReport {
  fn new(run_date: NaiveDate) -> Self {
    Self {
      run_date,
      processed: 0,
      succeeded: 0,
      failed: 0,
      outcomes: Vec::new(),
    }
  }

  fn record(&mut self, outcome: ScheduleRunOutcome) {
    self.processed += 1;
    if outcome.success {
      self.succeeded += 1;
    } else {
      self.failed += 1;
    }
    self.outcomes.push(outcome);
  }

  pub fn outcome_for(&self, schedule_id: Uuid) -> Option<&ScheduleRunOutcome> {
    self.outcomes.iter().find(|o| o.schedule_id == schedule_id)
  }
}

pub struct RecurringServiceDependencies {
  pub schedule_repo: Arc<dyn RecurringScheduleRepository>,
  pub client_repo: Arc<dyn ClientRepository>,
  pub invoice_service: Arc<InvoiceService>,
  pub clock: Arc<dyn Clock>,
}

pub struct RecurringService {
  schedule_repo: Arc<dyn RecurringScheduleRepository>,
  client_repo: Arc<dyn ClientRepository>,
  invoice_service: Arc<InvoiceService>,
  clock: Arc<dyn Clock>,
}

impl RecurringService {
  pub fn new(deps: RecurringServiceDependencies) -> Self {
    Self {
      schedule_repo: deps.schedule_repo,
      client_repo: deps.client_repo,
      invoice_service: deps.invoice_service,
      clock: deps.clock,
    }
  }

  pub async fn create_schedule(
    &self,
    data: ScheduleData,
  ) -> Result<RecurringSchedule, RecurringError> {
    let schedule_day = ScheduleDay::new(data.frequency, data.schedule_day)?;
    self.verify_client(data.client_id).await?;

    let next_invoice_date = match data.next_invoice_date {
      Some(date) => date,
      None => {
        let today = self.clock.today();
        initial_date(data.frequency, schedule_day, today)
          .ok_or(RecurringError::DateOutOfRange(today))?
      }
    };

    let schedule = RecurringSchedule::new(
      data.client_id,
      data.frequency,
      schedule_day,
      data.template,
      next_invoice_date,
    );
    let created = self.schedule_repo.create(schedule).await?;

    tracing::info!(
      schedule_id = %created.id,
      frequency = %created.frequency,
      next_invoice_date = %created.next_invoice_date,
      "Recurring schedule created"
    );
    Ok(created)
  }

  pub async fn update_schedule(
    &self,
    schedule_id: Uuid,
    data: ScheduleUpdateData,
  ) -> Result<RecurringSchedule, RecurringError> {
    let mut schedule = self.load_schedule(schedule_id).await?;

    if data.frequency.is_some() || data.schedule_day.is_some() {
      let frequency = data.frequency.unwrap_or(schedule.frequency);
      let day = data
        .schedule_day
        .unwrap_or(schedule.schedule_day.value() as i32);
      schedule.schedule_day = ScheduleDay::new(frequency, day)?;
      schedule.frequency = frequency;
    }

    if let Some(client_id) = data.client_id {
      self.verify_client(client_id).await?;
      schedule.client_id = client_id;
    }
    if let Some(currency) = data.currency {
      schedule.template.currency = Some(currency);
    }
    if let Some(terms) = data.payment_terms_days {
      schedule.template.payment_terms_days = Some(terms);
    }
    if let Some(notes) = data.notes {
      schedule.template.notes = Some(notes);
    }
    if data.tax.enabled.is_some() {
      schedule.template.tax.enabled = data.tax.enabled;
    }
    if data.tax.rate.is_some() {
      schedule.template.tax.rate = data.tax.rate;
    }
    if data.tax.name.is_some() {
      schedule.template.tax.name = data.tax.name;
    }
    if let Some(line_items) = data.line_items {
      schedule.template.line_items = line_items;
    }

    schedule.updated_at = chrono::Utc::now();
    let updated = self.schedule_repo.update(schedule).await?;

    match data.next_invoice_date {
      Some(next_invoice_date) => {
        self
          .schedule_repo
          .reschedule(schedule_id, next_invoice_date)
          .await
      }
      None => Ok(updated),
    }
  }

  pub async fn pause_schedule(&self, schedule_id: Uuid) -> Result<RecurringSchedule, RecurringError> {
    let schedule = self.schedule_repo.set_active(schedule_id, false).await?;
    tracing::info!(schedule_id = %schedule_id, "Recurring schedule paused");
    Ok(schedule)
  }

  pub async fn resume_schedule(
    &self,
    schedule_id: Uuid,
  ) -> Result<RecurringSchedule, RecurringError> {
    let schedule = self.schedule_repo.set_active(schedule_id, true).await?;
    tracing::info!(schedule_id = %schedule_id, "Recurring schedule resumed");
    Ok(schedule)
  }

  pub async fn delete_schedule(&self, schedule_id: Uuid) -> Result<(), RecurringError> {
    self.load_schedule(schedule_id).await?;
    self.schedule_repo.delete(schedule_id).await?;
    tracing::info!(schedule_id = %schedule_id, "Recurring schedule deleted");
    Ok(())
  }

  pub async fn get_schedule(&self, schedule_id: Uuid) -> Result<RecurringSchedule, RecurringError> {
    self.load_schedule(schedule_id).await
  }

  pub async fn list_schedules(
    &self,
    active_only: bool,
  ) -> Result<Vec<RecurringSchedule>, RecurringError> {
    self.schedule_repo.find_all(active_only).await
  }

  /// Fires one schedule now, whether or not it is due.
  pub async fn trigger_schedule(
    &self,
    schedule_id: Uuid,
  ) -> Result<ScheduleRunOutcome, RecurringError> {
    let schedule = self.load_schedule(schedule_id).await?;
    let today = self.clock.today();

    let outcome = match self.fire(schedule, today).await {
      Ok((schedule, invoice)) => ScheduleRunOutcome::fired(&schedule, &invoice),
      Err(e) => {
        tracing::warn!(schedule_id = %schedule_id, error = %e, "Manual trigger failed");
        ScheduleRunOutcome::failed(schedule_id, &e)
      }
    };
    Ok(outcome)
  }

  /// Fires every active schedule whose date has come. Schedules are handled
  /// one at a time; a failure is recorded and the sweep moves on.
  pub async fn process_due_schedules(&self) -> Result<SweepReport, RecurringError> {
    let today = self.clock.today();
    let due = self.schedule_repo.find_due(today).await?;
    let mut report = SweepReport::new(today);

    tracing::info!(run_date = %today, due = due.len(), "Starting recurring invoice sweep");

    for selected in due {
      let schedule_id = selected.id;

      // The selection can be stale by now: pauses, edits and deletions made
      // while earlier schedules were firing win.
      let schedule = match self.schedule_repo.find_by_id(schedule_id).await {
        Ok(Some(schedule)) if schedule.is_due(today) => schedule,
        Ok(_) => {
          tracing::debug!(schedule_id = %schedule_id, "Schedule no longer due, skipping");
          continue;
        }
        Err(e) => {
          tracing::error!(schedule_id = %schedule_id, error = %e, "Could not reload schedule");
          report.record(ScheduleRunOutcome::failed(schedule_id, &e));
          continue;
        }
      };

      let outcome = match self.fire(schedule, today).await {
        Ok((schedule, invoice)) => {
          tracing::info!(
            schedule_id = %schedule_id,
            invoice_number = %invoice.invoice_number,
            next_invoice_date = %schedule.next_invoice_date,
            "Recurring invoice generated"
          );
          ScheduleRunOutcome::fired(&schedule, &invoice)
        }
        Err(e) => {
          tracing::error!(schedule_id = %schedule_id, error = %e, "Recurring invoice failed");
          ScheduleRunOutcome::failed(schedule_id, &e)
        }
      };
      report.record(outcome);
    }

    tracing::info!(
      processed = report.processed,
      succeeded = report.succeeded,
      failed = report.failed,
      "Recurring invoice sweep finished"
    );
    Ok(report)
  }

  // Helper methods
  async fn fire(
    &self,
    schedule: RecurringSchedule,
    today: NaiveDate,
  ) -> Result<(RecurringSchedule, Invoice), RecurringError> {
    let next = next_after_firing(schedule.frequency, schedule.schedule_day, today)
      .ok_or(RecurringError::DateOutOfRange(today))?;

    let template = &schedule.template;
    let data = InvoiceData {
      client_id: Some(schedule.client_id),
      document_type: DocumentType::Invoice,
      invoice_number: None,
      issue_date: Some(today),
      due_date: None,
      payment_terms_days: template.payment_terms_days,
      currency: template.currency.clone(),
      notes: template.notes.clone(),
      tax: template.tax.clone(),
      line_items: template.line_items.clone(),
    };

    let (invoice, _) = self.invoice_service.create_invoice(data).await?;

    let schedule = self
      .schedule_repo
      .record_firing(schedule.id, invoice.id, next)
      .await?;
    Ok((schedule, invoice))
  }

  async fn verify_client(&self, client_id: Uuid) -> Result<(), RecurringError> {
    self
      .client_repo
      .find_by_id(client_id)
      .await?
      .map(|_| ())
      .ok_or(RecurringError::ClientNotFound(client_id))
  }

  async fn load_schedule(&self, schedule_id: Uuid) -> Result<RecurringSchedule, RecurringError> {
    self
      .schedule_repo
      .find_by_id(schedule_id)
      .await?
      .ok_or(RecurringError::ScheduleNotFound(schedule_id))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::calendar::FixedClock;
  use crate::domain::invoice::{
    BusinessProfile, BusinessProfileRepository, Client, ClientAddress, ClientName, ErrorKind,
    InvoiceRepository, InvoiceServiceDependencies, LineItemDescription, Quantity, TaxRate,
    UnitPrice, UnitType,
  };
  use crate::infrastructure::persistence::memory::InMemoryStore;
  use rust_decimal_macros::dec;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn services(store: &InMemoryStore, today: NaiveDate) -> RecurringService {
    services_with(store, today, Arc::new(store.clone()))
  }

  fn services_with(
    store: &InMemoryStore,
    today: NaiveDate,
    schedule_repo: Arc<dyn RecurringScheduleRepository>,
  ) -> RecurringService {
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(today));
    let invoice_service = Arc::new(InvoiceService::new(InvoiceServiceDependencies {
      invoice_repo: Arc::new(store.clone()),
      line_item_repo: Arc::new(store.clone()),
      client_repo: Arc::new(store.clone()),
      business_repo: Arc::new(store.clone()),
      clock: clock.clone(),
    }));
    RecurringService::new(RecurringServiceDependencies {
      schedule_repo,
      client_repo: Arc::new(store.clone()),
      invoice_service,
      clock,
    })
  }

  fn template() -> InvoiceTemplate {
    InvoiceTemplate {
      currency: Some(CurrencyCode::new("EUR").unwrap()),
      payment_terms_days: Some(PaymentTermsDays::new(14).unwrap()),
      notes: Some("Monthly retainer".to_string()),
      tax: TaxOverrides::default(),
      line_items: vec![LineItemData {
        description: LineItemDescription::new("Retainer".to_string()).unwrap(),
        quantity: Quantity::new(dec!(1)).unwrap(),
        unit_type: UnitType::Qty,
        unit_price: UnitPrice::new(dec!(500.00)).unwrap(),
      }],
    }
  }

  async fn seed_client(store: &InMemoryStore) -> Client {
    let client = Client::new(
      ClientName::new("Globex".to_string()).unwrap(),
      None,
      ClientAddress::default(),
    );
    ClientRepository::create(store, client).await.unwrap()
  }

  fn monthly(client_id: Uuid, day: i32, next: Option<NaiveDate>) -> ScheduleData {
    ScheduleData {
      client_id,
      frequency: Frequency::Monthly,
      schedule_day: day,
      template: template(),
      next_invoice_date: next,
    }
  }

  #[tokio::test]
  async fn test_create_validates_input() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let service = services(&store, date(2025, 1, 15));

    let err = service
      .create_schedule(ScheduleData {
        frequency: Frequency::Weekly,
        schedule_day: 7,
        ..monthly(client.id, 1, None)
      })
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = service
      .create_schedule(monthly(Uuid::new_v4(), 1, None))
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[tokio::test]
  async fn test_create_computes_initial_date() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let service = services(&store, date(2025, 1, 15));

    let schedule = service
      .create_schedule(monthly(client.id, 20, None))
      .await
      .unwrap();
    assert!(schedule.is_active);
    assert_eq!(schedule.next_invoice_date, date(2025, 1, 20));

    let explicit = service
      .create_schedule(monthly(client.id, 20, Some(date(2025, 6, 1))))
      .await
      .unwrap();
    assert_eq!(explicit.next_invoice_date, date(2025, 6, 1));
  }

  #[tokio::test]
  async fn test_month_end_firing_clamps() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let service = services(&store, date(2025, 1, 31));

    let schedule = service
      .create_schedule(monthly(client.id, 31, Some(date(2025, 1, 31))))
      .await
      .unwrap();

    let report = service.process_due_schedules().await.unwrap();
    assert_eq!(report.succeeded, 1);

    let schedule = service.get_schedule(schedule.id).await.unwrap();
    assert_eq!(schedule.next_invoice_date, date(2025, 2, 28));
  }

  #[tokio::test]
  async fn test_sweep_builds_invoice_from_template() {
    let store = InMemoryStore::new();
    store
      .save(BusinessProfile {
        tax_enabled: true,
        tax_rate: TaxRate::new(dec!(10)).unwrap(),
        ..BusinessProfile::default()
      })
      .await
      .unwrap();
    let client = seed_client(&store).await;
    let service = services(&store, date(2025, 1, 15));

    let schedule = service
      .create_schedule(monthly(client.id, 15, Some(date(2025, 1, 15))))
      .await
      .unwrap();

    let report = service.process_due_schedules().await.unwrap();
    let outcome = report.outcome_for(schedule.id).unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.invoice_number.as_deref(), Some("20250115-1"));

    let invoice = InvoiceRepository::find_by_id(&store, outcome.invoice_id.unwrap())
      .await
      .unwrap()
      .unwrap();
    assert_eq!(invoice.client_id, Some(client.id));
    assert_eq!(invoice.currency.as_str(), "EUR");
    assert_eq!(invoice.due_date, date(2025, 1, 29));
    assert_eq!(invoice.notes.as_deref(), Some("Monthly retainer"));
    assert_eq!(invoice.subtotal, dec!(500.00));
    assert_eq!(invoice.total, dec!(550.00));

    let schedule = service.get_schedule(schedule.id).await.unwrap();
    assert_eq!(schedule.last_invoice_id, outcome.invoice_id);
    assert_eq!(schedule.next_invoice_date, date(2025, 2, 15));
  }

  #[tokio::test]
  async fn test_one_failing_schedule_does_not_stop_the_sweep() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let service = services(&store, date(2025, 1, 15));

    // A references a client that no longer exists
    let broken = RecurringSchedule::new(
      Uuid::new_v4(),
      Frequency::Monthly,
      ScheduleDay::new(Frequency::Monthly, 15).unwrap(),
      template(),
      date(2025, 1, 10),
    );
    let broken = RecurringScheduleRepository::create(&store, broken).await.unwrap();
    let healthy = service
      .create_schedule(monthly(client.id, 15, Some(date(2025, 1, 15))))
      .await
      .unwrap();

    let report = service.process_due_schedules().await.unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 1);

    let failed = report.outcome_for(broken.id).unwrap();
    assert!(!failed.success);
    assert!(failed.error.is_some());
    assert!(failed.invoice_id.is_none());

    let fired = report.outcome_for(healthy.id).unwrap();
    assert!(fired.success);
    assert!(fired.invoice_id.is_some());

    let broken = service.get_schedule(broken.id).await.unwrap();
    assert_eq!(broken.next_invoice_date, date(2025, 1, 10));
    assert_eq!(broken.last_invoice_id, None);
    let healthy = service.get_schedule(healthy.id).await.unwrap();
    assert_eq!(healthy.next_invoice_date, date(2025, 2, 15));
  }

  #[tokio::test]
  async fn test_paused_schedules_are_skipped() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let service = services(&store, date(2025, 1, 15));

    let schedule = service
      .create_schedule(monthly(client.id, 15, Some(date(2025, 1, 15))))
      .await
      .unwrap();
    let paused = service.pause_schedule(schedule.id).await.unwrap();
    assert!(!paused.is_active);

    let report = service.process_due_schedules().await.unwrap();
    assert_eq!(report.processed, 0);
    assert!(service.list_schedules(true).await.unwrap().is_empty());

    service.resume_schedule(schedule.id).await.unwrap();
    let report = service.process_due_schedules().await.unwrap();
    assert_eq!(report.succeeded, 1);
  }

  #[tokio::test]
  async fn test_sweep_does_not_refire_after_advancing() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let service = services(&store, date(2025, 1, 15));

    service
      .create_schedule(monthly(client.id, 15, Some(date(2025, 1, 15))))
      .await
      .unwrap();

    assert_eq!(service.process_due_schedules().await.unwrap().processed, 1);
    assert_eq!(service.process_due_schedules().await.unwrap().processed, 0);
  }

  #[tokio::test]
  async fn test_manual_trigger_fires_future_schedule_without_rewinding() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let service = services(&store, date(2025, 1, 10));

    let schedule = service
      .create_schedule(monthly(client.id, 15, Some(date(2025, 3, 15))))
      .await
      .unwrap();

    let outcome = service.trigger_schedule(schedule.id).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.invoice_number.as_deref(), Some("20250110-1"));
    assert_eq!(outcome.next_invoice_date, Some(date(2025, 3, 15)));

    let err = service.trigger_schedule(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[tokio::test]
  async fn test_update_revalidates_schedule_day() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let service = services(&store, date(2025, 1, 15));

    let schedule = service
      .create_schedule(monthly(client.id, 20, None))
      .await
      .unwrap();

    // Day 20 is not a weekday number
    let err = service
      .update_schedule(
        schedule.id,
        ScheduleUpdateData {
          frequency: Some(Frequency::Weekly),
          ..ScheduleUpdateData::default()
        },
      )
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let updated = service
      .update_schedule(
        schedule.id,
        ScheduleUpdateData {
          frequency: Some(Frequency::Weekly),
          schedule_day: Some(4),
          notes: Some("Weekly support".to_string()),
          ..ScheduleUpdateData::default()
        },
      )
      .await
      .unwrap();
    assert_eq!(updated.frequency, Frequency::Weekly);
    assert_eq!(updated.schedule_day.value(), 4);
    assert_eq!(updated.template.notes.as_deref(), Some("Weekly support"));
  }

  #[tokio::test]
  async fn test_delete_is_permanent() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let service = services(&store, date(2025, 1, 15));

    let schedule = service
      .create_schedule(monthly(client.id, 20, None))
      .await
      .unwrap();
    service.delete_schedule(schedule.id).await.unwrap();

    let err = service.get_schedule(schedule.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(service.list_schedules(false).await.unwrap().is_empty());
  }

  /// Where a concurrent user pauses the schedule while a sweep is running
  #[derive(Clone, Copy)]
  enum PauseAt {
    AfterSelection,
    AfterReload,
  }

  /// Schedule store that pauses every schedule it hands out at one point of
  /// the sweep, the way another request would.
  struct PausingRepository {
    store: InMemoryStore,
    pause_at: PauseAt,
  }

  impl PausingRepository {
    async fn pause_all(&self, schedules: &[RecurringSchedule]) {
      for schedule in schedules {
        RecurringScheduleRepository::set_active(&self.store, schedule.id, false)
          .await
          .unwrap();
      }
    }
  }

  #[async_trait::async_trait]
  impl RecurringScheduleRepository for PausingRepository {
    async fn create(
      &self,
      schedule: RecurringSchedule,
    ) -> Result<RecurringSchedule, RecurringError> {
      RecurringScheduleRepository::create(&self.store, schedule).await
    }

    async fn update(
      &self,
      schedule: RecurringSchedule,
    ) -> Result<RecurringSchedule, RecurringError> {
      RecurringScheduleRepository::update(&self.store, schedule).await
    }

    async fn set_active(
      &self,
      id: Uuid,
      active: bool,
    ) -> Result<RecurringSchedule, RecurringError> {
      RecurringScheduleRepository::set_active(&self.store, id, active).await
    }

    async fn reschedule(
      &self,
      id: Uuid,
      next_invoice_date: NaiveDate,
    ) -> Result<RecurringSchedule, RecurringError> {
      RecurringScheduleRepository::reschedule(&self.store, id, next_invoice_date).await
    }

    async fn record_firing(
      &self,
      id: Uuid,
      invoice_id: Uuid,
      computed_next: NaiveDate,
    ) -> Result<RecurringSchedule, RecurringError> {
      RecurringScheduleRepository::record_firing(&self.store, id, invoice_id, computed_next).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RecurringError> {
      RecurringScheduleRepository::delete(&self.store, id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RecurringSchedule>, RecurringError> {
      let found = RecurringScheduleRepository::find_by_id(&self.store, id).await?;
      if let (PauseAt::AfterReload, Some(schedule)) = (self.pause_at, &found) {
        self.pause_all(std::slice::from_ref(schedule)).await;
      }
      Ok(found)
    }

    async fn find_all(&self, active_only: bool) -> Result<Vec<RecurringSchedule>, RecurringError> {
      RecurringScheduleRepository::find_all(&self.store, active_only).await
    }

    async fn find_due(&self, today: NaiveDate) -> Result<Vec<RecurringSchedule>, RecurringError> {
      let due = RecurringScheduleRepository::find_due(&self.store, today).await?;
      if let PauseAt::AfterSelection = self.pause_at {
        self.pause_all(&due).await;
      }
      Ok(due)
    }
  }

  #[tokio::test]
  async fn test_schedule_paused_after_selection_is_not_fired() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let repo = Arc::new(PausingRepository {
      store: store.clone(),
      pause_at: PauseAt::AfterSelection,
    });
    let service = services_with(&store, date(2025, 1, 15), repo);

    let schedule = service
      .create_schedule(monthly(client.id, 15, Some(date(2025, 1, 15))))
      .await
      .unwrap();

    let report = service.process_due_schedules().await.unwrap();
    assert_eq!(report.processed, 0);
    assert!(InvoiceRepository::find_active(&store, None).await.unwrap().is_empty());

    let stored = service.get_schedule(schedule.id).await.unwrap();
    assert!(!stored.is_active);
    assert_eq!(stored.next_invoice_date, date(2025, 1, 15));
  }

  #[tokio::test]
  async fn test_pause_during_firing_survives_the_firing() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let repo = Arc::new(PausingRepository {
      store: store.clone(),
      pause_at: PauseAt::AfterReload,
    });
    let service = services_with(&store, date(2025, 1, 15), repo);

    let schedule = service
      .create_schedule(monthly(client.id, 15, Some(date(2025, 1, 15))))
      .await
      .unwrap();

    let report = service.process_due_schedules().await.unwrap();
    assert_eq!(report.succeeded, 1);

    let stored = RecurringScheduleRepository::find_by_id(&store, schedule.id)
      .await
      .unwrap()
      .unwrap();
    assert!(!stored.is_active);
    assert_eq!(stored.next_invoice_date, date(2025, 2, 15));
    assert!(stored.last_invoice_id.is_some());

    // Paused, so the next sweep leaves it alone
    let report = services(&store, date(2025, 2, 15))
      .process_due_schedules()
      .await
      .unwrap();
    assert_eq!(report.processed, 0);
  }

  #[tokio::test]
  async fn test_explicit_next_date_may_move_backwards() {
    let store = InMemoryStore::new();
    let client = seed_client(&store).await;
    let service = services(&store, date(2025, 1, 15));

    let schedule = service
      .create_schedule(monthly(client.id, 20, Some(date(2025, 3, 20))))
      .await
      .unwrap();
    service.pause_schedule(schedule.id).await.unwrap();

    let updated = service
      .update_schedule(
        schedule.id,
        ScheduleUpdateData {
          notes: Some("Rescheduled".to_string()),
          next_invoice_date: Some(date(2025, 1, 20)),
          ..ScheduleUpdateData::default()
        },
      )
      .await
      .unwrap();
    assert_eq!(updated.next_invoice_date, date(2025, 1, 20));
    assert_eq!(updated.template.notes.as_deref(), Some("Rescheduled"));
    assert!(!updated.is_active);
  }
}
