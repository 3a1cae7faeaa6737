//! In-memory repository adapters
//!
//! Suitable for tests and single-process deployments that don't need
//! persistence across restarts. One lock guards the whole store, so every
//! multi-row write is atomic just like the PostgreSQL transactions.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::invoice::{
  BusinessProfile, BusinessProfileRepository, Client, ClientRepository, Invoice, InvoiceError,
  InvoiceLineItem, InvoiceLineItemRepository, InvoiceRepository, InvoiceStatus, InvoiceTotals,
  LineItemChange,
};
use crate::domain::recurring::{RecurringError, RecurringSchedule, RecurringScheduleRepository};

#[derive(Default)]
struct State {
  clients: HashMap<Uuid, Client>,
  business_profile: Option<BusinessProfile>,
  invoices: HashMap<Uuid, Invoice>,
  line_items: HashMap<Uuid, InvoiceLineItem>,
  schedules: HashMap<Uuid, RecurringSchedule>,
}

impl State {
  fn number_taken(&self, number: &str) -> bool {
    self
      .invoices
      .values()
      .any(|invoice| invoice.invoice_number.value() == number)
  }

  fn live_invoice_mut(&mut self, id: Uuid) -> Result<&mut Invoice, InvoiceError> {
    self
      .invoices
      .get_mut(&id)
      .filter(|invoice| !invoice.is_deleted())
      .ok_or(InvoiceError::InvoiceNotFound(id))
  }

  fn schedule_mut(&mut self, id: Uuid) -> Result<&mut RecurringSchedule, RecurringError> {
    self
      .schedules
      .get_mut(&id)
      .ok_or(RecurringError::ScheduleNotFound(id))
  }

  fn items_of(&self, invoice_id: Uuid) -> Vec<InvoiceLineItem> {
    let mut items: Vec<InvoiceLineItem> = self
      .line_items
      .values()
      .filter(|item| item.invoice_id == invoice_id)
      .cloned()
      .collect();
    items.sort_by_key(|item| item.sort_order);
    items
  }
}

/// Shared in-memory store implementing every repository port
#[derive(Clone, Default)]
pub struct InMemoryStore {
  state: Arc<Mutex<State>>,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ClientRepository for InMemoryStore {
  async fn create(&self, client: Client) -> Result<Client, InvoiceError> {
    let mut state = self.state.lock().await;
    state.clients.insert(client.id, client.clone());
    Ok(client)
  }

  async fn update(&self, client: Client) -> Result<Client, InvoiceError> {
    let mut state = self.state.lock().await;
    match state.clients.get_mut(&client.id) {
      Some(existing) => {
        *existing = client.clone();
        Ok(client)
      }
      None => Err(InvoiceError::ClientNotFound(client.id)),
    }
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, InvoiceError> {
    Ok(self.state.lock().await.clients.get(&id).cloned())
  }
}

#[async_trait]
impl BusinessProfileRepository for InMemoryStore {
  async fn get(&self) -> Result<Option<BusinessProfile>, InvoiceError> {
    Ok(self.state.lock().await.business_profile.clone())
  }

  async fn save(&self, profile: BusinessProfile) -> Result<BusinessProfile, InvoiceError> {
    self.state.lock().await.business_profile = Some(profile.clone());
    Ok(profile)
  }
}

#[async_trait]
impl InvoiceRepository for InMemoryStore {
  async fn create_with_items(
    &self,
    invoice: Invoice,
    line_items: Vec<InvoiceLineItem>,
  ) -> Result<(Invoice, Vec<InvoiceLineItem>), InvoiceError> {
    let mut state = self.state.lock().await;

    if state.number_taken(invoice.invoice_number.value()) {
      return Err(InvoiceError::InvoiceNumberAlreadyExists(
        invoice.invoice_number.value().to_string(),
      ));
    }

    state.invoices.insert(invoice.id, invoice.clone());
    for item in &line_items {
      state.line_items.insert(item.id, item.clone());
    }
    Ok((invoice, line_items))
  }

  async fn update(&self, invoice: Invoice) -> Result<Invoice, InvoiceError> {
    let mut state = self.state.lock().await;
    let totals = InvoiceTotals::calculate(&state.items_of(invoice.id), &invoice.tax_policy())?;

    let existing = state
      .invoices
      .get_mut(&invoice.id)
      .filter(|existing| !existing.is_deleted())
      .ok_or(InvoiceError::InvoiceNotFound(invoice.id))?;

    let mut updated = Invoice {
      invoice_number: existing.invoice_number.clone(),
      document_type: existing.document_type,
      created_at: existing.created_at,
      deleted_at: existing.deleted_at,
      ..invoice
    };
    updated.apply_totals(totals);
    *existing = updated.clone();
    Ok(updated)
  }

  async fn set_status(&self, id: Uuid, status: InvoiceStatus) -> Result<Invoice, InvoiceError> {
    let mut state = self.state.lock().await;
    let invoice = state.live_invoice_mut(id)?;
    invoice.change_status(status);
    Ok(invoice.clone())
  }

  async fn soft_delete(&self, id: Uuid) -> Result<(), InvoiceError> {
    let mut state = self.state.lock().await;
    state.live_invoice_mut(id)?.soft_delete();
    Ok(())
  }

  async fn apply_line_item_change(
    &self,
    invoice_id: Uuid,
    change: LineItemChange,
  ) -> Result<Invoice, InvoiceError> {
    let mut state = self.state.lock().await;
    let tax = state.live_invoice_mut(invoice_id)?.tax_policy();

    // Work on a copy so a failed change leaves the store untouched
    let mut items = state.items_of(invoice_id);
    match &change {
      LineItemChange::Add(item) => items.push(item.clone()),
      LineItemChange::Update(item) => {
        let slot = items
          .iter_mut()
          .find(|existing| existing.id == item.id)
          .ok_or(InvoiceError::LineItemNotFound(item.id))?;
        *slot = item.clone();
      }
      LineItemChange::Remove(item_id) => {
        let before = items.len();
        items.retain(|existing| existing.id != *item_id);
        if items.len() == before {
          return Err(InvoiceError::LineItemNotFound(*item_id));
        }
      }
    }
    let totals = InvoiceTotals::calculate(&items, &tax)?;

    match change {
      LineItemChange::Add(item) | LineItemChange::Update(item) => {
        state.line_items.insert(item.id, item);
      }
      LineItemChange::Remove(item_id) => {
        state.line_items.remove(&item_id);
      }
    }

    let invoice = state.live_invoice_mut(invoice_id)?;
    invoice.apply_totals(totals);
    Ok(invoice.clone())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    Ok(self.state.lock().await.invoices.get(&id).cloned())
  }

  async fn find_active(&self, status: Option<InvoiceStatus>) -> Result<Vec<Invoice>, InvoiceError> {
    let state = self.state.lock().await;
    let mut invoices: Vec<Invoice> = state
      .invoices
      .values()
      .filter(|invoice| !invoice.is_deleted())
      .filter(|invoice| status.is_none_or(|status| invoice.status == status))
      .cloned()
      .collect();
    invoices.sort_by(|a, b| {
      b.issue_date
        .cmp(&a.issue_date)
        .then_with(|| b.created_at.cmp(&a.created_at))
    });
    Ok(invoices)
  }

  async fn find_numbers_with_prefix(&self, prefix: &str) -> Result<Vec<String>, InvoiceError> {
    let state = self.state.lock().await;
    Ok(
      state
        .invoices
        .values()
        .map(|invoice| invoice.invoice_number.value())
        .filter(|number| number.starts_with(prefix))
        .map(str::to_string)
        .collect(),
    )
  }
}

#[async_trait]
impl InvoiceLineItemRepository for InMemoryStore {
  async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceLineItem>, InvoiceError> {
    Ok(self.state.lock().await.line_items.get(&id).cloned())
  }

  async fn find_by_invoice_id(
    &self,
    invoice_id: Uuid,
  ) -> Result<Vec<InvoiceLineItem>, InvoiceError> {
    Ok(self.state.lock().await.items_of(invoice_id))
  }
}

#[async_trait]
impl RecurringScheduleRepository for InMemoryStore {
  async fn create(&self, schedule: RecurringSchedule) -> Result<RecurringSchedule, RecurringError> {
    let mut state = self.state.lock().await;
    state.schedules.insert(schedule.id, schedule.clone());
    Ok(schedule)
  }

  async fn update(&self, schedule: RecurringSchedule) -> Result<RecurringSchedule, RecurringError> {
    let mut state = self.state.lock().await;
    let existing = state.schedule_mut(schedule.id)?;
    existing.client_id = schedule.client_id;
    existing.frequency = schedule.frequency;
    existing.schedule_day = schedule.schedule_day;
    existing.template = schedule.template;
    existing.updated_at = schedule.updated_at;
    Ok(existing.clone())
  }

  async fn set_active(&self, id: Uuid, active: bool) -> Result<RecurringSchedule, RecurringError> {
    let mut state = self.state.lock().await;
    let schedule = state.schedule_mut(id)?;
    if active {
      schedule.resume();
    } else {
      schedule.pause();
    }
    Ok(schedule.clone())
  }

  async fn reschedule(
    &self,
    id: Uuid,
    next_invoice_date: NaiveDate,
  ) -> Result<RecurringSchedule, RecurringError> {
    let mut state = self.state.lock().await;
    let schedule = state.schedule_mut(id)?;
    schedule.next_invoice_date = next_invoice_date;
    schedule.updated_at = Utc::now();
    Ok(schedule.clone())
  }

  async fn record_firing(
    &self,
    id: Uuid,
    invoice_id: Uuid,
    computed_next: NaiveDate,
  ) -> Result<RecurringSchedule, RecurringError> {
    let mut state = self.state.lock().await;
    let schedule = state.schedule_mut(id)?;
    schedule.record_firing(invoice_id, computed_next);
    Ok(schedule.clone())
  }

  async fn delete(&self, id: Uuid) -> Result<(), RecurringError> {
    let mut state = self.state.lock().await;
    state
      .schedules
      .remove(&id)
      .map(|_| ())
      .ok_or(RecurringError::ScheduleNotFound(id))
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<RecurringSchedule>, RecurringError> {
    Ok(self.state.lock().await.schedules.get(&id).cloned())
  }

  async fn find_all(&self, active_only: bool) -> Result<Vec<RecurringSchedule>, RecurringError> {
    let state = self.state.lock().await;
    let mut schedules: Vec<RecurringSchedule> = state
      .schedules
      .values()
      .filter(|schedule| !active_only || schedule.is_active)
      .cloned()
      .collect();
    schedules.sort_by_key(|schedule| (schedule.next_invoice_date, schedule.created_at));
    Ok(schedules)
  }

  async fn find_due(&self, today: NaiveDate) -> Result<Vec<RecurringSchedule>, RecurringError> {
    let state = self.state.lock().await;
    let mut schedules: Vec<RecurringSchedule> = state
      .schedules
      .values()
      .filter(|schedule| schedule.is_due(today))
      .cloned()
      .collect();
    schedules.sort_by_key(|schedule| (schedule.next_invoice_date, schedule.created_at));
    Ok(schedules)
  }
}
