use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::calendar::Clock;

use super::cascade::{TaxOverrides, TaxPolicy, resolve_due_date, resolve_payment_terms};
use super::entities::{
  BusinessProfile, Client, Invoice, InvoiceHeader, InvoiceLineItem, LineItemData,
};
use super::errors::InvoiceError;
use super::numbering::InvoiceNumberAllocator;
use super::ports::{
  BusinessProfileRepository, ClientRepository, InvoiceLineItemRepository, InvoiceRepository,
  LineItemChange,
};
use super::snapshot::ClientSnapshot;
use super::totals::InvoiceTotals;
use super::value_objects::{CurrencyCode, DocumentType, InvoiceStatus, PaymentTermsDays};

/// Invoice creation data. Manual requests and schedule firings both end up here.
#[derive(Debug, Clone, Default)]
pub struct InvoiceData {
  pub client_id: Option<Uuid>,
  pub document_type: DocumentType,
  pub invoice_number: Option<String>,
  pub issue_date: Option<NaiveDate>,
  pub due_date: Option<NaiveDate>,
  pub payment_terms_days: Option<PaymentTermsDays>,
  pub currency: Option<CurrencyCode>,
  pub notes: Option<String>,
  pub tax: TaxOverrides,
  pub line_items: Vec<LineItemData>,
}

/// Invoice update data; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct InvoiceUpdateData {
  pub client_id: Option<Uuid>,
  pub issue_date: Option<NaiveDate>,
  pub due_date: Option<NaiveDate>,
  pub payment_terms_days: Option<PaymentTermsDays>,
  pub currency: Option<CurrencyCode>,
  pub notes: Option<String>,
  pub status: Option<InvoiceStatus>,
  pub tax: TaxOverrides,
}

pub struct InvoiceServiceDependencies {
  pub invoice_repo: Arc<dyn InvoiceRepository>,
  pub line_item_repo: Arc<dyn InvoiceLineItemRepository>,
  pub client_repo: Arc<dyn ClientRepository>,
  pub business_repo: Arc<dyn BusinessProfileRepository>,
  pub clock: Arc<dyn Clock>,
}

pub struct InvoiceService {
  invoice_repo: Arc<dyn InvoiceRepository>,
  line_item_repo: Arc<dyn InvoiceLineItemRepository>,
  client_repo: Arc<dyn ClientRepository>,
  business_repo: Arc<dyn BusinessProfileRepository>,
  allocator: InvoiceNumberAllocator,
  clock: Arc<dyn Clock>,
}

impl InvoiceService {
  pub fn new(deps: InvoiceServiceDependencies) -> Self {
    Self {
      allocator: InvoiceNumberAllocator::new(deps.invoice_repo.clone()),
      invoice_repo: deps.invoice_repo,
      line_item_repo: deps.line_item_repo,
      client_repo: deps.client_repo,
      business_repo: deps.business_repo,
      clock: deps.clock,
    }
  }

  pub fn today(&self) -> NaiveDate {
    self.clock.today()
  }

  /// resolve tax -> resolve due date -> allocate number -> snapshot client
  /// -> persist invoice + items -> totals
  pub async fn create_invoice(
    &self,
    data: InvoiceData,
  ) -> Result<(Invoice, Vec<InvoiceLineItem>), InvoiceError> {
    let business = self.business_profile().await?;
    let client = match data.client_id {
      Some(client_id) => Some(self.load_client(client_id).await?),
      None => None,
    };

    let tax = TaxPolicy::resolve(&data.tax, client.as_ref(), &business);

    let issue_date = data.issue_date.unwrap_or_else(|| self.clock.today());
    let payment_terms_days =
      resolve_payment_terms(data.payment_terms_days, client.as_ref(), &business);
    let due_date = resolve_due_date(data.due_date, issue_date, payment_terms_days);

    let invoice_number = self
      .allocator
      .allocate(
        data.document_type,
        issue_date,
        data.invoice_number.as_deref(),
      )
      .await?;

    let mut invoice = Invoice::new(InvoiceHeader {
      invoice_number,
      document_type: data.document_type,
      client_id: data.client_id,
      issue_date,
      due_date,
      payment_terms_days,
      currency: data.currency.unwrap_or(business.default_currency),
      notes: data.notes,
      tax,
    });

    if let Some(client) = &client {
      invoice.apply_snapshot(ClientSnapshot::of(client));
    }

    let line_items: Vec<InvoiceLineItem> = data
      .line_items
      .into_iter()
      .enumerate()
      .map(|(i, item)| InvoiceLineItem::new(invoice.id, item, (i + 1) as i32))
      .collect();

    invoice.apply_totals(InvoiceTotals::calculate(&line_items, &invoice.tax_policy())?);

    let (created, items) = self
      .invoice_repo
      .create_with_items(invoice, line_items)
      .await
      .inspect_err(|e| {
        if let InvoiceError::InvoiceNumberAlreadyExists(number) = e {
          tracing::warn!(invoice_number = %number, "Invoice number collision");
        }
      })?;

    tracing::info!(
      invoice_id = %created.id,
      invoice_number = %created.invoice_number,
      total = %created.total,
      "Invoice created"
    );

    Ok((created, items))
  }

  pub async fn update_invoice(
    &self,
    invoice_id: Uuid,
    data: InvoiceUpdateData,
  ) -> Result<Invoice, InvoiceError> {
    let mut invoice = self.load_invoice(invoice_id).await?;

    if let Some(client_id) = data.client_id {
      // Fails with ClientNotFound before anything changes
      self.load_client(client_id).await?;
      invoice.client_id = Some(client_id);
    }

    let issue_date_changed = data
      .issue_date
      .is_some_and(|issue_date| issue_date != invoice.issue_date);
    if let Some(issue_date) = data.issue_date {
      invoice.issue_date = issue_date;
    }
    let terms_changed = data.payment_terms_days.is_some();
    if let Some(terms) = data.payment_terms_days {
      invoice.payment_terms_days = terms;
    }

    match data.due_date {
      Some(due_date) => invoice.due_date = due_date,
      None if issue_date_changed || terms_changed => {
        invoice.due_date = resolve_due_date(None, invoice.issue_date, invoice.payment_terms_days);
      }
      None => {}
    }

    if let Some(currency) = data.currency {
      invoice.currency = currency;
    }
    if let Some(notes) = data.notes {
      invoice.notes = Some(notes);
    }
    if let Some(status) = data.status {
      invoice.change_status(status);
    }

    // Totals follow from the stored items; the repository recomputes them
    if !data.tax.is_empty() {
      invoice.set_tax_policy(invoice.tax_policy().edited(&data.tax));
    }

    if let Some(client_id) = invoice.client_id {
      let client = self.load_client(client_id).await?;
      invoice.apply_snapshot(ClientSnapshot::of(&client));
    }

    let updated = self.invoice_repo.update(invoice).await?;
    tracing::debug!(invoice_id = %updated.id, "Invoice updated");
    Ok(updated)
  }

  pub async fn change_invoice_status(
    &self,
    invoice_id: Uuid,
    status: InvoiceStatus,
  ) -> Result<Invoice, InvoiceError> {
    self.invoice_repo.set_status(invoice_id, status).await
  }

  pub async fn add_line_item(
    &self,
    invoice_id: Uuid,
    data: LineItemData,
  ) -> Result<(Invoice, InvoiceLineItem), InvoiceError> {
    self.load_invoice(invoice_id).await?;
    let items = self.line_item_repo.find_by_invoice_id(invoice_id).await?;

    let sort_order = items.iter().map(|i| i.sort_order).max().unwrap_or(0) + 1;
    let item = InvoiceLineItem::new(invoice_id, data, sort_order);

    let invoice = self
      .invoice_repo
      .apply_line_item_change(invoice_id, LineItemChange::Add(item.clone()))
      .await?;
    Ok((invoice, item))
  }

  pub async fn update_line_item(
    &self,
    invoice_id: Uuid,
    item_id: Uuid,
    data: LineItemData,
  ) -> Result<(Invoice, InvoiceLineItem), InvoiceError> {
    self.load_invoice(invoice_id).await?;
    let mut item = self.load_owned_item(invoice_id, item_id).await?;
    item.update(data);

    let invoice = self
      .invoice_repo
      .apply_line_item_change(invoice_id, LineItemChange::Update(item.clone()))
      .await?;
    Ok((invoice, item))
  }

  pub async fn remove_line_item(
    &self,
    invoice_id: Uuid,
    item_id: Uuid,
  ) -> Result<Invoice, InvoiceError> {
    self.load_invoice(invoice_id).await?;
    self.load_owned_item(invoice_id, item_id).await?;

    self
      .invoice_repo
      .apply_line_item_change(invoice_id, LineItemChange::Remove(item_id))
      .await
  }

  /// Soft delete. The number stays reserved.
  pub async fn delete_invoice(&self, invoice_id: Uuid) -> Result<(), InvoiceError> {
    self.invoice_repo.soft_delete(invoice_id).await?;
    tracing::info!(invoice_id = %invoice_id, "Invoice moved to trash");
    Ok(())
  }

  pub async fn get_invoice_with_items(
    &self,
    invoice_id: Uuid,
  ) -> Result<(Invoice, Vec<InvoiceLineItem>), InvoiceError> {
    let invoice = self.load_invoice(invoice_id).await?;
    let items = self.line_item_repo.find_by_invoice_id(invoice_id).await?;
    Ok((invoice, items))
  }

  pub async fn list_invoices(
    &self,
    status_filter: Option<InvoiceStatus>,
  ) -> Result<Vec<Invoice>, InvoiceError> {
    self.invoice_repo.find_active(status_filter).await
  }

  // Helper methods
  async fn business_profile(&self) -> Result<BusinessProfile, InvoiceError> {
    Ok(self.business_repo.get().await?.unwrap_or_default())
  }

  async fn load_client(&self, client_id: Uuid) -> Result<Client, InvoiceError> {
    self
      .client_repo
      .find_by_id(client_id)
      .await?
      .ok_or(InvoiceError::ClientNotFound(client_id))
  }

  async fn load_invoice(&self, invoice_id: Uuid) -> Result<Invoice, InvoiceError> {
    self
      .invoice_repo
      .find_by_id(invoice_id)
      .await?
      .filter(|invoice| !invoice.is_deleted())
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))
  }

  async fn load_owned_item(
    &self,
    invoice_id: Uuid,
    item_id: Uuid,
  ) -> Result<InvoiceLineItem, InvoiceError> {
    let item = self
      .line_item_repo
      .find_by_id(item_id)
      .await?
      .ok_or(InvoiceError::LineItemNotFound(item_id))?;

    if item.invoice_id != invoice_id {
      tracing::warn!(
        invoice_id = %invoice_id,
        item_id = %item_id,
        "Line item referenced through a foreign invoice"
      );
      return Err(InvoiceError::LineItemAccessDenied {
        invoice_id,
        item_id,
      });
    }

    Ok(item)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::calendar::FixedClock;
  use crate::domain::invoice::errors::ErrorKind;
  use crate::domain::invoice::value_objects::{
    ClientAddress, ClientName, LineItemDescription, Quantity, TaxRate, UnitPrice, UnitType,
  };
  use crate::infrastructure::persistence::memory::InMemoryStore;
  use rust_decimal::Decimal;
  use rust_decimal_macros::dec;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn service(store: &InMemoryStore, today: NaiveDate) -> InvoiceService {
    InvoiceService::new(InvoiceServiceDependencies {
      invoice_repo: Arc::new(store.clone()),
      line_item_repo: Arc::new(store.clone()),
      client_repo: Arc::new(store.clone()),
      business_repo: Arc::new(store.clone()),
      clock: Arc::new(FixedClock(today)),
    })
  }

  fn item(quantity: Decimal, price: Decimal) -> LineItemData {
    LineItemData {
      description: LineItemDescription::new("Work".to_string()).unwrap(),
      quantity: Quantity::new(quantity).unwrap(),
      unit_type: UnitType::Qty,
      unit_price: UnitPrice::new(price).unwrap(),
    }
  }

  async fn seed_client(store: &InMemoryStore, rate: Option<Decimal>) -> Client {
    let mut client = Client::new(
      ClientName::new("Acme".to_string()).unwrap(),
      None,
      ClientAddress {
        city: Some("Austin".to_string()),
        state: Some("TX".to_string()),
        ..ClientAddress::default()
      },
    );
    client.tax_rate = rate.map(|r| TaxRate::new(r).unwrap());
    ClientRepository::create(store, client).await.unwrap()
  }

  async fn seed_business(store: &InMemoryStore, enabled: bool, rate: Decimal) {
    store
      .save(BusinessProfile {
        tax_enabled: enabled,
        tax_rate: TaxRate::new(rate).unwrap(),
        ..BusinessProfile::default()
      })
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn test_sequential_numbers_on_same_day() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    for expected in ["20250115-1", "20250115-2", "20250115-3"] {
      let (invoice, _) = service.create_invoice(InvoiceData::default()).await.unwrap();
      assert_eq!(invoice.invoice_number.value(), expected);
    }
  }

  #[tokio::test]
  async fn test_malformed_legacy_number_is_ignored() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    service
      .create_invoice(InvoiceData {
        invoice_number: Some("20250115-bad".to_string()),
        ..InvoiceData::default()
      })
      .await
      .unwrap();

    let (first, _) = service.create_invoice(InvoiceData::default()).await.unwrap();
    let (second, _) = service.create_invoice(InvoiceData::default()).await.unwrap();
    assert_eq!(first.invoice_number.value(), "20250115-1");
    assert_eq!(second.invoice_number.value(), "20250115-2");
  }

  #[tokio::test]
  async fn test_quotes_use_their_own_sequence() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    service.create_invoice(InvoiceData::default()).await.unwrap();
    let (quote, _) = service
      .create_invoice(InvoiceData {
        document_type: DocumentType::Quote,
        ..InvoiceData::default()
      })
      .await
      .unwrap();
    assert_eq!(quote.invoice_number.value(), "Q-20250115-1");
  }

  #[tokio::test]
  async fn test_duplicate_override_is_a_conflict() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    service.create_invoice(InvoiceData::default()).await.unwrap();
    let err = service
      .create_invoice(InvoiceData {
        invoice_number: Some("20250115-1".to_string()),
        ..InvoiceData::default()
      })
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
  }

  #[tokio::test]
  async fn test_soft_deleted_numbers_stay_reserved() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    let (first, _) = service.create_invoice(InvoiceData::default()).await.unwrap();
    service.delete_invoice(first.id).await.unwrap();

    let (second, _) = service.create_invoice(InvoiceData::default()).await.unwrap();
    assert_eq!(second.invoice_number.value(), "20250115-2");
    assert!(matches!(
      service.get_invoice_with_items(first.id).await,
      Err(InvoiceError::InvoiceNotFound(_))
    ));
  }

  #[tokio::test]
  async fn test_client_tax_rate_applies() {
    let store = InMemoryStore::new();
    seed_business(&store, true, dec!(8.25)).await;
    let client = seed_client(&store, Some(dec!(10.00))).await;
    let service = service(&store, date(2025, 1, 15));

    let (invoice, _) = service
      .create_invoice(InvoiceData {
        client_id: Some(client.id),
        line_items: vec![item(dec!(1), dec!(250.00))],
        ..InvoiceData::default()
      })
      .await
      .unwrap();

    assert_eq!(invoice.tax_rate.value(), dec!(10.00));
    assert_eq!(invoice.tax_amount, dec!(25.00));
    assert_eq!(invoice.total, dec!(275.00));
    assert_eq!(invoice.client_name.as_deref(), Some("Acme"));
    assert_eq!(invoice.client_address.as_deref(), Some("Austin, TX"));
  }

  #[tokio::test]
  async fn test_totals_with_tax_disabled() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    let (invoice, items) = service
      .create_invoice(InvoiceData {
        line_items: vec![
          item(dec!(1), dec!(100.00)),
          item(dec!(2), dec!(50.00)),
          item(dec!(1), dec!(50.00)),
        ],
        ..InvoiceData::default()
      })
      .await
      .unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(invoice.subtotal, dec!(250.00));
    assert_eq!(invoice.tax_amount, Decimal::ZERO);
    assert_eq!(invoice.total, dec!(250.00));
  }

  #[tokio::test]
  async fn test_due_date_defaults_to_thirty_days() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    let (invoice, _) = service.create_invoice(InvoiceData::default()).await.unwrap();
    assert_eq!(invoice.issue_date, date(2025, 1, 15));
    assert_eq!(invoice.due_date, date(2025, 2, 14));
    assert_eq!(invoice.payment_terms_days.days(), 30);
  }

  #[tokio::test]
  async fn test_missing_client_fails_creation() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    let err = service
      .create_invoice(InvoiceData {
        client_id: Some(Uuid::new_v4()),
        ..InvoiceData::default()
      })
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(service.list_invoices(None).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_line_item_mutations_recompute_totals() {
    let store = InMemoryStore::new();
    seed_business(&store, true, dec!(10)).await;
    let service = service(&store, date(2025, 1, 15));

    let (invoice, _) = service.create_invoice(InvoiceData::default()).await.unwrap();
    assert_eq!(invoice.total, Decimal::ZERO);

    let (invoice, added) = service
      .add_line_item(invoice.id, item(dec!(2), dec!(50.00)))
      .await
      .unwrap();
    assert_eq!(invoice.subtotal, dec!(100.00));
    assert_eq!(invoice.total, dec!(110.00));

    let (invoice, _) = service
      .update_line_item(invoice.id, added.id, item(dec!(3), dec!(50.00)))
      .await
      .unwrap();
    assert_eq!(invoice.subtotal, dec!(150.00));
    assert_eq!(invoice.tax_amount, dec!(15.00));

    let invoice = service.remove_line_item(invoice.id, added.id).await.unwrap();
    assert_eq!(invoice.subtotal, Decimal::ZERO);
    assert_eq!(invoice.total, Decimal::ZERO);

    let (stored, items) = service.get_invoice_with_items(invoice.id).await.unwrap();
    assert!(items.is_empty());
    assert_eq!(stored.total, Decimal::ZERO);
  }

  #[tokio::test]
  async fn test_item_from_another_invoice_is_forbidden() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    let (first, first_items) = service
      .create_invoice(InvoiceData {
        line_items: vec![item(dec!(1), dec!(10))],
        ..InvoiceData::default()
      })
      .await
      .unwrap();
    let (second, _) = service.create_invoice(InvoiceData::default()).await.unwrap();

    let err = service
      .remove_line_item(second.id, first_items[0].id)
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = service
      .update_line_item(first.id, Uuid::new_v4(), item(dec!(1), dec!(1)))
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
  }

  #[tokio::test]
  async fn test_backdating_recomputes_due_date() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    let (invoice, _) = service
      .create_invoice(InvoiceData {
        payment_terms_days: Some(PaymentTermsDays::new(15).unwrap()),
        ..InvoiceData::default()
      })
      .await
      .unwrap();

    let updated = service
      .update_invoice(
        invoice.id,
        InvoiceUpdateData {
          issue_date: Some(date(2025, 1, 1)),
          ..InvoiceUpdateData::default()
        },
      )
      .await
      .unwrap();
    assert_eq!(updated.due_date, date(2025, 1, 16));

    let overridden = service
      .update_invoice(
        invoice.id,
        InvoiceUpdateData {
          issue_date: Some(date(2025, 1, 5)),
          due_date: Some(date(2025, 3, 1)),
          ..InvoiceUpdateData::default()
        },
      )
      .await
      .unwrap();
    assert_eq!(overridden.due_date, date(2025, 3, 1));
  }

  #[tokio::test]
  async fn test_update_refreshes_client_snapshot() {
    let store = InMemoryStore::new();
    let mut client = seed_client(&store, None).await;
    let service = service(&store, date(2025, 1, 15));

    let (invoice, _) = service
      .create_invoice(InvoiceData {
        client_id: Some(client.id),
        ..InvoiceData::default()
      })
      .await
      .unwrap();

    client.address.city = Some("Dallas".to_string());
    ClientRepository::update(&store, client).await.unwrap();

    let updated = service
      .update_invoice(invoice.id, InvoiceUpdateData::default())
      .await
      .unwrap();
    assert_eq!(updated.client_address.as_deref(), Some("Dallas, TX"));
  }

  #[tokio::test]
  async fn test_tax_is_frozen_until_explicitly_edited() {
    let store = InMemoryStore::new();
    seed_business(&store, true, dec!(10)).await;
    let service = service(&store, date(2025, 1, 15));

    let (invoice, _) = service
      .create_invoice(InvoiceData {
        line_items: vec![item(dec!(1), dec!(100))],
        ..InvoiceData::default()
      })
      .await
      .unwrap();

    // Business default changes later; the invoice keeps its snapshot
    seed_business(&store, true, dec!(20)).await;
    let untouched = service
      .update_invoice(invoice.id, InvoiceUpdateData::default())
      .await
      .unwrap();
    assert_eq!(untouched.tax_amount, dec!(10.00));

    let edited = service
      .update_invoice(
        invoice.id,
        InvoiceUpdateData {
          tax: TaxOverrides::from_raw(Some(false), None, None).unwrap(),
          ..InvoiceUpdateData::default()
        },
      )
      .await
      .unwrap();
    assert!(!edited.tax_enabled);
    assert_eq!(edited.tax_amount, Decimal::ZERO);
    assert_eq!(edited.total, dec!(100));
  }

  #[tokio::test]
  async fn test_change_status() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    let (invoice, _) = service.create_invoice(InvoiceData::default()).await.unwrap();
    let paid = service
      .change_invoice_status(invoice.id, InvoiceStatus::Paid)
      .await
      .unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);

    let listed = service.list_invoices(Some(InvoiceStatus::Paid)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(
      service
        .list_invoices(Some(InvoiceStatus::Draft))
        .await
        .unwrap()
        .is_empty()
    );
  }

  /// Line item reads that hand control back to the runtime, so concurrent
  /// requests interleave between reading and writing.
  struct YieldingItems(InMemoryStore);

  #[async_trait::async_trait]
  impl InvoiceLineItemRepository for YieldingItems {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceLineItem>, InvoiceError> {
      let found = InvoiceLineItemRepository::find_by_id(&self.0, id).await;
      tokio::task::yield_now().await;
      found
    }

    async fn find_by_invoice_id(
      &self,
      invoice_id: Uuid,
    ) -> Result<Vec<InvoiceLineItem>, InvoiceError> {
      let found = self.0.find_by_invoice_id(invoice_id).await;
      tokio::task::yield_now().await;
      found
    }
  }

  fn interleaving_service(store: &InMemoryStore, today: NaiveDate) -> InvoiceService {
    InvoiceService::new(InvoiceServiceDependencies {
      invoice_repo: Arc::new(store.clone()),
      line_item_repo: Arc::new(YieldingItems(store.clone())),
      client_repo: Arc::new(store.clone()),
      business_repo: Arc::new(store.clone()),
      clock: Arc::new(FixedClock(today)),
    })
  }

  #[tokio::test]
  async fn test_concurrent_item_adds_keep_totals_consistent() {
    let store = InMemoryStore::new();
    seed_business(&store, true, dec!(10)).await;
    let service = interleaving_service(&store, date(2025, 1, 15));

    let (invoice, _) = service.create_invoice(InvoiceData::default()).await.unwrap();

    let (first, second) = tokio::join!(
      service.add_line_item(invoice.id, item(dec!(1), dec!(100.00))),
      service.add_line_item(invoice.id, item(dec!(1), dec!(50.00))),
    );
    first.unwrap();
    second.unwrap();

    let (stored, items) = service.get_invoice_with_items(invoice.id).await.unwrap();
    let item_sum: Decimal = items.iter().map(|i| i.total).sum();
    assert_eq!(items.len(), 2);
    assert_eq!(stored.subtotal, item_sum);
    assert_eq!(stored.subtotal, dec!(150.00));
    assert_eq!(stored.tax_amount, dec!(15.00));
    assert_eq!(stored.total, dec!(165.00));
  }

  #[tokio::test]
  async fn test_item_change_does_not_revert_concurrent_status_change() {
    let store = InMemoryStore::new();
    let service = interleaving_service(&store, date(2025, 1, 15));

    let (invoice, _) = service
      .create_invoice(InvoiceData {
        line_items: vec![item(dec!(2), dec!(20.00))],
        ..InvoiceData::default()
      })
      .await
      .unwrap();

    let (added, paid) = tokio::join!(
      service.add_line_item(invoice.id, item(dec!(1), dec!(10.00))),
      service.change_invoice_status(invoice.id, InvoiceStatus::Paid),
    );
    added.unwrap();
    paid.unwrap();

    let (stored, _) = service.get_invoice_with_items(invoice.id).await.unwrap();
    assert_eq!(stored.status, InvoiceStatus::Paid);
    assert_eq!(stored.subtotal, dec!(50.00));
  }

  #[tokio::test]
  async fn test_out_of_range_invoice_is_rejected_before_storage() {
    let store = InMemoryStore::new();
    let service = service(&store, date(2025, 1, 15));

    let err = service
      .create_invoice(InvoiceData {
        line_items: vec![
          item(Quantity::MAX, UnitPrice::MAX),
          item(Quantity::MAX, UnitPrice::MAX),
        ],
        ..InvoiceData::default()
      })
      .await
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(service.list_invoices(None).await.unwrap().is_empty());
  }
}
