//! Shared fixture for the schedule use case tests

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::calendar::{Clock, FixedClock};
use crate::domain::invoice::{
  Client, ClientAddress, ClientName, ClientRepository, InvoiceService,
  InvoiceServiceDependencies, LineItemData, LineItemDescription, Quantity, TaxOverrides,
  UnitPrice, UnitType,
};
use crate::domain::recurring::{
  Frequency, InvoiceTemplate, RecurringService, RecurringServiceDependencies, ScheduleData,
};
use crate::infrastructure::persistence::memory::InMemoryStore;

pub(crate) fn today() -> NaiveDate {
  NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

pub(crate) struct Fixture {
  pub store: InMemoryStore,
  pub service: Arc<RecurringService>,
  pub client_id: Uuid,
  /// Monthly on the 15th, due today
  pub schedule_id: Uuid,
}

pub(crate) async fn fixture() -> Fixture {
  let store = InMemoryStore::new();
  let clock: Arc<dyn Clock> = Arc::new(FixedClock(today()));
  let invoice_service = Arc::new(InvoiceService::new(InvoiceServiceDependencies {
    invoice_repo: Arc::new(store.clone()),
    line_item_repo: Arc::new(store.clone()),
    client_repo: Arc::new(store.clone()),
    business_repo: Arc::new(store.clone()),
    clock: clock.clone(),
  }));
  let service = Arc::new(RecurringService::new(RecurringServiceDependencies {
    schedule_repo: Arc::new(store.clone()),
    client_repo: Arc::new(store.clone()),
    invoice_service,
    clock,
  }));

  let client = ClientRepository::create(
    &store,
    Client::new(
      ClientName::new("Pied Piper".to_string()).unwrap(),
      None,
      ClientAddress::default(),
    ),
  )
  .await
  .unwrap();

  let schedule = service
    .create_schedule(ScheduleData {
      client_id: client.id,
      frequency: Frequency::Monthly,
      schedule_day: 15,
      template: InvoiceTemplate {
        currency: None,
        payment_terms_days: None,
        notes: Some("Monthly retainer".to_string()),
        tax: TaxOverrides::default(),
        line_items: vec![LineItemData {
          description: LineItemDescription::new("Retainer".to_string()).unwrap(),
          quantity: Quantity::new(dec!(1)).unwrap(),
          unit_type: UnitType::Qty,
          unit_price: UnitPrice::new(dec!(500)).unwrap(),
        }],
      },
      next_invoice_date: Some(today()),
    })
    .await
    .unwrap();

  Fixture {
    store,
    service,
    client_id: client.id,
    schedule_id: schedule.id,
  }
}
