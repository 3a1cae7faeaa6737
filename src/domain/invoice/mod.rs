pub mod cascade;
pub mod entities;
pub mod errors;
pub mod numbering;
pub mod ports;
pub mod services;
pub mod snapshot;
pub mod totals;
pub mod value_objects;

pub use cascade::{TaxOverrides, TaxPolicy};
pub use entities::{
  BusinessProfile, Client, Invoice, InvoiceHeader, InvoiceLineItem, LineItemData,
};
pub use errors::{ErrorKind, InvoiceError};
pub use numbering::InvoiceNumberAllocator;
pub use ports::{
  BusinessProfileRepository, ClientRepository, InvoiceLineItemRepository, InvoiceRepository,
  LineItemChange,
};
pub use services::{InvoiceData, InvoiceService, InvoiceServiceDependencies, InvoiceUpdateData};
pub use snapshot::ClientSnapshot;
pub use totals::InvoiceTotals;
pub use value_objects::{
  ClientAddress, ClientName, CurrencyCode, DocumentType, Email, InvoiceNumber, InvoiceStatus,
  LineItemDescription, PaymentTermsDays, Quantity, TaxRate, UnitPrice, UnitType,
  ValueObjectError,
};
