pub mod add_line_item;
pub mod change_invoice_status;
pub mod create_invoice;
pub mod delete_invoice;
pub mod dto;
pub mod get_invoice_details;
pub mod list_invoices;
pub mod remove_line_item;
pub mod update_invoice;
pub mod update_line_item;

pub use add_line_item::{AddLineItemCommand, AddLineItemUseCase, LineItemChangeResponse};
pub use change_invoice_status::{
  ChangeInvoiceStatusCommand, ChangeInvoiceStatusResponse, ChangeInvoiceStatusUseCase,
};
pub use create_invoice::{CreateInvoiceCommand, CreateInvoiceResponse, CreateInvoiceUseCase};
pub use delete_invoice::{DeleteInvoiceCommand, DeleteInvoiceUseCase};
pub use dto::{InvoiceDto, LineItemDto, LineItemInputDto};
pub use get_invoice_details::{
  GetInvoiceDetailsCommand, GetInvoiceDetailsUseCase, InvoiceDetailsResponse,
};
pub use list_invoices::{ListInvoicesCommand, ListInvoicesResponse, ListInvoicesUseCase};
pub use remove_line_item::{
  RemoveLineItemCommand, RemoveLineItemResponse, RemoveLineItemUseCase,
};
pub use update_invoice::{UpdateInvoiceCommand, UpdateInvoiceResponse, UpdateInvoiceUseCase};
pub use update_line_item::{UpdateLineItemCommand, UpdateLineItemUseCase};
