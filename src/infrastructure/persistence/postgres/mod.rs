pub mod business_profile_repository;
pub mod client_repository;
pub mod invoice_line_item_repository;
pub mod invoice_repository;
pub mod recurring_schedule_repository;

pub use business_profile_repository::PostgresBusinessProfileRepository;
pub use client_repository::PostgresClientRepository;
pub use invoice_line_item_repository::PostgresInvoiceLineItemRepository;
pub use invoice_repository::PostgresInvoiceRepository;
pub use recurring_schedule_repository::PostgresRecurringScheduleRepository;
