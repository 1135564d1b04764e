pub mod invoice;
pub mod reminder;
pub mod timestamp;

pub use invoice::{
    ExtractionResponse, InvoiceListResponse, InvoiceRecord, LatestInvoiceResponse, UploadResponse,
};
pub use reminder::{
    CreateReminderResponse, DeleteReminderResponse, ReminderListResponse, ReminderRecord,
};
