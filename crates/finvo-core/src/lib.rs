//! Finvo Core Library
//!
//! Shared foundation for the finvo workspace: configuration, the unified
//! error taxonomy, typed invoice/reminder models, and the reminder policy
//! engine. This crate performs no I/O.

pub mod config;
pub mod error;
pub mod models;
pub mod policy;

pub use config::{Config, StorageBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    CreateReminderResponse, DeleteReminderResponse, ExtractionResponse, InvoiceListResponse,
    InvoiceRecord, LatestInvoiceResponse, ReminderListResponse, ReminderRecord, UploadResponse,
};
pub use policy::{compute_explicit_reminder, compute_reminder, ReminderSchedule};
