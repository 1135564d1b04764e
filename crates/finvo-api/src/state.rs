//! Application state
//!
//! All collaborators are injected here at startup so handlers depend on
//! traits, never on concrete backends. Tests build an AppState around a
//! tempdir-backed local store and mock service implementations.

use finvo_core::Config;
use finvo_records::{InvoiceRepository, ReminderRepository};
use finvo_services::{DocumentAnalyzer, IdentityProvider};
use finvo_storage::BlobStore;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn BlobStore>,
    pub invoices: InvoiceRepository,
    pub reminders: ReminderRepository,
    pub identity: Arc<dyn IdentityProvider>,
    pub analyzer: Arc<dyn DocumentAnalyzer>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn BlobStore>,
        identity: Arc<dyn IdentityProvider>,
        analyzer: Arc<dyn DocumentAnalyzer>,
    ) -> Self {
        Self {
            config,
            invoices: InvoiceRepository::new(store.clone()),
            reminders: ReminderRepository::new(store.clone()),
            store,
            identity,
            analyzer,
        }
    }
}
