//! Finvo Services Library
//!
//! Clients for the managed services finvo delegates to: the identity
//! provider (user records, credentials, email lookup), the document
//! extraction service, and the SMTP mail relay. Each collaborator is a
//! trait so handlers and the sweeper can be driven by mocks in tests.

pub mod extract;
pub mod identity;
pub mod mail;

pub use extract::{DocumentAnalyzer, HttpDocumentAnalyzer};
pub use identity::{AuthTokens, HttpIdentityProvider, IdentityProvider};
pub use mail::{Mailer, SmtpMailer};
