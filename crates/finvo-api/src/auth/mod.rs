//! Bearer-token authentication: JWKS-backed RS256 verification and the
//! middleware that turns a verified token into an [`models::AuthUser`].

pub mod jwks;
pub mod middleware;
pub mod models;
