//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the calling user, as identified by the gateway.

pub mod auth;
