//! Access-control core for a multi-tenant retail back office.
//! - Access Directory: request → authorized → restricted lifecycle.
//! - Credential Ledger: the administrator/operator pair per identity.
//! - Session Authenticator and Recovery Service on top of both.
//!
//! All state lives behind a [`storage::DurableStore`].
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use service::access::{AccessConfig, AccessControl};
//! use service::clock::SystemClock;
//! use service::recovery::TracingNotifier;
//! use service::storage::MemoryStore;
//! use models::access_request::NewAccessRequest;
//!
//! let access = AccessControl::new(
//!     Arc::new(MemoryStore::default()),
//!     Arc::new(TracingNotifier),
//!     Arc::new(SystemClock),
//!     AccessConfig::default(),
//! );
//! let req = tokio_test::block_on(access.directory.submit_request(NewAccessRequest {
//!     full_name: "Ana Silva".into(),
//!     email: "ana@x.com".into(),
//!     business_name: "Ana Store".into(),
//!     business_description: "Clothing".into(),
//! }))
//! .unwrap();
//! tokio_test::block_on(access.directory.approve(req.id)).unwrap();
//! assert!(tokio_test::block_on(access.directory.check_email_access("ANA@x.com")).unwrap());
//! ```

pub mod access;
pub mod auth;
pub mod business_registry;
pub mod clock;
pub mod directory;
pub mod errors;
pub mod ledger;
pub mod recovery;
pub mod storage;
#[cfg(test)]
pub mod test_support;
