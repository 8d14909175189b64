//! Credential Ledger: the administrator/operator credential pair of every
//! onboarded identity.

pub mod service;

pub use service::CredentialLedger;
