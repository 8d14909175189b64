//! Access Directory: AccessRequest → AuthorizedUser → RestrictedUser lifecycle.

pub mod service;

pub use service::AccessDirectory;
