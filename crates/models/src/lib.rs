//! Record types persisted by the access-control core, plus the field
//! validation shared by every component.

pub mod errors;
pub mod access_request;
pub mod user;
pub mod user_credentials;
pub mod reset_request;
pub mod session;
pub mod tenant;

/// Case-insensitive email comparison used for every identity lookup.
pub fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::same_email;

    #[test]
    fn email_comparison_ignores_case_and_padding() {
        assert!(same_email("Ana@X.com", " ana@x.com "));
        assert!(!same_email("ana@x.com", "ana@y.com"));
    }
}
