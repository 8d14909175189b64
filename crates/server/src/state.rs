use service::access::AccessControl;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub access: AccessControl,
}

impl AppState {
    pub fn new(access: AccessControl) -> Self {
        Self { access }
    }
}
