use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::AuthorizedUser;
use crate::user_credentials::{Credential, Role};

/// An authenticated tenant session, handed back to the caller and passed
/// explicitly into later operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Id of the authorized identity.
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub business_id: Option<Uuid>,
    pub email: String,
    pub has_custom_password: bool,
    /// Signed bearer token, present when token signing is configured.
    pub token: Option<String>,
}

impl Session {
    pub fn new(user: &AuthorizedUser, credential: &Credential, business_id: Option<Uuid>) -> Self {
        Self {
            id: user.id,
            username: credential.username.clone(),
            name: user.full_name.clone(),
            role: credential.role,
            business_id,
            email: user.email.clone(),
            has_custom_password: user.has_setup_password,
            token: None,
        }
    }
}
