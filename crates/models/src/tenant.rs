use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Premium,
}

/// A tenant record; every login session is scoped to one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    pub subtitle: String,
    pub logo_url: String,
    pub use_custom_logo: bool,
    pub plan: Plan,
    pub created_at: DateTime<Utc>,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewBusiness {
    pub name: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub use_custom_logo: bool,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}
