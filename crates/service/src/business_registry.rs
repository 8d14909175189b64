//! Business Registry: the tenant records sessions are scoped to.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::tenant::{Business, NewBusiness};

use crate::clock::Clock;
use crate::errors::ServiceError;
use crate::storage::Collection;

pub const BUSINESSES_KEY: &str = "businesses";

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BusinessRecords {
    #[serde(default)]
    pub businesses: Vec<Business>,
}

pub struct BusinessRegistry {
    records: Collection<BusinessRecords>,
    clock: Arc<dyn Clock>,
}

impl BusinessRegistry {
    pub fn new(records: Collection<BusinessRecords>, clock: Arc<dyn Clock>) -> Self {
        Self { records, clock }
    }

    /// Create a business with a fresh id and creation timestamp.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: NewBusiness) -> Result<Uuid, ServiceError> {
        let business = Business {
            id: Uuid::new_v4(),
            name: input.name,
            subtitle: input.subtitle,
            logo_url: input.logo_url,
            use_custom_logo: input.use_custom_logo,
            plan: input.plan,
            created_at: self.clock.now(),
            owner_id: input.owner_id,
        };
        let id = business.id;
        self.records
            .update(move |doc| {
                doc.businesses.push(business);
                Ok(())
            })
            .await?;
        info!(business_id = %id, "business_created");
        Ok(id)
    }

    /// All businesses in insertion order.
    pub async fn list(&self) -> Result<Vec<Business>, ServiceError> {
        Ok(self.records.load().await?.businesses)
    }

    pub async fn get(&self, id: Uuid) -> Result<Business, ServiceError> {
        self.list()
            .await?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| ServiceError::not_found("business"))
    }

    /// First business owned by the given identity, if any.
    pub async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Business>, ServiceError> {
        Ok(self.list().await?.into_iter().find(|b| b.owner_id == Some(owner_id)))
    }
}
