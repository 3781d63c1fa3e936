//! Facility directory and admin navigation
//!
//! Facility persistence belongs to the booking API; this module holds the
//! directory seam the admin surface reads through, plus the navigation path
//! builders for facility detail and credential-management pages.

use crate::error::{GatewayError, Result};
use crate::types::{Facility, FacilityId, TenantId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Path of a facility's detail page
pub fn facility_detail_path(facility_id: &FacilityId) -> String {
    format!("/facilities/{}", facility_id)
}

/// Path of a facility's credential-management page
pub fn facility_credentials_path(facility_id: &FacilityId) -> String {
    format!("/facilities/{}/credentials", facility_id)
}

/// Trait for reading a tenant's facilities
#[async_trait]
pub trait FacilityDirectory: Send + Sync {
    /// List all facilities belonging to a tenant
    async fn list_facilities(&self, tenant_id: &str) -> Result<Vec<Facility>>;

    /// Look up a single facility within a tenant
    async fn get_facility(
        &self,
        tenant_id: &str,
        facility_id: FacilityId,
    ) -> Result<Option<Facility>>;
}

/// In-memory facility directory, seeded at startup or by tests
#[derive(Debug, Default)]
pub struct StaticFacilityDirectory {
    facilities: RwLock<HashMap<TenantId, Vec<Facility>>>,
}

impl StaticFacilityDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory pre-populated with the given facilities
    pub fn with_facilities(facilities: Vec<Facility>) -> Self {
        let directory = Self::new();
        for facility in facilities {
            // A fresh lock cannot be poisoned yet
            let _ = directory.register_facility(facility);
        }
        directory
    }

    /// Add a facility to its tenant's listing
    pub fn register_facility(&self, facility: Facility) -> Result<()> {
        let mut facilities =
            self.facilities
                .write()
                .map_err(|_| GatewayError::InternalError {
                    message: "Failed to acquire facility directory write lock".to_string(),
                })?;

        facilities
            .entry(facility.tenant_id.clone())
            .or_default()
            .push(facility);
        Ok(())
    }
}

#[async_trait]
impl FacilityDirectory for StaticFacilityDirectory {
    async fn list_facilities(&self, tenant_id: &str) -> Result<Vec<Facility>> {
        let facilities = self
            .facilities
            .read()
            .map_err(|_| GatewayError::InternalError {
                message: "Failed to acquire facility directory read lock".to_string(),
            })?;

        Ok(facilities.get(tenant_id).cloned().unwrap_or_default())
    }

    async fn get_facility(
        &self,
        tenant_id: &str,
        facility_id: FacilityId,
    ) -> Result<Option<Facility>> {
        let facilities = self
            .facilities
            .read()
            .map_err(|_| GatewayError::InternalError {
                message: "Failed to acquire facility directory read lock".to_string(),
            })?;

        Ok(facilities
            .get(tenant_id)
            .and_then(|list| list.iter().find(|f| f.id == facility_id))
            .cloned())
    }
}
