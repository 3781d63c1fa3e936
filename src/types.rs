//! Core types for the notification service

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier for a tenant (a facility-owning organizational unit)
pub type TenantId = String;

/// Unique identifier for an opponent match
pub type MatchId = Uuid;

/// Unique identifier for a facility
pub type FacilityId = Uuid;

/// An opponent match as carried through the broadcaster.
///
/// Only the id and tenant association are modeled; everything else the
/// booking API attaches (players, schedule, court) is passed through opaquely
/// in `details` without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentMatch {
    pub id: MatchId,
    pub tenant_id: TenantId,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl OpponentMatch {
    /// Create a match payload for the given tenant with a fresh id
    pub fn new(tenant_id: impl Into<TenantId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            details: Map::new(),
        }
    }

    /// Attach an opaque detail field to the payload
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// A bookable facility, referenced by admin navigation targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: FacilityId,
    pub tenant_id: TenantId,
    pub name: String,
}

impl Facility {
    pub fn new(tenant_id: impl Into<TenantId>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            name: name.into(),
        }
    }
}
