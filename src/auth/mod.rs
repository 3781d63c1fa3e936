//! Role-based capability checks for admin surfaces
//!
//! Authentication itself is owned by the platform's upstream auth layer; it
//! injects the caller's identity as trusted headers. This module turns those
//! headers into a `UserContext` and gates handlers through a pure capability
//! check composed with a fail-closed wrapper.

use crate::error::GatewayError;
use crate::types::TenantId;
use crate::utils::validate_tenant_id;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller's tenant
pub const TENANT_ID_HEADER: &str = "x-tenant-id";
/// Header carrying a comma-separated role list
pub const USER_ROLES_HEADER: &str = "x-user-roles";

/// Platform roles relevant to this service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl FromStr for Role {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(GatewayError::InvalidUserContext {
                reason: format!("Unknown role: {}", other),
            }),
        }
    }
}

/// Authenticated caller identity as asserted by the upstream auth layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub tenant_id: TenantId,
    pub roles: Vec<Role>,
}

impl UserContext {
    pub fn new(
        user_id: impl Into<String>,
        tenant_id: impl Into<TenantId>,
        roles: Vec<Role>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            roles,
        }
    }

    /// Check the identity for a usable shape
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.user_id.is_empty() {
            return Err(GatewayError::InvalidUserContext {
                reason: "user id cannot be empty".to_string(),
            });
        }
        validate_tenant_id(&self.tenant_id)?;
        Ok(())
    }

    /// Build the context from trusted headers.
    ///
    /// Roles this service does not model are skipped rather than rejected;
    /// an unknown role grants nothing either way. Missing identity headers
    /// fail closed.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, GatewayError> {
        let user_id = required_header(headers, USER_ID_HEADER)?;
        let tenant_id = required_header(headers, TENANT_ID_HEADER)?;

        let roles = headers
            .get(USER_ROLES_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .filter_map(|s| match s.parse() {
                        Ok(role) => Some(role),
                        Err(_) => {
                            debug!("Skipping unmodeled role '{}'", s);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let context = Self {
            user_id,
            tenant_id,
            roles,
        };
        context.validate()?;
        Ok(context)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

fn required_header(headers: &HeaderMap, name: &str) -> Result<String, GatewayError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .ok_or_else(|| GatewayError::InvalidUserContext {
            reason: format!("Missing or unreadable {} header", name),
        })
}

/// Pure capability check: does the user hold at least one required role?
///
/// An empty requirement list means the surface is open to any authenticated
/// caller.
pub fn can_access(user: &UserContext, required_roles: &[Role]) -> bool {
    if required_roles.is_empty() {
        return true;
    }
    required_roles.iter().any(|role| user.has_role(*role))
}

/// Fail-closed wrapper around [`can_access`] for handlers.
///
/// The HTTP layer maps the error to a 403; UI callers treat it as their
/// redirect-to-unauthorized signal.
pub fn require_any_role(user: &UserContext, required_roles: &[Role]) -> Result<(), GatewayError> {
    if can_access(user, required_roles) {
        Ok(())
    } else {
        let required: Vec<&str> = required_roles.iter().map(Role::as_str).collect();
        Err(GatewayError::AccessDenied {
            reason: format!("requires one of [{}]", required.join(", ")),
        })
    }
}
