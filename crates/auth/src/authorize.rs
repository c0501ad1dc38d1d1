use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: requires role '{0}'")]
    Forbidden(String),
}

/// Gate for administrative maintenance endpoints.
///
/// - No caller (cron, webhook, platform trigger) → allowed
/// - Caller holding `admin` or `service` → allowed
/// - Any other authenticated caller → `Forbidden`
///
/// No IO, no panics.
pub fn authorize_maintenance(caller: Option<&Principal>) -> Result<(), AuthzError> {
    match caller {
        None => Ok(()),
        Some(p) if p.has_role(&Role::ADMIN) || p.has_role(&Role::SERVICE) => Ok(()),
        Some(_) => Err(AuthzError::Forbidden(Role::ADMIN.to_string())),
    }
}
