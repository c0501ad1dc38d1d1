use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier carried in bearer tokens.
///
/// Roles are opaque strings; only [`Role::ADMIN`] and [`Role::SERVICE`] carry
/// meaning for the maintenance endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Administrative users.
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));
    /// Schedulers and webhooks acting on behalf of the platform.
    pub const SERVICE: Role = Role(Cow::Borrowed("service"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
