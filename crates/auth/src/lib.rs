//! `boardkeep-auth`: caller identity and the single role check maintenance
//! endpoints need.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod principal;
pub mod roles;

pub use authorize::{authorize_maintenance, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use principal::{Principal, PrincipalId};
pub use roles::Role;
