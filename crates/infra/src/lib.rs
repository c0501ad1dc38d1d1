//! Infrastructure layer: entity store adapters, remote function transport,
//! configuration and the maintenance jobs.

pub mod config;
pub mod functions;
pub mod jobs;
pub mod store;

pub use config::{AppConfig, ConfigError, PresenceConfig, StoreConfig};
pub use functions::HttpFunctionClient;
pub use jobs::{InvitationExpirer, JobError, ParticipantCounter, PresenceUpdater};
pub use store::{EntityStore, HttpEntityStore, InMemoryEntityStore, StoreError};
