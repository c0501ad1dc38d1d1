//! `boardkeep-core`: domain records held by the remote entity store.
//!
//! This crate contains **pure domain** types (no IO). Records are deserialized
//! leniently: the store is authoritative and may carry fields we don't model.

pub mod entity;
pub mod id;
pub mod invitation;
pub mod participant;
pub mod presence;

pub use entity::Entity;
pub use id::{IdError, RecordId, TournamentId};
pub use invitation::{Invitation, InvitationStatus};
pub use participant::Participant;
pub use presence::UserPresence;
