//! Job wiring shared by the handlers.

use std::sync::Arc;

use boardkeep_infra::config::{AppConfig, PresenceConfig};
use boardkeep_infra::{EntityStore, InvitationExpirer, ParticipantCounter, PresenceUpdater};

pub struct AppServices {
    pub expirer: InvitationExpirer,
    pub presence: PresenceUpdater,
    pub counter: ParticipantCounter,
    pub presence_targets: PresenceConfig,
}

pub fn build_services(config: &AppConfig, store: Arc<dyn EntityStore>) -> AppServices {
    AppServices {
        expirer: InvitationExpirer::new(store.clone(), config.retry.clone()),
        presence: PresenceUpdater::new(store.clone(), config.retry.clone()),
        counter: ParticipantCounter::new(store, config.retry.clone()),
        presence_targets: config.presence.clone(),
    }
}
