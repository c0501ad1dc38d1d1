//! Tournament participation records (only counted, never mutated here).

use serde::{Deserialize, Serialize};

use crate::{Entity, RecordId, TournamentId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: RecordId,
    #[serde(default)]
    pub tournament_id: Option<TournamentId>,
}

impl Entity for Participant {
    const NAME: &'static str = "TournamentParticipant";
}
