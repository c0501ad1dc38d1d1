//! User presence (the `last_seen` heartbeat on user records).

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Entity, RecordId};

/// The slice of a user record the presence updater needs to match a user.
///
/// `last_seen` is only ever written, so it is not decoded: a value in any
/// shape never hides the user from a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPresence {
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
}

impl Entity for UserPresence {
    const NAME: &'static str = "User";
}

impl UserPresence {
    /// Case-insensitive username comparison key.
    pub fn username_key(&self) -> String {
        self.username.to_lowercase()
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
