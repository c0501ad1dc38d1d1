//! Game invitations and their expiry rule.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Entity, RecordId};

/// Invitation lifecycle state.
///
/// Invitations are created `pending`; only the expirer moves them to
/// `declined`. Anything we don't recognize is kept as `Other` and left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    #[serde(other)]
    Other,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
            InvitationStatus::Other => "other",
        }
    }
}

/// A game invitation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: RecordId,
    pub status: InvitationStatus,
    /// Raw creation timestamp as stored remotely: a date string or epoch
    /// milliseconds. Kept unparsed so a bad value only affects this record.
    #[serde(default, alias = "created_date")]
    pub created_at: Option<Value>,
}

impl Entity for Invitation {
    const NAME: &'static str = "Invitation";
}

impl Invitation {
    /// Parsed creation time, if the stored value is a timestamp we understand.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self.created_at.as_ref()? {
            Value::String(raw) => parse_timestamp(raw),
            Value::Number(n) => {
                let millis = n
                    .as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))?;
                DateTime::from_timestamp_millis(millis)
            }
            _ => None,
        }
    }

    /// Age at `now`, or `None` when the timestamp is missing or unparseable.
    pub fn age_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.created_at().map(|created| now - created)
    }

    /// `true` when this invitation is pending and strictly older than `ttl`.
    ///
    /// Records without a usable timestamp never expire.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.status == InvitationStatus::Pending
            && self.age_at(now).is_some_and(|age| age > ttl)
    }
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` value
/// which the platform emits without an offset (interpreted as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation(status: InvitationStatus, created_at: Option<String>) -> Invitation {
        Invitation {
            id: RecordId::new("inv-1").unwrap(),
            status,
            created_at: created_at.map(Value::String),
        }
    }

    #[test]
    fn parses_offset_and_naive_timestamps() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn expiry_is_strictly_older_than_ttl() {
        let now = Utc::now();
        let ttl = Duration::seconds(60);

        let at = |secs: i64| Some((now - Duration::seconds(secs)).to_rfc3339());

        assert!(!invitation(InvitationStatus::Pending, at(30)).is_expired(now, ttl));
        assert!(!invitation(InvitationStatus::Pending, at(60)).is_expired(now, ttl));
        assert!(invitation(InvitationStatus::Pending, at(61)).is_expired(now, ttl));
    }

    #[test]
    fn only_pending_invitations_expire() {
        let now = Utc::now();
        let old = Some((now - Duration::minutes(10)).to_rfc3339());

        assert!(!invitation(InvitationStatus::Accepted, old.clone()).is_expired(now, Duration::seconds(60)));
        assert!(!invitation(InvitationStatus::Declined, old).is_expired(now, Duration::seconds(60)));
    }

    #[test]
    fn missing_or_garbage_timestamp_never_expires() {
        let now = Utc::now();
        assert!(!invitation(InvitationStatus::Pending, None).is_expired(now, Duration::zero()));
        assert!(
            !invitation(InvitationStatus::Pending, Some("not a date".into()))
                .is_expired(now, Duration::zero())
        );
    }

    #[test]
    fn deserializes_platform_record() {
        let inv: Invitation = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "status": "pending",
            "created_date": "2024-05-01T10:00:00.000000",
            "from_user": "alice",
        }))
        .unwrap();

        assert_eq!(inv.status, InvitationStatus::Pending);
        assert!(inv.created_at().is_some());
    }

    #[test]
    fn epoch_millis_timestamps_are_understood() {
        let now = Utc::now();
        let created = now - Duration::seconds(120);
        let inv: Invitation = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "status": "pending",
            "created_at": created.timestamp_millis(),
        }))
        .unwrap();

        assert_eq!(inv.created_at().map(|t| t.timestamp_millis()), Some(created.timestamp_millis()));
        assert!(inv.is_expired(now, Duration::seconds(60)));

        let fractional: Invitation = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "status": "pending",
            "created_at": 1717243200000.0,
        }))
        .unwrap();
        assert_eq!(fractional.created_at().map(|t| t.timestamp()), Some(1_717_243_200));
    }

    #[test]
    fn non_timestamp_values_never_expire() {
        let inv: Invitation = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "status": "pending",
            "created_at": {"seconds": 10},
        }))
        .unwrap();

        assert_eq!(inv.created_at(), None);
        assert!(!inv.is_expired(Utc::now(), Duration::zero()));
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let inv: Invitation = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "status": "cancelled",
        }))
        .unwrap();

        assert_eq!(inv.status, InvitationStatus::Other);
    }
}
