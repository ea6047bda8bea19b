use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireSession")]
pub struct Session {
    pub id: String,
    pub title: Option<String>,
    pub user_id: Option<String>,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Both key casings may appear in one payload; the snake_case value wins.
#[derive(Deserialize)]
struct WireSession {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default, rename = "userId")]
    user_id_camel: Option<String>,
    #[serde(default = "default_status")]
    status: String,
    #[serde(default, deserialize_with = "de_timestamp")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "createdAt", deserialize_with = "de_timestamp")]
    created_at_camel: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updatedAt", deserialize_with = "de_timestamp")]
    updated_at_camel: Option<DateTime<Utc>>,
}

impl From<WireSession> for Session {
    fn from(wire: WireSession) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            user_id: wire.user_id.or(wire.user_id_camel),
            status: wire.status,
            created_at: wire.created_at.or(wire.created_at_camel),
            updated_at: wire.updated_at.or(wire.updated_at_camel),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub title: String,
}

/// The list endpoint answers either with a bare array or a `{sessions, total}` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SessionListPayload {
    Bare(Vec<Session>),
    Envelope { sessions: Vec<Session> },
}

impl SessionListPayload {
    pub fn into_sessions(self) -> Vec<Session> {
        match self {
            SessionListPayload::Bare(sessions) => sessions,
            SessionListPayload::Envelope { sessions } => sessions,
        }
    }
}

fn default_status() -> String {
    "ACTIVE".to_string()
}

// Accepts RFC 3339 and naive ISO timestamps (assumed UTC).
fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepts_both_key_casings() {
        let snake: Session = serde_json::from_str(
            r#"{"id":"1","title":"A","user_id":"u","status":"ACTIVE","created_at":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        let camel: Session = serde_json::from_str(
            r#"{"id":"1","title":"A","userId":"u","status":"ACTIVE","createdAt":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(snake, camel);
        assert_eq!(snake.user_id.as_deref(), Some("u"));
    }

    #[test]
    fn both_casings_in_one_payload_prefer_snake_case() {
        let session: Session = serde_json::from_str(
            r#"{"id":"1","created_at":"2024-05-01T10:00:00Z","createdAt":"2023-01-01T00:00:00Z","userId":"u2"}"#,
        )
        .unwrap();
        assert_eq!(session.created_at.unwrap().to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert_eq!(session.user_id.as_deref(), Some("u2"));

        let list: SessionListPayload = serde_json::from_str(
            r#"{"sessions":[{"id":"1","created_at":"2024-05-01T10:00:00Z","createdAt":"2024-05-01T10:00:00Z"}],"total":1}"#,
        )
        .unwrap();
        assert_eq!(list.into_sessions().len(), 1);
    }

    #[test]
    fn serializes_with_snake_case_only() {
        let session: Session =
            serde_json::from_str(r#"{"id":"1","createdAt":"2024-05-01T10:00:00Z"}"#).unwrap();
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("created_at").is_some());
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let session: Session =
            serde_json::from_str(r#"{"id":"1","created_at":"2024-05-01T10:00:00.123456"}"#).unwrap();
        let ts = session.created_at.unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");
    }

    #[test]
    fn list_payload_accepts_bare_array_and_envelope() {
        let bare: SessionListPayload = serde_json::from_str(r#"[{"id":"1"},{"id":"2"}]"#).unwrap();
        assert_eq!(bare.into_sessions().len(), 2);

        let envelope: SessionListPayload =
            serde_json::from_str(r#"{"sessions":[{"id":"3","title":null}],"total":1}"#).unwrap();
        let sessions = envelope.into_sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "3");
        assert_eq!(sessions[0].status, "ACTIVE");
    }
}
