//! Wire status records and the internal event model.
//!
//! The stream delivers newline-delimited JSON objects. Most are statuses
//! with an embedded `user` object; the rest are control messages (delete
//! notices, stall warnings) that carry no `text` field. Everything is
//! deserialized into [`Status`] and then reduced to the flat [`Event`]
//! record the coordinator works with.

use serde::Deserialize;

/// A status object as it appears on the wire.
///
/// Only the fields the collector inspects are declared; everything else
/// in the JSON payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    /// Textual body. Absent for control messages (delete notices etc.).
    pub text: Option<String>,
    /// The posting user. Absent for stream control messages.
    pub user: Option<StatusUser>,
}

/// The user object embedded in a status.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUser {
    /// Stable numeric identifier as a string. The dedup key.
    pub id_str: String,
    /// Handle, used for diagnostics and optionally for filenames.
    pub screen_name: String,
    /// Self-declared interface language, e.g. `"ja"`. May be absent.
    pub lang: Option<String>,
    /// URL of the user's avatar image.
    pub profile_image_url: String,
}

/// One event as seen by the coordinator: immutable, flat, and decoupled
/// from the wire format.
#[derive(Debug, Clone)]
pub struct Event {
    /// Dedup key: the posting user's `id_str`.
    pub user_key: String,
    /// Handle of the posting user.
    pub screen_name: String,
    /// Language of the posting user; empty string when the wire omits it.
    pub language: String,
    /// Whether the event carried a textual body.
    pub has_text: bool,
    /// URL of the avatar image to download.
    pub avatar_url: String,
}

impl Event {
    /// Reduces a wire status to an [`Event`].
    ///
    /// Returns `None` when the status has no embedded user, which makes
    /// it impossible to key or download anything. Statuses without a
    /// body still map to an event (with `has_text = false`) so the
    /// admission filter can reject them explicitly.
    #[must_use]
    pub fn from_status(status: Status) -> Option<Self> {
        let has_text = status.text.is_some();
        let user = status.user?;
        Some(Self {
            user_key: user.id_str,
            screen_name: user.screen_name,
            language: user.lang.unwrap_or_default(),
            has_text,
            avatar_url: user.profile_image_url,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_deserializes_minimal_fields() {
        let json = r#"{
            "text": "hello",
            "user": {
                "id_str": "12345",
                "screen_name": "alice",
                "lang": "en",
                "profile_image_url": "http://example.com/a.png"
            }
        }"#;
        let status: Status = serde_json::from_str(json).unwrap();
        assert_eq!(status.text.as_deref(), Some("hello"));
        let user = status.user.unwrap();
        assert_eq!(user.id_str, "12345");
        assert_eq!(user.screen_name, "alice");
        assert_eq!(user.lang.as_deref(), Some("en"));
    }

    #[test]
    fn test_status_tolerates_extra_fields() {
        let json = r#"{
            "created_at": "whenever",
            "text": "hi",
            "favorited": false,
            "user": {
                "id_str": "1",
                "screen_name": "bob",
                "lang": "ja",
                "profile_image_url": "http://example.com/b.jpg",
                "followers_count": 42
            }
        }"#;
        let status: Status = serde_json::from_str(json).unwrap();
        assert!(status.text.is_some());
    }

    #[test]
    fn test_control_message_has_no_text() {
        let json = r#"{"delete": {"status": {"id_str": "99"}}}"#;
        let status: Status = serde_json::from_str(json).unwrap();
        assert!(status.text.is_none());
        assert!(status.user.is_none());
        assert!(Event::from_status(status).is_none());
    }

    #[test]
    fn test_event_from_status_maps_fields() {
        let status = Status {
            text: Some("body".to_string()),
            user: Some(StatusUser {
                id_str: "777".to_string(),
                screen_name: "carol".to_string(),
                lang: Some("fr".to_string()),
                profile_image_url: "http://example.com/c.gif".to_string(),
            }),
        };
        let event = Event::from_status(status).unwrap();
        assert_eq!(event.user_key, "777");
        assert_eq!(event.screen_name, "carol");
        assert_eq!(event.language, "fr");
        assert!(event.has_text);
        assert_eq!(event.avatar_url, "http://example.com/c.gif");
    }

    #[test]
    fn test_event_without_text_still_built() {
        let status = Status {
            text: None,
            user: Some(StatusUser {
                id_str: "5".to_string(),
                screen_name: "dan".to_string(),
                lang: None,
                profile_image_url: "http://example.com/d.png".to_string(),
            }),
        };
        let event = Event::from_status(status).unwrap();
        assert!(!event.has_text);
        assert_eq!(event.language, "");
    }
}
