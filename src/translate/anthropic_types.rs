use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request types (what we send TO the upstream)
// ---------------------------------------------------------------------------

/// An Anthropic Messages API request. Built once by the translator, never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub stream: bool,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Streaming event types (SSE events the upstream sends back)
// ---------------------------------------------------------------------------

/// One upstream stream event, parsed from a `data:` line.
///
/// Only two tags carry meaning for the relay; everything else lands on
/// `Other` and is ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum StreamEvent {
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta {
        #[serde(default)]
        delta: Option<EventDelta>,
    },
    #[serde(rename = "message_stop")]
    MessageStop,
    #[serde(other)]
    Other,
}

/// The nested delta of a `content_block_delta` event. `text` is absent for
/// non-text deltas (tool input, thinking).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EventDelta {
    #[serde(default)]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_delta() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#,
        )
        .unwrap();
        match event {
            StreamEvent::ContentBlockDelta { delta } => {
                assert_eq!(delta.unwrap().text.as_deref(), Some("Hi"));
            }
            other => panic!("Expected content_block_delta, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_message_stop() {
        let event: StreamEvent = serde_json::from_str(r#"{"type":"message_stop"}"#).unwrap();
        assert_eq!(event, StreamEvent::MessageStop);
    }

    #[test]
    fn test_unknown_tags_map_to_other() {
        for payload in [
            r#"{"type":"message_start","message":{"id":"msg_1"}}"#,
            r#"{"type":"ping"}"#,
            r#"{"type":"content_block_stop","index":0}"#,
        ] {
            let event: StreamEvent = serde_json::from_str(payload).unwrap();
            assert_eq!(event, StreamEvent::Other, "payload: {payload}");
        }
    }

    #[test]
    fn test_serialized_request_omits_empty_system() {
        let req = MessagesRequest {
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 1024,
            stream: true,
            messages: vec![Message {
                role: "user".to_string(),
                content: "Hi".to_string(),
            }],
            system: None,
        };

        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["stream"], true);
        assert_eq!(json["max_tokens"], 1024);
    }
}
