//! Translate OpenAI Chat Completions requests into Anthropic Messages API requests.
//!
//! System-role messages are folded into the single Anthropic `system` field,
//! newline-joined in their original order; every other message passes through
//! verbatim. The caller's `stream` flag is ignored; the relay deals
//! exclusively in streaming responses.

use super::anthropic_types::{Message, MessagesRequest};
use super::openai_types::{ChatCompletionRequest, Role};
use crate::config::RequestDefaults;
use crate::error::{RelayError, Result};

/// Parse a fully buffered inbound body.
///
/// All-or-nothing: a body that is not valid JSON, is missing `messages`, or
/// contains a message without `role`/`content` yields [`RelayError::Parse`]
/// and no partial translation.
pub fn parse_inbound(body: &[u8]) -> Result<ChatCompletionRequest> {
    serde_json::from_slice(body)
        .map_err(|e| RelayError::parse(format!("Invalid request body: {e}")))
}

/// Translate an inbound request into the upstream request shape.
/// Pure function of the request and the configured defaults.
pub fn openai_to_anthropic(
    req: &ChatCompletionRequest,
    defaults: &RequestDefaults,
) -> MessagesRequest {
    let mut system_text = String::new();
    let mut messages = Vec::new();

    for msg in &req.messages {
        match msg.role {
            Role::System => {
                system_text.push_str(&msg.content);
                system_text.push('\n');
            }
            Role::User | Role::Assistant => {
                messages.push(Message {
                    role: msg.role.as_str().to_string(),
                    content: msg.content.clone(),
                });
            }
        }
    }

    let system = {
        let trimmed = system_text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    };

    MessagesRequest {
        model: req
            .model
            .clone()
            .unwrap_or_else(|| defaults.model.clone()),
        max_tokens: defaults.max_tokens,
        stream: true,
        messages,
        system,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::openai_types::ChatMessage;
    use std::collections::HashMap;

    fn defaults() -> RequestDefaults {
        RequestDefaults::default()
    }

    fn msg(role: Role, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    fn request(model: Option<&str>, messages: Vec<ChatMessage>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: model.map(String::from),
            messages,
            extra: HashMap::default(),
        }
    }

    #[test]
    fn test_no_system_messages_omits_system() {
        let req = request(Some("x"), vec![msg(Role::User, "Hi")]);
        let result = openai_to_anthropic(&req, &defaults());

        assert_eq!(result.system, None);
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn test_system_messages_joined_in_order() {
        let req = request(
            Some("x"),
            vec![
                msg(Role::System, "Be terse."),
                msg(Role::User, "Hi"),
                msg(Role::System, "Answer in English."),
            ],
        );
        let result = openai_to_anthropic(&req, &defaults());

        assert_eq!(
            result.system.as_deref(),
            Some("Be terse.\nAnswer in English.")
        );
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].role, "user");
    }

    #[test]
    fn test_blank_system_messages_omit_system() {
        let req = request(
            Some("x"),
            vec![msg(Role::System, "   "), msg(Role::User, "Hi")],
        );
        let result = openai_to_anthropic(&req, &defaults());

        assert_eq!(result.system, None);
    }

    #[test]
    fn test_non_system_order_and_values_preserved() {
        let req = request(
            Some("x"),
            vec![
                msg(Role::User, "first"),
                msg(Role::Assistant, "second"),
                msg(Role::System, "ignored here"),
                msg(Role::User, "third"),
            ],
        );
        let result = openai_to_anthropic(&req, &defaults());

        let pairs: Vec<(&str, &str)> = result
            .messages
            .iter()
            .map(|m| (m.role.as_str(), m.content.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("user", "first"),
                ("assistant", "second"),
                ("user", "third")
            ]
        );
    }

    #[test]
    fn test_missing_model_uses_default() {
        let req = request(None, vec![msg(Role::User, "Hi")]);
        let result = openai_to_anthropic(&req, &defaults());

        assert_eq!(result.model, defaults().model);
    }

    #[test]
    fn test_stream_and_max_tokens_fixed() {
        let req = request(Some("x"), vec![msg(Role::User, "Hi")]);
        let result = openai_to_anthropic(&req, &defaults());

        assert!(result.stream);
        assert_eq!(result.max_tokens, 1024);
    }

    #[test]
    fn test_end_to_end_shape() {
        let body = br#"{"model":"x","messages":[{"role":"system","content":"Be terse."},{"role":"user","content":"Hi"}]}"#;
        let req = parse_inbound(body).unwrap();
        let result = openai_to_anthropic(&req, &defaults());

        assert_eq!(result.model, "x");
        assert_eq!(result.system.as_deref(), Some("Be terse."));
        assert!(result.stream);
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].role, "user");
        assert_eq!(result.messages[0].content, "Hi");
    }

    #[test]
    fn test_parse_rejects_missing_messages() {
        let err = parse_inbound(br#"{"model":"x"}"#).unwrap_err();
        assert!(matches!(err, RelayError::Parse { .. }));
    }

    #[test]
    fn test_parse_rejects_message_without_content() {
        let err = parse_inbound(br#"{"messages":[{"role":"user"}]}"#).unwrap_err();
        assert!(matches!(err, RelayError::Parse { .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_role() {
        let err =
            parse_inbound(br#"{"messages":[{"role":"tool","content":"x"}]}"#).unwrap_err();
        assert!(matches!(err, RelayError::Parse { .. }));
    }

    #[test]
    fn test_parse_tolerates_unknown_fields() {
        let req = parse_inbound(
            br#"{"model":"x","messages":[{"role":"user","content":"Hi"}],"temperature":0.7,"stream":true}"#,
        )
        .unwrap();
        assert_eq!(req.model.as_deref(), Some("x"));
        assert_eq!(req.messages.len(), 1);
    }
}
