//! Demonstrate the translation layer without a server.
//!
//! Usage:
//!   `cargo run --example translate_only`

use claude_relay::config::RequestDefaults;
use claude_relay::translate::request::{openai_to_anthropic, parse_inbound};
use claude_relay::translate::streaming::{Emission, StreamTranslator};

fn main() {
    // An OpenAI-style chat request, as a caller would send it
    let inbound = br#"{
        "model": "claude-sonnet-4-5-20250929",
        "messages": [
            {"role": "system", "content": "You are a geography expert. Be concise."},
            {"role": "user", "content": "What is the capital of France?"},
            {"role": "assistant", "content": "The capital of France is Paris."},
            {"role": "user", "content": "And Germany?"}
        ]
    }"#;

    let req = parse_inbound(inbound).expect("valid request");
    let outbound = openai_to_anthropic(&req, &RequestDefaults::default());

    println!("=== Translated Request (Anthropic format) ===");
    println!("{}", serde_json::to_string_pretty(&outbound).unwrap());

    // Simulate the upstream SSE body and re-frame it
    println!();
    println!("=== Re-framing Demo ===");

    let upstream_lines = [
        r#"event: message_start"#,
        r#"data: {"type":"message_start","message":{"id":"msg_demo"}}"#,
        r#""#,
        r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"The"}}"#,
        r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":" capital"}}"#,
        r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":" is Berlin."}}"#,
        r#"data: {"type":"message_stop"}"#,
    ];

    let mut translator = StreamTranslator::new();
    for line in upstream_lines {
        match translator.process_line(line) {
            Some(Emission::Chunk(chunk)) => {
                println!("  -> data: {}", serde_json::to_string(&chunk).unwrap());
            }
            Some(Emission::Done) => println!("  -> data: [DONE]"),
            None => {}
        }
        if translator.is_done() {
            break;
        }
    }

    println!();
    println!("Done! The translation layer works without any network calls.");
}
