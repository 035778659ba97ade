//! State machine for re-framing Anthropic SSE lines into OpenAI-style chunks.
//!
//! The [`StreamTranslator`] consumes the upstream event stream one text line
//! at a time and produces at most one downstream frame per line. Two things
//! terminate it: the literal `[DONE]` sentinel and an explicit `message_stop`
//! event. An upstream close without either is handled by the caller (the
//! output stream simply ends).
//!
//! Usage:
//!   let mut translator = StreamTranslator::new();
//!   for line in upstream_lines {
//!       if let Some(emission) = translator.process_line(&line) {
//!           // write the frame downstream
//!       }
//!       if translator.is_done() { break; }
//!   }

use super::anthropic_types::StreamEvent;
use super::openai_types::ChatCompletionChunk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Streaming,
    Done,
}

/// A single downstream frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// One `data: <json>` chunk wrapping a non-empty text delta.
    Chunk(ChatCompletionChunk),
    /// The terminal `data: [DONE]` line.
    Done,
}

#[derive(Debug)]
pub struct StreamTranslator {
    state: State,
}

impl StreamTranslator {
    pub fn new() -> Self {
        Self {
            state: State::Streaming,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Feed one line of the upstream body, returning the frame to emit, if any.
    ///
    /// Lines without a `data:` prefix (blank lines, comments, `event:` fields)
    /// carry no payload in this protocol's usage and are skipped, as are
    /// payloads that fail to parse: upstream noise must not abort an
    /// otherwise-good stream.
    pub fn process_line(&mut self, line: &str) -> Option<Emission> {
        if self.state == State::Done {
            return None;
        }

        let line = line.trim();
        let data = line
            .strip_prefix("data: ")
            .or_else(|| line.strip_prefix("data:"))?
            .trim();

        if data == "[DONE]" {
            self.state = State::Done;
            return Some(Emission::Done);
        }

        let event: StreamEvent = serde_json::from_str(data).ok()?;

        match event {
            StreamEvent::ContentBlockDelta { delta } => delta
                .and_then(|d| d.text)
                .filter(|text| !text.is_empty())
                .map(|text| Emission::Chunk(ChatCompletionChunk::text(text))),
            StreamEvent::MessageStop => {
                self.state = State::Done;
                Some(Emission::Done)
            }
            StreamEvent::Other => None,
        }
    }
}

impl Default for StreamTranslator {
    fn default() -> Self {
        Self::new()
    }
}
