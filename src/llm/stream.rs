use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::Deserialize;
use std::collections::VecDeque;

use super::LlmError;

/// Text fragments of a streaming completion, in arrival order.
pub type FragmentStream = BoxStream<'static, Result<String, LlmError>>;

/// One line of the newline-delimited JSON body.
#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
}

/// Splits a byte stream into complete lines, holding back a trailing partial line.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line).trim().to_string();
            if !text.is_empty() {
                lines.push(text);
            }
        }
        lines
    }

    pub(crate) fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&rest).trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

struct Decoder<S> {
    inner: S,
    lines: LineBuffer,
    ready: VecDeque<String>,
    finished: bool,
}

impl<S> Decoder<S> {
    fn absorb(&mut self, line: &str) {
        if self.finished {
            return;
        }
        match serde_json::from_str::<GenerateChunk>(line) {
            Ok(chunk) => {
                if let Some(text) = chunk.response.filter(|t| !t.is_empty()) {
                    self.ready.push_back(text);
                }
                if chunk.done {
                    self.finished = true;
                }
            }
            Err(e) => tracing::debug!(error = %e, "skipping malformed stream line"),
        }
    }
}

/// Decodes a raw completion body into its `response` fragments.
///
/// Malformed lines are skipped. A transport error is yielded once and ends
/// the stream; a `done` line ends it without error.
pub fn fragments<S, B, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = Result<B, E>> + Unpin + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<LlmError> + Send + 'static,
{
    let decoder = Decoder {
        inner: bytes,
        lines: LineBuffer::default(),
        ready: VecDeque::new(),
        finished: false,
    };

    stream::unfold(decoder, |mut decoder| async move {
        loop {
            if let Some(text) = decoder.ready.pop_front() {
                return Some((Ok(text), decoder));
            }
            if decoder.finished {
                return None;
            }
            match decoder.inner.next().await {
                Some(Ok(chunk)) => {
                    for line in decoder.lines.push(chunk.as_ref()) {
                        decoder.absorb(&line);
                    }
                }
                Some(Err(e)) => {
                    decoder.finished = true;
                    return Some((Err(e.into()), decoder));
                }
                None => {
                    decoder.finished = true;
                    if let Some(line) = decoder.lines.finish() {
                        decoder.absorb(&line);
                    }
                }
            }
        }
    })
    .boxed()
}
