//! Line framing for streamed HTTP bodies (SSE from Gemini, NDJSON from Ollama).

use std::collections::VecDeque;

use futures::stream::{self, Stream, StreamExt};

use crate::error::BackendError;

/// Incremental splitter that turns arbitrary byte chunks into complete lines.
///
/// Lines are returned without the trailing `\n` (or `\r\n`). Bytes after the
/// last newline are held until more data arrives or [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Flush a trailing line that had no newline, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        let line = String::from_utf8_lossy(&rest);
        let line = line.trim_end_matches('\r');
        Some(line.to_string())
    }
}

struct LineState<S> {
    bytes: S,
    decoder: LineDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

/// Adapt a byte stream (e.g. `reqwest::Response::bytes_stream`) into a stream of lines.
///
/// A transport error is yielded once and ends the stream.
pub fn lines<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, BackendError>> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<BackendError> + Send + 'static,
{
    let state = LineState {
        bytes: Box::pin(bytes),
        decoder: LineDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.pending.pop_front() {
                return Some((Ok(line), state));
            }
            if state.finished {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let complete = state.decoder.push(chunk.as_ref());
                    state.pending.extend(complete);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    state.finished = true;
                    state.pending.extend(state.decoder.finish());
                }
            }
        }
    })
}
