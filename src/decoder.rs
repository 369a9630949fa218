//! Frame decoder for the scout's incremental response stream.
//!
//! The stream is UTF-8 text; logical lines starting with `data: ` carry a JSON
//! object. The most recent truthy `final_result` wins. Non-frame lines and
//! frames that are not valid JSON are dropped without error.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::ScoutError;

const FRAME_PREFIX: &str = "data: ";

/// Incremental line scanner. Only the unterminated tail is buffered.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    pending: Vec<u8>,
    latest: Option<Value>,
    frames: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; complete lines are inspected immediately.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        let mut start = 0;
        while let Some(pos) = self.pending[start..].iter().position(|b| *b == b'\n') {
            let end = start + pos;
            let line = String::from_utf8_lossy(&self.pending[start..end]).into_owned();
            self.inspect(&line);
            start = end + 1;
        }
        self.pending.drain(..start);
    }

    /// End of stream: inspect the unterminated tail and yield the payload, if any.
    pub fn finish(mut self) -> Option<Value> {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            let line = String::from_utf8_lossy(&tail).into_owned();
            self.inspect(&line);
        }
        self.latest
    }

    /// Number of frames that parsed as JSON so far.
    pub fn frames_seen(&self) -> usize {
        self.frames
    }

    fn inspect(&mut self, line: &str) {
        let Some(body) = line.strip_prefix(FRAME_PREFIX) else {
            return;
        };
        let Ok(frame) = serde_json::from_str::<Value>(body) else {
            return;
        };
        self.frames += 1;
        if let Some(result) = frame.get("final_result").filter(|v| is_truthy(v)) {
            self.latest = Some(result.clone());
        }
    }
}

/// `null`, `false`, `0` and `""` do not count as a result.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Drain `stream` to its end and return the last `final_result`.
///
/// A read error ends decoding and is returned as-is. Cancellation is checked
/// between chunks.
pub async fn decode<S>(mut stream: S, cancel: &CancellationToken) -> Result<Option<Value>, ScoutError>
where
    S: Stream<Item = Result<Bytes, ScoutError>> + Unpin,
{
    let mut decoder = FrameDecoder::new();
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScoutError::Cancelled),
            next = stream.next() => next,
        };
        match next {
            Some(Ok(chunk)) => decoder.feed(&chunk),
            Some(Err(e)) => return Err(e),
            None => break,
        }
    }
    tracing::trace!(target: "scout", frames = decoder.frames_seen(), "stream drained");
    Ok(decoder.finish())
}
