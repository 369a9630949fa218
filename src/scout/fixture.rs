// src/scout/fixture.rs
//! Scripted scout for tests, demos and `SCOUT_TEST_MODE=mock`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{stream, StreamExt};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use super::{ChunkStream, ScoutClient};
use crate::assessment::{Category, Severity};
use crate::error::ScoutError;

/// How the fixture answers for one target.
#[derive(Debug, Clone)]
pub enum Script {
    /// Raw text chunks, emitted as-is.
    Chunks(Vec<String>),
    /// Chunks, then a read error with the given message.
    BreakAfter(Vec<String>, String),
    /// Launch fails with the given message.
    Fail(String),
    /// Launch succeeds but no chunk ever arrives.
    Hang,
    /// Panics inside `launch`.
    Panic,
    /// Wait before behaving like the inner script.
    Delayed(Duration, Box<Script>),
}

impl Script {
    /// One `data:` frame carrying `final_result`.
    pub fn final_result(payload: Value) -> Self {
        Self::Chunks(vec![frame(&json!({ "final_result": payload }))])
    }

    /// Completed scan with the given signals.
    pub fn signals(items: &[(&str, Severity, Category)]) -> Self {
        let signals: Vec<Value> = items
            .iter()
            .map(|(summary, sev, cat)| {
                json!({
                    "summary": summary,
                    "severity": sev,
                    "category": cat,
                })
            })
            .collect();
        let status = if items.iter().any(|(_, s, _)| *s != Severity::Low) {
            "DISRUPTED"
        } else {
            "NORMAL"
        };
        Self::final_result(json!({
            "scan_status": "completed",
            "operational_status": status,
            "signals": signals,
        }))
    }

    pub fn delayed(self, by: Duration) -> Self {
        Self::Delayed(by, Box::new(self))
    }
}

/// Format one SSE data line.
pub fn frame(v: &Value) -> String {
    format!("data: {v}\n")
}

pub struct FixtureScout {
    scripts: HashMap<String, Script>,
    fallback: Script,
    launches: Arc<AtomicUsize>,
    cancellations: Arc<AtomicUsize>,
}

impl FixtureScout {
    /// Every target without its own script answers with `fallback`.
    pub fn new(fallback: Script) -> Self {
        Self {
            scripts: HashMap::new(),
            fallback,
            launches: Arc::new(AtomicUsize::new(0)),
            cancellations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reports normal operations for every target.
    pub fn all_clear() -> Self {
        Self::new(Script::signals(&[(
            "All terminals open. No delays reported.",
            Severity::Low,
            Category::Quote,
        )]))
    }

    pub fn with_script(mut self, target: impl Into<String>, script: Script) -> Self {
        self.scripts.insert(target.into(), script);
        self
    }

    /// Number of `launch` calls so far.
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Number of hanging runs whose cancellation was observed.
    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }

    async fn run(&self, script: Script, cancel: CancellationToken) -> Result<ChunkStream, ScoutError> {
        let mut script = script;
        loop {
            return match script {
                Script::Delayed(by, inner) => {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(ScoutError::Cancelled),
                        _ = tokio::time::sleep(by) => {}
                    }
                    script = *inner;
                    continue;
                }
                Script::Chunks(chunks) => Ok(Box::pin(stream::iter(
                    chunks.into_iter().map(|c| Ok(Bytes::from(c))),
                ))),
                Script::BreakAfter(chunks, msg) => {
                    let items = chunks
                        .into_iter()
                        .map(|c| Ok(Bytes::from(c)))
                        .chain(std::iter::once(Err(ScoutError::Stream(msg))));
                    Ok(Box::pin(stream::iter(items)))
                }
                Script::Fail(msg) => Err(ScoutError::Launch(msg)),
                Script::Hang => {
                    // Stand-in for remote work that only stops when told to.
                    let cancellations = self.cancellations.clone();
                    tokio::spawn(async move {
                        cancel.cancelled().await;
                        cancellations.fetch_add(1, Ordering::SeqCst);
                    });
                    Ok(stream::pending().boxed())
                }
                Script::Panic => panic!("fixture scout panicked on purpose"),
            };
        }
    }
}

#[async_trait::async_trait]
impl ScoutClient for FixtureScout {
    async fn launch(
        &self,
        target: &str,
        _goal: &str,
        cancel: CancellationToken,
    ) -> Result<ChunkStream, ScoutError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .get(target)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());
        self.run(script, cancel).await
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
