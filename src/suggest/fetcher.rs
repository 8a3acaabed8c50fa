//! Debounced suggestion fetching with latest-query-wins semantics

use super::{Scope, SuggestionItem, SuggestionSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Progress of a scheduled fetch, tagged with the generation that issued it
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    /// Debounce elapsed and the request is in flight
    Started { generation: u64 },
    /// Request finished with these items
    Finished {
        generation: u64,
        items: Vec<SuggestionItem>,
    },
    /// Request failed; already logged
    Failed { generation: u64 },
}

impl FetchEvent {
    pub fn generation(&self) -> u64 {
        match self {
            FetchEvent::Started { generation }
            | FetchEvent::Finished { generation, .. }
            | FetchEvent::Failed { generation } => *generation,
        }
    }
}

/// Schedules at most one suggestion request at a time.
///
/// Every call to [`schedule`](Self::schedule) bumps the generation and cancels
/// whatever was pending, whether still waiting out the debounce or already in
/// flight. Events for older generations can still be sitting in the channel;
/// receivers compare against [`generation`](Self::generation) to drop them.
pub struct SuggestionFetcher {
    source: Arc<dyn SuggestionSource>,
    debounce: Duration,
    max_items: usize,
    generation: u64,
    pending: Option<CancellationToken>,
    tx: mpsc::UnboundedSender<FetchEvent>,
}

impl SuggestionFetcher {
    pub fn new(
        source: Arc<dyn SuggestionSource>,
        debounce: Duration,
        tx: mpsc::UnboundedSender<FetchEvent>,
    ) -> Self {
        Self {
            source,
            debounce,
            max_items: crate::MAX_SUGGESTIONS,
            generation: 0,
            pending: None,
            tx,
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Latest issued generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &Arc<dyn SuggestionSource> {
        &self.source
    }

    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Schedule a fetch for `query` after the debounce period.
    ///
    /// Returns the new generation. A blank query cancels pending work and
    /// schedules nothing.
    pub fn schedule(&mut self, query: &str, scope: Option<Scope>) -> u64 {
        self.cancel();

        let query = query.trim();
        if query.is_empty() {
            return self.generation;
        }

        let generation = self.generation;
        let cancel = CancellationToken::new();
        self.pending = Some(cancel.clone());

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let debounce = self.debounce;
        let max_items = self.max_items;
        let query = query.to_string();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(debounce) => {}
            }

            debug!("Fetching {} suggestions for '{}'", source.name(), query);
            let _ = tx.send(FetchEvent::Started { generation });

            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Superseded {} fetch for '{}'", source.name(), query);
                    return;
                }
                result = source.suggest(&query, scope.as_ref()) => result,
            };

            if cancel.is_cancelled() {
                return;
            }

            let event = match result {
                Ok(mut items) => {
                    items.truncate(max_items);
                    FetchEvent::Finished { generation, items }
                }
                Err(e) => {
                    warn!("{} suggestions for '{}' failed: {}", source.name(), query, e);
                    FetchEvent::Failed { generation }
                }
            };
            let _ = tx.send(event);
        });

        generation
    }

    /// Cancel pending work and invalidate every earlier generation
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Drop for SuggestionFetcher {
    fn drop(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}
