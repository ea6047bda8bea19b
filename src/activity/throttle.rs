use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::activity::adapters::AdapterRegistry;
use crate::activity::aggregator::ActivityAggregator;
use crate::activity::dedup::DedupRegistry;
use crate::activity::sequence::CallSequence;
use crate::config::ActivityConfig;
use crate::models::activity::{ActivitySnapshot, NewToolCall};

#[derive(Debug)]
enum PendingUpdate {
    Add {
        call: NewToolCall,
        started_at: Instant,
    },
    Complete {
        id: String,
        result: Value,
        error: Option<String>,
        ended_at: Instant,
    },
}

struct ScheduledCommit {
    token: u64,
    task: JoinHandle<()>,
}

struct Inner {
    aggregator: ActivityAggregator,
    pending: VecDeque<PendingUpdate>,
    dedup: DedupRegistry,
    sequence: CallSequence,
    scheduled: Option<ScheduledCommit>,
    next_token: u64,
    generation: u64,
    commits: u64,
}

impl Inner {
    /// Drains the queue into the aggregator in arrival order. Returns the batch size.
    fn apply_pending(&mut self) -> usize {
        let batch: Vec<PendingUpdate> = self.pending.drain(..).collect();
        let size = batch.len();
        for update in batch {
            match update {
                PendingUpdate::Add { call, started_at } => {
                    self.aggregator.add_tool_call(call, Some(started_at));
                }
                PendingUpdate::Complete {
                    id,
                    result,
                    error,
                    ended_at,
                } => {
                    self.aggregator.complete_tool_call(&id, result, error, ended_at);
                }
            }
        }
        if size > 0 {
            self.commits += 1;
        }
        size
    }

    fn cancel_scheduled(&mut self) {
        if let Some(scheduled) = self.scheduled.take() {
            scheduled.task.abort();
        }
    }
}

/// Observable activity state with batched, rate-limited commits.
///
/// `add_tool_call` and `complete_tool_call` only enqueue. Queued updates become
/// visible together when the commit scheduled by the first enqueue fires, one
/// interval later. Terminal transitions may flush the queue immediately
/// (`expedite_terminal`), which keeps them ordered after their own `add`.
/// Every mutation of the aggregator happens under one lock, so readers of the
/// published snapshot never see a half-applied batch.
///
/// Outside a tokio runtime nothing can be scheduled, so each enqueue commits
/// immediately and the handle behaves unthrottled.
#[derive(Clone)]
pub struct ActivityHandle {
    inner: Arc<Mutex<Inner>>,
    published: Arc<watch::Sender<ActivitySnapshot>>,
    config: Arc<ActivityConfig>,
}

impl ActivityHandle {
    pub fn new(config: ActivityConfig, adapters: Arc<AdapterRegistry>) -> Self {
        let aggregator = ActivityAggregator::new(adapters);
        let (tx, _rx) = watch::channel(aggregator.snapshot());
        Self {
            inner: Arc::new(Mutex::new(Inner {
                aggregator,
                pending: VecDeque::new(),
                dedup: DedupRegistry::new(),
                sequence: CallSequence::new(),
                scheduled: None,
                next_token: 0,
                generation: 0,
                commits: 0,
            })),
            published: Arc::new(tx),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ActivityConfig {
        &self.config
    }

    pub fn adapters(&self) -> Arc<AdapterRegistry> {
        self.lock().aggregator.adapters().clone()
    }

    pub fn add_tool_call(&self, call: NewToolCall) {
        let mut inner = self.lock();
        inner.pending.push_back(PendingUpdate::Add {
            call,
            started_at: Instant::now(),
        });
        self.schedule_commit(&mut inner);
    }

    pub fn complete_tool_call(&self, id: &str, result: Value, error: Option<String>) {
        let mut inner = self.lock();
        inner.pending.push_back(PendingUpdate::Complete {
            id: id.to_string(),
            result,
            error,
            ended_at: Instant::now(),
        });
        if self.config.expedite_terminal {
            inner.cancel_scheduled();
            self.commit_locked(&mut inner);
        } else {
            self.schedule_commit(&mut inner);
        }
    }

    /// Appends to the transcript and publishes right away; thinking is not throttled.
    pub fn set_thinking(&self, fragment: &str) {
        let mut inner = self.lock();
        inner.aggregator.append_thinking(fragment);
        self.published.send_replace(inner.aggregator.snapshot());
    }

    /// Clears records, transcript, queue, start times and the dedup registry at once,
    /// and invalidates any scheduled commit.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.cancel_scheduled();
        inner.pending.clear();
        inner.dedup.clear();
        inner.aggregator.reset();
        inner.generation += 1;
        tracing::info!(turn_id = %inner.aggregator.turn_id(), "activity reset");
        self.published.send_replace(inner.aggregator.snapshot());
    }

    /// Commits whatever is queued without waiting for the tick.
    pub fn flush(&self) {
        let mut inner = self.lock();
        inner.cancel_scheduled();
        self.commit_locked(&mut inner);
    }

    pub fn should_process(&self, key: &str) -> bool {
        self.lock().dedup.should_process(key)
    }

    pub fn next_call_id(&self, tool_name: &str) -> String {
        self.lock().sequence.next_id(tool_name)
    }

    /// Increments on every reset.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of non-empty batches applied so far.
    pub fn commit_count(&self) -> u64 {
        self.lock().commits
    }

    pub fn snapshot(&self) -> ActivitySnapshot {
        self.published.borrow().clone()
    }

    pub fn is_working(&self) -> bool {
        self.published.borrow().is_working()
    }

    pub fn subscribe(&self) -> watch::Receiver<ActivitySnapshot> {
        self.published.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit_locked(&self, inner: &mut Inner) {
        let size = inner.apply_pending();
        if size == 0 {
            return;
        }
        tracing::debug!(batch = size, "committed activity batch");
        self.published.send_replace(inner.aggregator.snapshot());
    }

    fn schedule_commit(&self, inner: &mut Inner) {
        if inner.scheduled.is_some() {
            return;
        }
        // Without a runtime there is no timer to wait on; commit in place.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no tokio runtime; committing without delay");
            self.commit_locked(inner);
            return;
        };
        inner.next_token += 1;
        let token = inner.next_token;
        let interval = Duration::from_millis(self.config.throttle_interval_ms);
        let handle = self.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep(interval).await;
            handle.run_scheduled(token);
        });
        inner.scheduled = Some(ScheduledCommit { token, task });
    }

    fn run_scheduled(&self, token: u64) {
        let mut inner = self.lock();
        // A reset or flush since scheduling replaced or dropped this token.
        match &inner.scheduled {
            Some(scheduled) if scheduled.token == token => {}
            _ => return,
        }
        inner.scheduled = None;
        self.commit_locked(&mut inner);
    }
}

impl std::fmt::Debug for ActivityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityHandle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
