use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use super::provider::ChatClient;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(15);

/// Observable lifecycle of the chat client gate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReadinessState {
    #[default]
    Pending,
    Ready,
    Failed(String),
}

impl ReadinessState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason.as_str()),
            Self::Pending | Self::Ready => None,
        }
    }
}

/// Waits for a chat client to report itself usable.
///
/// The capability check runs immediately and then once per poll interval. The whole
/// wait, including a probe that never returns, is bounded by the timeout. `Ready` is
/// sticky: later calls to [`ReadinessGate::open`] return without probing.
pub struct ReadinessGate {
    poll_interval: Duration,
    timeout: Duration,
    state_tx: watch::Sender<ReadinessState>,
}

impl ReadinessGate {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        let (state_tx, _) = watch::channel(ReadinessState::Pending);
        Self {
            poll_interval,
            timeout,
            state_tx,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn state(&self) -> ReadinessState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ReadinessState> {
        self.state_tx.subscribe()
    }

    pub async fn open(&self, client: &dyn ChatClient) -> ReadinessState {
        if self.state().is_ready() {
            return ReadinessState::Ready;
        }

        self.state_tx.send_replace(ReadinessState::Pending);
        tracing::debug!(
            provider_id = %client.id(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            timeout_ms = self.timeout.as_millis() as u64,
            "waiting for chat client readiness"
        );

        let mut attempts = 0u32;
        let poll = async {
            let mut ticker = time::interval(self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                attempts += 1;
                if client.is_available().await {
                    break;
                }
            }
        };

        let next_state = match time::timeout(self.timeout, poll).await {
            Ok(()) => {
                tracing::info!(
                    provider_id = %client.id(),
                    attempts,
                    "chat client is ready"
                );
                ReadinessState::Ready
            }
            Err(_) => {
                let reason = format!(
                    "chat client '{}' was not available after {:.1}s",
                    client.id(),
                    self.timeout.as_secs_f64()
                );
                tracing::warn!(
                    provider_id = %client.id(),
                    attempts,
                    reason = %reason,
                    "chat client readiness timed out"
                );
                ReadinessState::Failed(reason)
            }
        };

        self.state_tx.send_replace(next_state.clone());
        next_state
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_READINESS_TIMEOUT)
    }
}
