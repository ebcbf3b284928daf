//! Alert dispatch for freshly recorded debits.
//!
//! Evaluation for one user is serialized through [`UserGate`]: the caller
//! takes the user's guard before persisting the transaction and the guard is
//! released once the alert events are computed. Delivery runs afterwards,
//! concurrently per channel and bounded by a timeout.

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use engine::{
    AlertEvent, Category, Engine, EngineError, MoneyCents, NotificationPreferences, Transaction,
    evaluate_alerts,
};
use tokio::{
    sync::{Mutex, OwnedMutexGuard},
    task::JoinSet,
};
use tracing::{debug, error, info, warn};

use crate::{AlertMessage, Notifier, NotifyError, Recipient};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Held while a user's transaction is recorded and evaluated.
pub type UserGuard = OwnedMutexGuard<()>;

/// Per-user mutual exclusion.
#[derive(Debug, Default)]
pub struct UserGate {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserGate {
    pub async fn acquire(&self, username: &str) -> UserGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries nobody holds or waits on can go.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(username.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// The debit being evaluated.
struct Debit<'a> {
    username: &'a str,
    amount: MoneyCents,
    category: Category,
    occurred_at: DateTime<Utc>,
}

/// What a dispatch did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DispatchOutcome {
    pub alerts: Vec<AlertEvent>,
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchOutcome {
    /// Whether any threshold was crossed.
    pub fn fired(&self) -> bool {
        !self.alerts.is_empty()
    }
}

pub struct AlertDispatcher {
    engine: Arc<Engine>,
    notifiers: Vec<Arc<dyn Notifier>>,
    gate: UserGate,
    timeout: Duration,
}

impl AlertDispatcher {
    pub fn builder(engine: Arc<Engine>) -> AlertDispatcherBuilder {
        AlertDispatcherBuilder {
            engine,
            notifiers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn gate(&self) -> &UserGate {
        &self.gate
    }

    /// Evaluate and deliver alerts for a debit that was just recorded and is
    /// dated now.
    pub async fn dispatch_alerts(
        &self,
        username: &str,
        amount: MoneyCents,
        category: Category,
    ) -> DispatchOutcome {
        let guard = self.gate.acquire(username).await;
        let now = Utc::now();
        let debit = Debit {
            username,
            amount,
            category,
            occurred_at: now,
        };
        self.dispatch_debit(guard, debit, now).await
    }

    /// Like [`Self::dispatch_alerts`] for a stored transaction, with the
    /// user's guard already held and an explicit evaluation instant. The
    /// guard is dropped before delivery.
    pub async fn dispatch_at(
        &self,
        guard: UserGuard,
        tx: &Transaction,
        now: DateTime<Utc>,
    ) -> DispatchOutcome {
        let debit = Debit {
            username: &tx.username,
            amount: tx.amount,
            category: tx.category,
            occurred_at: tx.occurred_at,
        };
        self.dispatch_debit(guard, debit, now).await
    }

    async fn dispatch_debit(
        &self,
        guard: UserGuard,
        debit: Debit<'_>,
        now: DateTime<Utc>,
    ) -> DispatchOutcome {
        let username = debit.username;
        let evaluated = self.evaluate(&debit, now).await;
        drop(guard);

        let Some((preferences, alerts)) = evaluated else {
            return DispatchOutcome::default();
        };
        if alerts.is_empty() {
            debug!(username, "no threshold crossed");
            return DispatchOutcome::default();
        }

        let (delivered, failed) = self.deliver(&preferences, &alerts).await;
        info!(
            username,
            alerts = alerts.len(),
            delivered,
            failed,
            "alerts dispatched"
        );
        DispatchOutcome {
            alerts,
            delivered,
            failed,
        }
    }

    async fn evaluate(
        &self,
        debit: &Debit<'_>,
        now: DateTime<Utc>,
    ) -> Option<(NotificationPreferences, Vec<AlertEvent>)> {
        let username = debit.username;
        let preferences = match self.engine.notification_preferences(username).await {
            Ok(preferences) => preferences,
            Err(EngineError::KeyNotFound(_)) => {
                info!(username, "user not found, skipping alerts");
                return None;
            }
            Err(err) => {
                error!(username, "failed to read notification preferences: {err}");
                return None;
            }
        };

        let analyzed = async {
            let snapshot = self.engine.analyze(username, now).await?;
            let windows = self.engine.windows_for(username, now).await?;
            Ok::<_, EngineError>((snapshot, windows))
        }
        .await;
        let (snapshot, windows) = match analyzed {
            Ok(analyzed) => analyzed,
            Err(err) => {
                error!(username, "failed to analyze spending: {err}");
                return None;
            }
        };
        if snapshot.limits.is_none() {
            debug!(username, "no limits configured, skipping alerts");
            return None;
        }

        let alerts = evaluate_alerts(
            &snapshot,
            &windows,
            username,
            debit.amount,
            debit.category,
            debit.occurred_at,
        );
        Some((preferences, alerts))
    }

    /// Sends every alert on every enabled channel. Returns `(delivered, failed)`.
    async fn deliver(
        &self,
        preferences: &NotificationPreferences,
        alerts: &[AlertEvent],
    ) -> (usize, usize) {
        let recipients = Recipient::enabled_for(preferences);
        let mut deliveries = JoinSet::new();

        for alert in alerts {
            let message = Arc::new(AlertMessage::from(alert));
            for recipient in &recipients {
                let Some(notifier) = self
                    .notifiers
                    .iter()
                    .find(|notifier| notifier.kind() == recipient.kind())
                    .cloned()
                else {
                    debug!(channel = %recipient.kind(), "channel not configured");
                    continue;
                };
                let recipient = recipient.clone();
                let message = Arc::clone(&message);
                let timeout = self.timeout;
                deliveries.spawn(async move {
                    let kind = notifier.kind();
                    let result =
                        match tokio::time::timeout(timeout, notifier.notify(&recipient, &message))
                            .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(NotifyError::Timeout),
                        };
                    (kind, message.scope_name.clone(), result)
                });
            }
        }

        let (mut delivered, mut failed) = (0, 0);
        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok((_, _, Ok(()))) => delivered += 1,
                Ok((kind, scope, Err(err))) => {
                    warn!(channel = %kind, scope = %scope, "alert delivery failed: {err}");
                    failed += 1;
                }
                Err(err) => {
                    warn!("alert delivery task failed: {err}");
                    failed += 1;
                }
            }
        }
        (delivered, failed)
    }
}

pub struct AlertDispatcherBuilder {
    engine: Arc<Engine>,
    notifiers: Vec<Arc<dyn Notifier>>,
    timeout: Duration,
}

impl AlertDispatcherBuilder {
    /// Register a channel. A later notifier of the same kind is ignored.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Upper bound for a single delivery.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> AlertDispatcher {
        AlertDispatcher {
            engine: self.engine,
            notifiers: self.notifiers,
            gate: UserGate::default(),
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn gate_serializes_one_user_only() {
        let gate = UserGate::default();
        let alice = gate.acquire("alice").await;

        // Another user is not blocked.
        let bob = tokio::time::timeout(Duration::from_millis(50), gate.acquire("bob")).await;
        assert!(bob.is_ok());

        // The same user waits until the guard is dropped.
        let again = tokio::time::timeout(Duration::from_millis(50), gate.acquire("alice")).await;
        assert!(again.is_err());

        drop(alice);
        let again = tokio::time::timeout(Duration::from_millis(50), gate.acquire("alice")).await;
        assert!(again.is_ok());
    }
}
