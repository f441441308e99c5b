//! Durability gate: tracks connection state to the durable store.
//!
//! State machine with three states - `Disconnected`, `Connecting`,
//! `Connected` - behind a single suspension point, [`DurabilityGate::ensure_available`].
//! Connection failures are logged and collapsed into availability; callers
//! only ever see the three-way [`Durability`] outcome. Concurrent callers
//! during an in-flight attempt share that attempt's outcome (single-flight),
//! so an unreachable database never causes a connection storm.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::{Mutex, watch};

use crate::config::CatalogConfig;

/// Availability of the durable store, re-evaluated on every call.
#[derive(Debug, Clone)]
pub enum Durability {
    /// Connected; operations should use this pool.
    Ready(PgPool),
    /// A durable store is configured but unreachable right now.
    Down,
    /// No durable store was ever configured; demo mode is the steady state.
    NotConfigured,
}

/// Boxed connection attempt returned by [`Connect`] implementations.
pub type ConnectFuture<'a> =
    Pin<Box<dyn Future<Output = Result<PgPool, sqlx::Error>> + Send + 'a>>;

/// Seam for establishing the underlying connection. Production uses
/// [`PgConnect`]; tests substitute a counting fake.
pub trait Connect: Send + Sync + 'static {
    /// Attempt to establish a connection pool within `timeout`.
    fn connect(&self, url: &SecretString, timeout: Duration) -> ConnectFuture<'_>;
}

/// Real Postgres connector with bounded initial connect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnect;

impl Connect for PgConnect {
    fn connect(&self, url: &SecretString, timeout: Duration) -> ConnectFuture<'_> {
        let url = url.expose_secret().to_owned();
        Box::pin(async move {
            let options = PgPoolOptions::new()
                .max_connections(10)
                .min_connections(2)
                .acquire_timeout(timeout);
            // PgPoolOptions::connect performs an initial connection, but its
            // own retry loop can exceed the ceiling; enforce it outside too.
            match tokio::time::timeout(timeout, options.connect(&url)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(sqlx::Error::PoolTimedOut),
            }
        })
    }
}

enum GateState {
    Disconnected,
    /// An attempt is in flight; waiters subscribe to its outcome.
    Connecting(watch::Receiver<Option<bool>>),
    Connected(PgPool),
}

/// Tracks live connection state to the durable store and performs on-demand,
/// single-flight (re)connection. The pool handle is shared by reference with
/// all callers; only the gate transitions its state.
pub struct DurabilityGate {
    database_url: Option<SecretString>,
    connect_timeout: Duration,
    connector: Arc<dyn Connect>,
    state: Mutex<GateState>,
}

impl DurabilityGate {
    /// Create a gate from configuration, using the real Postgres connector.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        Self::with_connector(
            config.database_url.clone(),
            config.connect_timeout,
            Arc::new(PgConnect),
        )
    }

    /// Create a gate with a custom connector (used by tests).
    #[must_use]
    pub fn with_connector(
        database_url: Option<SecretString>,
        connect_timeout: Duration,
        connector: Arc<dyn Connect>,
    ) -> Self {
        Self {
            database_url,
            connect_timeout,
            connector,
            state: Mutex::new(GateState::Disconnected),
        }
    }

    /// Whether a durable store address is configured at all.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.database_url.is_some()
    }

    /// Report current availability, attempting a bounded (re)connect when
    /// disconnected. Never returns an error: failures are logged once and
    /// collapsed to [`Durability::Down`].
    ///
    /// Cancel-safe: if the caller running the connection attempt is dropped
    /// mid-connect (hosts routinely cancel request tasks), waiters detect
    /// the dead outcome channel, reset the gate to `Disconnected`, and one
    /// of them starts a fresh attempt.
    pub async fn ensure_available(&self) -> Durability {
        let Some(url) = &self.database_url else {
            return Durability::NotConfigured;
        };

        loop {
            let mut rx = {
                let mut state = self.state.lock().await;
                match &*state {
                    GateState::Connected(pool) => return Durability::Ready(pool.clone()),
                    GateState::Connecting(rx) => rx.clone(),
                    GateState::Disconnected => {
                        let (tx, rx) = watch::channel(None);
                        *state = GateState::Connecting(rx);
                        drop(state);
                        return self.run_connect(url, &tx).await;
                    }
                }
            };

            // Another caller's attempt is in flight; wait for its outcome.
            let outcome = loop {
                if let Some(succeeded) = *rx.borrow_and_update() {
                    break Some(succeeded);
                }
                if rx.changed().await.is_err() {
                    break None;
                }
            };

            match outcome {
                Some(true) => {
                    let state = self.state.lock().await;
                    if let GateState::Connected(pool) = &*state {
                        return Durability::Ready(pool.clone());
                    }
                    return Durability::Down;
                }
                Some(false) => return Durability::Down,
                None => {
                    // The initiator was dropped before resolving its attempt.
                    // Reclaim the channel so this call (and every later one)
                    // retries instead of waiting on a dead attempt; skip the
                    // reset if someone else already replaced the state.
                    let mut state = self.state.lock().await;
                    if matches!(&*state, GateState::Connecting(cur) if cur.has_changed().is_err())
                    {
                        *state = GateState::Disconnected;
                    }
                }
            }
        }
    }

    /// Flip back to `Disconnected` after a connection-class failure so the
    /// next call becomes a retry opportunity. An in-flight attempt is never
    /// interrupted.
    pub async fn mark_disconnected(&self) {
        let mut state = self.state.lock().await;
        if matches!(&*state, GateState::Connected(_)) {
            *state = GateState::Disconnected;
            tracing::warn!("durable store connection lost; will reconnect on next request");
        }
    }

    async fn run_connect(&self, url: &SecretString, tx: &watch::Sender<Option<bool>>) -> Durability {
        tracing::info!("connecting to durable store");
        let outcome = self.connector.connect(url, self.connect_timeout).await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(pool) => {
                *state = GateState::Connected(pool.clone());
                drop(state);
                let _ = tx.send(Some(true));
                tracing::info!("durable store connected");
                Durability::Ready(pool)
            }
            Err(error) => {
                *state = GateState::Disconnected;
                drop(state);
                let _ = tx.send(Some(false));
                tracing::warn!(%error, "durable store connection failed; continuing without it");
                Durability::Down
            }
        }
    }
}

impl std::fmt::Debug for DurabilityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurabilityGate")
            .field("configured", &self.is_configured())
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}
