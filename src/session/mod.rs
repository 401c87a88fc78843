// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared per-device session.
//!
//! A [`DeviceSession`] is the connection context for one configured
//! television. It owns:
//!
//! - the device API handle, created once and shared by every consumer;
//! - the consumer registry used for liveness fan-out;
//! - the authoritative [`Liveness`] value, published on a watch channel;
//! - the background prober task that feeds observations into it.
//!
//! Consumers attach through [`DeviceSession::register`] (or the higher level
//! [`Channel::attach`]) and detach with [`DeviceSession::deregister`] or
//! [`DeviceSession::remove`]. Both detach calls are idempotent and take
//! effect atomically with respect to an in-flight notification pass.
//!
//! # Examples
//!
//! ```no_run
//! use jointspace_lib::api::JointSpaceClient;
//! use jointspace_lib::{ChannelKind, ConsumerId, DeviceSession, PingProbe, SessionConfig};
//!
//! # async fn example() -> jointspace_lib::Result<()> {
//! let config = SessionConfig::new("192.168.1.40");
//! let api = JointSpaceClient::new(&config)?;
//! let session = DeviceSession::start(config, api, PingProbe::new())?;
//!
//! let id = ConsumerId::new();
//! let _api = session.register(id, ChannelKind::Power, |is_on| {
//!     println!("television is {}", if is_on { "on" } else { "off" });
//! });
//!
//! session.deregister(id, ChannelKind::Power);
//! session.shutdown();
//! # Ok(())
//! # }
//! ```

mod channel;

pub use channel::{Channel, ChannelStatus, OUTBOX_CAPACITY, POWER_TOPIC};

use std::ops::ControlFlow;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::DeviceApi;
use crate::command::ChannelKind;
use crate::config::SessionConfig;
use crate::dispatch::Dispatcher;
use crate::error::ConfigError;
use crate::liveness::prober::Prober;
use crate::liveness::{Liveness, Reachability, ReachabilityProbe};
use crate::registry::{ConsumerId, ConsumerRegistry};

/// Session state shared between handles, channels and the prober task.
struct SessionCore<A> {
    config: SessionConfig,
    api: Arc<A>,
    registry: ConsumerRegistry,
    liveness: watch::Sender<Liveness>,
    prober: Mutex<Option<JoinHandle<()>>>,
}

impl<A> SessionCore<A> {
    /// Applies one probe observation. Returns the new state on a transition.
    fn apply_observation(&self, observed: Reachability) -> Option<Liveness> {
        let mut transitioned = None;
        self.liveness
            .send_if_modified(|current| match current.transition(observed) {
                Some(next) => {
                    *current = next;
                    transitioned = Some(next);
                    true
                }
                None => false,
            });

        let next = transitioned?;
        tracing::info!(host = %self.config.host(), liveness = %next, "Device liveness changed");

        let delivered = self.registry.notify(next.is_on());
        tracing::debug!(delivered, "Liveness fan-out complete");
        Some(next)
    }

    fn detach(&self, id: ConsumerId, kind: ChannelKind) -> bool {
        self.registry.detach(id, kind)
    }

    fn stop(&self) {
        if let Some(handle) = self.prober.lock().take() {
            handle.abort();
            tracing::info!(host = %self.config.host(), "Session stopped");
        }
        self.registry.clear();
    }
}

impl<A> Drop for SessionCore<A> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Handle to a shared device session.
///
/// Cloning the handle is cheap and every clone refers to the same session.
/// The session stops when [`shutdown`](Self::shutdown) is called or when the
/// last handle is dropped. Consumers never keep it alive.
pub struct DeviceSession<A> {
    core: Arc<SessionCore<A>>,
}

impl<A> Clone for DeviceSession<A> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<A: DeviceApi> DeviceSession<A> {
    /// Validates the configuration and starts the session prober.
    ///
    /// The first probe runs immediately, then once per ping interval.
    /// Liveness starts as [`Liveness::Unknown`].
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn start<P: ReachabilityProbe>(
        config: SessionConfig,
        api: A,
        probe: P,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (liveness, _) = watch::channel(Liveness::Unknown);
        let prober = Prober::new(
            probe,
            config.host(),
            config.ping_interval(),
            config.probe_timeout(),
        );

        let core = Arc::new(SessionCore {
            config,
            api: Arc::new(api),
            registry: ConsumerRegistry::new(),
            liveness,
            prober: Mutex::new(None),
        });

        let weak = Arc::downgrade(&core);
        let handle = prober.spawn(move |observed| match weak.upgrade() {
            Some(core) => {
                core.apply_observation(observed);
                ControlFlow::Continue(())
            }
            None => ControlFlow::Break(()),
        });
        *core.prober.lock() = Some(handle);

        tracing::info!(
            host = %core.config.host(),
            base_url = %core.config.base_url(),
            "Session started"
        );

        Ok(Self { core })
    }

    /// Registers a consumer and returns the shared device API handle.
    ///
    /// An existing registration with the same identity is replaced. The
    /// callback receives the new boolean liveness on every transition until
    /// the consumer detaches.
    pub fn register<F>(&self, id: ConsumerId, kind: ChannelKind, callback: F) -> Arc<A>
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.core.registry.insert(id, kind, Arc::new(callback));
        Arc::clone(&self.core.api)
    }

    /// Detaches a consumer that may attach again later.
    ///
    /// Returns `true` if the consumer was attached.
    pub fn deregister(&self, id: ConsumerId, kind: ChannelKind) -> bool {
        let detached = self.core.detach(id, kind);
        if detached {
            tracing::debug!(consumer = %id, %kind, "Consumer deregistered");
        }
        detached
    }

    /// Detaches a consumer that is being deleted.
    ///
    /// Returns `true` if the consumer was attached.
    pub fn remove(&self, id: ConsumerId, kind: ChannelKind) -> bool {
        let detached = self.core.detach(id, kind);
        if detached {
            tracing::debug!(consumer = %id, %kind, "Consumer removed");
        }
        detached
    }

    /// Creates a dispatcher bound to this session.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<A> {
        Dispatcher::new(
            Arc::clone(&self.core.api),
            self.core.liveness.subscribe(),
            self.core.config.request_timeout(),
        )
    }

    /// Stops the prober and releases every registration.
    ///
    /// Idempotent. Dispatches already in flight still complete.
    pub fn shutdown(&self) {
        self.core.stop();
    }
}

impl<A> DeviceSession<A> {
    /// Returns the current liveness snapshot.
    #[must_use]
    pub fn liveness(&self) -> Liveness {
        *self.core.liveness.borrow()
    }

    /// Returns `true` if the device is currently reachable.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.liveness().is_on()
    }

    /// Subscribes to liveness changes.
    #[must_use]
    pub fn watch_liveness(&self) -> watch::Receiver<Liveness> {
        self.core.liveness.subscribe()
    }

    /// Returns the shared device API handle.
    #[must_use]
    pub fn api(&self) -> Arc<A> {
        Arc::clone(&self.core.api)
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.core.config
    }

    /// Returns the number of attached consumers.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.core.registry.len()
    }

    /// Returns `true` if the consumer is attached.
    #[must_use]
    pub fn is_attached(&self, id: ConsumerId) -> bool {
        self.core.registry.contains(id)
    }

    /// Returns `true` while the prober task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.core
            .prober
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<A> std::fmt::Debug for DeviceSession<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("host", &self.core.config.host())
            .field("liveness", &self.liveness())
            .field("consumers", &self.core.registry.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use serde_json::Value;

    use crate::api::SystemAttribute;
    use crate::command::RemoteKey;
    use crate::error::{ApiError, ProbeError};

    struct NullApi;

    impl DeviceApi for NullApi {
        async fn sources(&self) -> Result<Value, ApiError> {
            Ok(Value::Null)
        }

        async fn current_source(&self) -> Result<Value, ApiError> {
            Ok(Value::Null)
        }

        async fn system(&self) -> Result<Value, ApiError> {
            Ok(Value::Null)
        }

        async fn system_attribute(&self, _attribute: SystemAttribute) -> Result<Value, ApiError> {
            Ok(Value::Null)
        }

        async fn set_current_source(&self, _source_id: &str) -> Result<Value, ApiError> {
            Ok(Value::Null)
        }

        async fn send_key(&self, _key: RemoteKey) -> Result<Value, ApiError> {
            Ok(Value::Null)
        }
    }

    /// Probe that never completes, so only manual observations apply.
    struct IdleProbe;

    impl ReachabilityProbe for IdleProbe {
        async fn probe(&self, _host: &str, _timeout: Duration) -> Result<Reachability, ProbeError> {
            std::future::pending().await
        }
    }

    fn session() -> DeviceSession<NullApi> {
        DeviceSession::start(SessionConfig::new("tv.local"), NullApi, IdleProbe).unwrap()
    }

    fn recorder() -> (Arc<Mutex<Vec<bool>>>, impl Fn(bool) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |is_on| sink.lock().push(is_on))
    }

    #[tokio::test]
    async fn start_rejects_invalid_config() {
        let result = DeviceSession::start(SessionConfig::new(""), NullApi, IdleProbe);
        assert_eq!(result.unwrap_err(), ConfigError::MissingHost);
    }

    #[tokio::test]
    async fn new_session_is_unknown() {
        let session = session();
        assert_eq!(session.liveness(), Liveness::Unknown);
        assert!(!session.is_on());
        assert!(session.is_running());
    }

    #[tokio::test]
    async fn observations_notify_on_transition_only() {
        let session = session();
        let (seen, callback) = recorder();
        session.register(ConsumerId::new(), ChannelKind::Read, callback);

        let observed = [
            Reachability::Unreachable,
            Reachability::Unreachable,
            Reachability::Reachable,
            Reachability::Reachable,
            Reachability::Unreachable,
        ];
        for reachability in observed {
            session.core.apply_observation(reachability);
        }

        assert_eq!(*seen.lock(), vec![false, true, false]);
        assert_eq!(session.liveness(), Liveness::Off);
    }

    #[tokio::test]
    async fn register_returns_shared_api() {
        let session = session();
        let a = session.register(ConsumerId::new(), ChannelKind::Read, |_| {});
        let b = session.register(ConsumerId::new(), ChannelKind::Key, |_| {});
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &session.api()));
    }

    #[tokio::test]
    async fn register_then_deregister_restores_count() {
        let session = session();
        let before = session.consumer_count();

        let id = ConsumerId::new();
        session.register(id, ChannelKind::Write, |_| {});
        assert!(session.deregister(id, ChannelKind::Write));

        assert_eq!(session.consumer_count(), before);
        assert!(!session.deregister(id, ChannelKind::Write));
        assert!(!session.remove(id, ChannelKind::Write));
    }

    #[tokio::test]
    async fn removed_consumer_is_not_notified() {
        let session = session();
        let count = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&count);
        let id = ConsumerId::new();
        session.register(id, ChannelKind::Power, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.remove(id, ChannelKind::Power);
        session.core.apply_observation(Reachability::Reachable);

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn watch_liveness_sees_transitions() {
        let session = session();
        let mut rx = session.watch_liveness();

        session.core.apply_observation(Reachability::Reachable);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Liveness::On);

        session.core.apply_observation(Reachability::Reachable);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn shutdown_stops_prober_and_clears_registry() {
        let session = session();
        session.register(ConsumerId::new(), ChannelKind::Read, |_| {});

        session.shutdown();
        tokio::task::yield_now().await;

        assert!(!session.is_running());
        assert_eq!(session.consumer_count(), 0);
        session.shutdown();
    }

    #[tokio::test]
    async fn clones_share_state() {
        let session = session();
        let other = session.clone();
        other.register(ConsumerId::new(), ChannelKind::Read, |_| {});
        assert_eq!(session.consumer_count(), 1);
    }
}
