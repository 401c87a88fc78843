// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of consumers that receive liveness notifications.

use std::cell::Cell;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use crate::command::ChannelKind;

use super::ConsumerId;

/// Callback invoked with the new liveness on every transition.
pub type LivenessCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// One attached consumer.
///
/// The `attached` flag is only read or written while holding its lock, and
/// delivery holds that lock for the duration of the callback. Once `detach`
/// returns, no further callback for this registration can start.
struct Registration {
    id: ConsumerId,
    kind: ChannelKind,
    callback: LivenessCallback,
    // Reentrant so a callback may detach its own consumer.
    attached: ReentrantMutex<Cell<bool>>,
}

impl Registration {
    fn new(id: ConsumerId, kind: ChannelKind, callback: LivenessCallback) -> Self {
        Self {
            id,
            kind,
            callback,
            attached: ReentrantMutex::new(Cell::new(true)),
        }
    }

    /// Invokes the callback if still attached. Returns `true` if it ran.
    fn deliver(&self, is_on: bool) -> bool {
        let attached = self.attached.lock();
        if !attached.get() {
            return false;
        }

        let result = catch_unwind(AssertUnwindSafe(|| (self.callback)(is_on)));
        if result.is_err() {
            tracing::error!(
                consumer = %self.id,
                kind = %self.kind,
                "Liveness callback panicked"
            );
        }
        true
    }

    fn detach(&self) {
        self.attached.lock().set(false);
    }
}

/// Thread-safe mapping from consumer identity to registration.
///
/// Fan-out takes a snapshot of the entries under a short read lock and
/// releases it before running any callback, so a slow consumer never holds
/// the map.
pub(crate) struct ConsumerRegistry {
    entries: RwLock<HashMap<ConsumerId, Arc<Registration>>>,
}

impl ConsumerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a consumer, replacing any entry with the same identity.
    pub(crate) fn insert(&self, id: ConsumerId, kind: ChannelKind, callback: LivenessCallback) {
        let registration = Arc::new(Registration::new(id, kind, callback));
        let previous = self.entries.write().insert(id, registration);

        if let Some(previous) = previous {
            previous.detach();
            tracing::debug!(consumer = %id, %kind, "Replaced existing registration");
        } else {
            tracing::debug!(consumer = %id, %kind, "Registered consumer");
        }
    }

    /// Removes a consumer. Returns `true` if it was present.
    ///
    /// Blocks until an in-flight callback for this consumer has returned.
    pub(crate) fn detach(&self, id: ConsumerId, kind: ChannelKind) -> bool {
        let removed = self.entries.write().remove(&id);

        match removed {
            Some(registration) => {
                if registration.kind != kind {
                    tracing::debug!(
                        consumer = %id,
                        registered = %registration.kind,
                        requested = %kind,
                        "Detaching consumer under a different channel kind"
                    );
                }
                registration.detach();
                true
            }
            None => false,
        }
    }

    /// Returns `true` if the consumer is currently registered.
    pub(crate) fn contains(&self, id: ConsumerId) -> bool {
        self.entries.read().contains_key(&id)
    }

    /// Runs `f` under the consumer's attached lock if it is still attached.
    ///
    /// Returns `None` without running `f` once the consumer is detached. A
    /// concurrent `detach` waits until `f` has returned.
    pub(crate) fn while_attached<R>(&self, id: ConsumerId, f: impl FnOnce() -> R) -> Option<R> {
        let registration = self.entries.read().get(&id).cloned()?;
        let attached = registration.attached.lock();
        attached.get().then(f)
    }

    /// Returns the number of registered consumers.
    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Detaches every consumer.
    pub(crate) fn clear(&self) {
        let drained: Vec<_> = self.entries.write().drain().map(|(_, r)| r).collect();
        for registration in drained {
            registration.detach();
        }
    }

    /// Delivers a liveness value to every attached consumer.
    ///
    /// Returns the number of consumers that received it. A panicking
    /// callback is logged and does not stop delivery to the others.
    pub(crate) fn notify(&self, is_on: bool) -> usize {
        let snapshot: Vec<Arc<Registration>> = self.entries.read().values().cloned().collect();

        snapshot
            .iter()
            .filter(|registration| registration.deliver(is_on))
            .count()
    }
}

impl Default for ConsumerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConsumerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerRegistry")
            .field("consumer_count", &self.len())
            .finish()
    }
}
