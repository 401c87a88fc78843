// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Liveness-gated command dispatch.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use tokio::sync::watch;

use crate::api::DeviceApi;
use crate::command::{Command, ReadOperation, RemoteKey};
use crate::config::millis;
use crate::error::ApiError;
use crate::liveness::Liveness;

use super::Outcome;

/// Resolves commands against the shared device API.
///
/// Every dispatch reads a liveness snapshot first and only contacts the
/// device when it is [`Liveness::On`]. Dispatches are independent; any number
/// may run concurrently on clones of the same dispatcher.
#[derive(Debug)]
pub struct Dispatcher<A> {
    api: Arc<A>,
    liveness: watch::Receiver<Liveness>,
    request_timeout: Duration,
}

impl<A> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            liveness: self.liveness.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl<A: DeviceApi> Dispatcher<A> {
    pub(crate) fn new(
        api: Arc<A>,
        liveness: watch::Receiver<Liveness>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            api,
            liveness,
            request_timeout,
        }
    }

    /// Returns the current liveness snapshot.
    #[must_use]
    pub fn liveness(&self) -> Liveness {
        *self.liveness.borrow()
    }

    /// Returns the shared device API handle.
    #[must_use]
    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// Resolves one command to exactly one outcome.
    pub async fn dispatch(&self, command: &Command) -> Outcome {
        let liveness = self.liveness();
        let is_on = liveness.is_on();

        match command {
            Command::PowerGet => Outcome::Success(Value::Bool(is_on)),
            // No wake mechanism exists, so a powered-off device stays off.
            Command::PowerOn(true) if is_on => Outcome::Success(Value::Bool(true)),
            Command::PowerOn(true) => Outcome::Unavailable(Value::Bool(false)),
            Command::PowerOn(false) if is_on => {
                self.resolve(self.api.send_key(RemoteKey::Standby), |_| Value::Bool(true))
                    .await
            }
            Command::PowerOn(false) => Outcome::Unavailable(Value::Bool(false)),
            _ if !is_on => {
                tracing::debug!(%liveness, kind = %command.kind(), "Device not live, skipping request");
                Outcome::Unavailable(unavailable_payload(command))
            }
            Command::Read(op) => self.read(*op).await,
            Command::SetCurrentSource(source_id) => {
                self.resolve(self.api.set_current_source(source_id), |_| Value::Bool(true))
                    .await
            }
            Command::Key(key) => {
                self.resolve(self.api.send_key(*key), |_| Value::Bool(true))
                    .await
            }
        }
    }

    async fn read(&self, op: ReadOperation) -> Outcome {
        match op {
            ReadOperation::Sources => self.resolve(self.api.sources(), |v| v).await,
            ReadOperation::CurrentSource => {
                self.resolve(self.api.current_source(), |v| field(&v, "id"))
                    .await
            }
            ReadOperation::System => self.resolve(self.api.system(), |v| v).await,
            ReadOperation::SystemAttribute(attribute) => {
                self.resolve(self.api.system_attribute(attribute), |v| {
                    field(&v, attribute.field())
                })
                .await
            }
        }
    }

    /// Awaits a device request under the request timeout and maps the result.
    ///
    /// A panic inside the request becomes [`ApiError::Panicked`].
    async fn resolve<F, M>(&self, request: F, map: M) -> Outcome
    where
        F: Future<Output = Result<Value, ApiError>>,
        M: FnOnce(Value) -> Value,
    {
        let guarded = AssertUnwindSafe(tokio::time::timeout(self.request_timeout, request));
        let result = match guarded.catch_unwind().await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ApiError::Timeout(millis(self.request_timeout))),
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(panic = %message, "Device request panicked");
                return Outcome::Failed(ApiError::Panicked(message));
            }
        };

        match result {
            Ok(value) => {
                tracing::debug!(result = %value, "Device request succeeded");
                Outcome::Success(map(value))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Device request failed");
                Outcome::Failed(e)
            }
        }
    }
}

/// Payload reported when the device is not live.
fn unavailable_payload(command: &Command) -> Value {
    match command {
        Command::Read(_) => Value::Null,
        Command::SetCurrentSource(_) | Command::PowerOn(_) | Command::PowerGet | Command::Key(_) => {
            Value::Bool(false)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Extracts an optional field. A missing field is `null`, not an error.
fn field(value: &Value, name: &str) -> Value {
    value.get(name).cloned().unwrap_or(Value::Null)
}
