// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumer channel nodes.

use std::fmt;
use std::sync::{Arc, Weak};

use serde_json::Value;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::api::DeviceApi;
use crate::command::{ChannelKind, Command};
use crate::dispatch::{Dispatcher, Message, Outcome};
use crate::registry::ConsumerId;

use super::{DeviceSession, SessionCore};

/// Topic of the unsolicited liveness messages sent by power channels.
pub const POWER_TOPIC: &str = "on";

/// Number of undelivered messages a channel outbox holds.
///
/// Further messages are dropped and logged at debug level until the
/// receiver catches up.
pub const OUTBOX_CAPACITY: usize = 32;

/// Status indicator of a channel node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Attached and the device is reachable.
    Ready,
    /// The device is not reachable.
    IsOff,
    /// Power channel: the device is on.
    On,
    /// Power channel: the device is off.
    Off,
    /// The last command succeeded.
    Ok,
    /// The last command failed.
    Error,
    /// The current source was changed.
    CurrentSource(String),
}

impl ChannelStatus {
    /// Status shown after a liveness transition.
    #[must_use]
    pub fn for_liveness(kind: ChannelKind, is_on: bool) -> Self {
        match (kind, is_on) {
            (ChannelKind::Power, true) => Self::On,
            (ChannelKind::Power, false) => Self::Off,
            (_, true) => Self::Ready,
            (_, false) => Self::IsOff,
        }
    }

    /// Status shown after a command outcome, if it changes.
    fn for_outcome(command: &Command, outcome: &Outcome) -> Option<Self> {
        match outcome {
            Outcome::Failed(_) => Some(Self::Error),
            Outcome::Unavailable(_) => Some(Self::for_liveness(command.kind(), false)),
            Outcome::Success(_) => match command {
                Command::SetCurrentSource(id) => Some(Self::CurrentSource(id.clone())),
                Command::Key(_) => Some(Self::Ok),
                Command::PowerOn(on) => Some(Self::for_liveness(ChannelKind::Power, *on)),
                Command::PowerGet | Command::Read(_) => None,
            },
        }
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("Ready"),
            Self::IsOff => f.write_str("Is off"),
            Self::On => f.write_str("On"),
            Self::Off => f.write_str("Off"),
            Self::Ok => f.write_str("Ok"),
            Self::Error => f.write_str("Error!"),
            Self::CurrentSource(id) => write!(f, "CurrentSource: {id}"),
        }
    }
}

struct ChannelInner<A> {
    id: ConsumerId,
    kind: ChannelKind,
    session: Weak<SessionCore<A>>,
    dispatcher: Dispatcher<A>,
    status: watch::Sender<ChannelStatus>,
    outbox: mpsc::Sender<Message>,
}

impl<A: DeviceApi> ChannelInner<A> {
    fn is_attached(&self) -> bool {
        self.session
            .upgrade()
            .is_some_and(|core| core.registry.contains(self.id))
    }

    /// Queues a message on the outbox without waiting.
    fn push(&self, message: Message) {
        match self.outbox.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                tracing::debug!(consumer = %self.id, topic = %message.topic, "Outbox full, message dropped");
            }
            Err(TrySendError::Closed(message)) => {
                tracing::debug!(consumer = %self.id, topic = %message.topic, "Outbox closed, message dropped");
            }
        }
    }

    async fn input(&self, message: Message) -> Option<Message> {
        let command = match Command::parse(self.kind, &message.topic, &message.payload) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(
                    consumer = %self.id,
                    kind = %self.kind,
                    topic = %message.topic,
                    error = %e,
                    "Dropping command"
                );
                return None;
            }
        };

        if !self.is_attached() {
            tracing::warn!(consumer = %self.id, kind = %self.kind, "Consumer is not attached, dropping command");
            return None;
        }

        let outcome = self.dispatcher.dispatch(&command).await;
        if let Some(status) = ChannelStatus::for_outcome(&command, &outcome) {
            self.status.send_replace(status);
        }

        Some(message.reply(&outcome))
    }
}

/// A consumer node attached to a [`DeviceSession`].
///
/// A channel of a given [`ChannelKind`] accepts inbound [`Message`]s, turns
/// each valid one into exactly one reply, and tracks a [`ChannelStatus`].
/// Power channels also push `{topic: "on", payload: <bool>}` to the outbox on
/// every liveness transition.
///
/// The channel holds only a weak reference to the session. Dropping it
/// deregisters the consumer.
///
/// # Examples
///
/// ```no_run
/// use jointspace_lib::api::JointSpaceClient;
/// use jointspace_lib::{Channel, ChannelKind, DeviceSession, Message, PingProbe, SessionConfig};
/// use serde_json::json;
///
/// # async fn example() -> jointspace_lib::Result<()> {
/// let config = SessionConfig::new("192.168.1.40");
/// let api = JointSpaceClient::new(&config)?;
/// let session = DeviceSession::start(config, api, PingProbe::new())?;
///
/// let (keys, _outbox) = Channel::attach(&session, ChannelKind::Key);
/// if let Some(reply) = keys.input(Message::new("tv/key", json!("VolumeUp"))).await {
///     println!("{}", reply.payload);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Channel<A: DeviceApi> {
    inner: Arc<ChannelInner<A>>,
}

impl<A: DeviceApi> Channel<A> {
    /// Registers a new consumer of `kind` and returns it with its outbox.
    ///
    /// The outbox receives replies from [`spawn_input`](Self::spawn_input)
    /// and, for power channels, liveness messages. It holds at most
    /// [`OUTBOX_CAPACITY`] messages; the rest are dropped.
    #[must_use]
    pub fn attach(
        session: &DeviceSession<A>,
        kind: ChannelKind,
    ) -> (Self, mpsc::Receiver<Message>) {
        let id = ConsumerId::new();
        let (outbox, rx) = mpsc::channel(OUTBOX_CAPACITY);
        let (status, _) = watch::channel(ChannelStatus::Ready);

        let inner = Arc::new(ChannelInner {
            id,
            kind,
            session: Arc::downgrade(&session.core),
            dispatcher: session.dispatcher(),
            status,
            outbox,
        });

        let listener = Arc::downgrade(&inner);
        session.register(id, kind, move |is_on| {
            let Some(inner) = listener.upgrade() else {
                return;
            };
            inner
                .status
                .send_replace(ChannelStatus::for_liveness(kind, is_on));
            if kind == ChannelKind::Power {
                inner.push(Message::new(POWER_TOPIC, Value::Bool(is_on)));
            }
        });

        (Self { inner }, rx)
    }

    /// Returns the consumer identity.
    #[must_use]
    pub fn id(&self) -> ConsumerId {
        self.inner.id
    }

    /// Returns the channel kind.
    #[must_use]
    pub fn kind(&self) -> ChannelKind {
        self.inner.kind
    }

    /// Returns `true` while the channel is registered with a live session.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.is_attached()
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> ChannelStatus {
        self.inner.status.borrow().clone()
    }

    /// Subscribes to status changes.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<ChannelStatus> {
        self.inner.status.subscribe()
    }

    /// Validates and dispatches one inbound message.
    ///
    /// Returns the reply, or `None` if the message was dropped because its
    /// operation is unsupported, its payload is invalid, or the channel is
    /// not attached. Each drop is logged once at warn level.
    pub async fn input(&self, message: Message) -> Option<Message> {
        self.inner.input(message).await
    }

    /// Dispatches one inbound message on a new task.
    ///
    /// The reply is sent to the outbox only if the channel is still attached
    /// when the dispatch completes. The check and the send happen under the
    /// consumer's registration lock, so a concurrent [`close`](Self::close)
    /// either waits for the send or suppresses it.
    pub fn spawn_input(&self, message: Message) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let Some(reply) = inner.input(message).await else {
                return;
            };
            let sent = inner
                .session
                .upgrade()
                .and_then(|core| core.registry.while_attached(inner.id, || inner.push(reply)));
            if sent.is_none() {
                tracing::debug!(consumer = %inner.id, "Consumer detached, reply discarded");
            }
        })
    }

    /// Detaches the channel. `removed` marks a permanent deletion.
    pub fn close(&self, removed: bool) {
        let Some(core) = self.inner.session.upgrade() else {
            return;
        };
        let session = DeviceSession { core };
        if removed {
            session.remove(self.inner.id, self.inner.kind);
        } else {
            session.deregister(self.inner.id, self.inner.kind);
        }
    }
}

impl<A: DeviceApi> Drop for Channel<A> {
    fn drop(&mut self) {
        self.close(false);
    }
}

impl<A: DeviceApi> fmt::Debug for Channel<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("status", &*self.inner.status.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SystemAttribute;
    use crate::command::{ReadOperation, RemoteKey};
    use crate::error::ApiError;

    #[test]
    fn liveness_status_by_kind() {
        assert_eq!(ChannelStatus::for_liveness(ChannelKind::Power, true), ChannelStatus::On);
        assert_eq!(ChannelStatus::for_liveness(ChannelKind::Power, false), ChannelStatus::Off);
        assert_eq!(ChannelStatus::for_liveness(ChannelKind::Read, true), ChannelStatus::Ready);
        assert_eq!(ChannelStatus::for_liveness(ChannelKind::Key, false), ChannelStatus::IsOff);
    }

    #[test]
    fn outcome_status() {
        let write = Command::SetCurrentSource("hdmi1".into());
        assert_eq!(
            ChannelStatus::for_outcome(&write, &Outcome::Success(Value::Bool(true))),
            Some(ChannelStatus::CurrentSource("hdmi1".into()))
        );

        let key = Command::Key(RemoteKey::Mute);
        assert_eq!(
            ChannelStatus::for_outcome(&key, &Outcome::Failed(ApiError::Timeout(1))),
            Some(ChannelStatus::Error)
        );
        assert_eq!(
            ChannelStatus::for_outcome(&key, &Outcome::Unavailable(Value::Bool(false))),
            Some(ChannelStatus::IsOff)
        );

        let standby = Command::PowerOn(false);
        assert_eq!(
            ChannelStatus::for_outcome(&standby, &Outcome::Success(Value::Bool(true))),
            Some(ChannelStatus::Off)
        );

        let read = Command::Read(ReadOperation::SystemAttribute(SystemAttribute::Model));
        assert_eq!(
            ChannelStatus::for_outcome(&read, &Outcome::Success(Value::Null)),
            None
        );
    }

    #[test]
    fn status_text() {
        assert_eq!(ChannelStatus::IsOff.to_string(), "Is off");
        assert_eq!(ChannelStatus::Error.to_string(), "Error!");
        assert_eq!(
            ChannelStatus::CurrentSource("tv".into()).to_string(),
            "CurrentSource: tv"
        );
    }
}
