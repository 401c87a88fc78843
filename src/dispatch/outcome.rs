// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command outcomes and channel messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// The single terminal result of one dispatched command.
#[derive(Debug)]
pub enum Outcome {
    /// The command completed; the payload is the resolved value.
    Success(Value),
    /// The device was not live, so it was never contacted.
    Unavailable(Value),
    /// The device API call failed or timed out.
    Failed(ApiError),
}

impl Outcome {
    /// Returns the outbound payload. Failures carry the error message.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::Success(value) | Self::Unavailable(value) => value.clone(),
            Self::Failed(error) => Value::String(error.to_string()),
        }
    }

    /// Returns `true` for [`Outcome::Failed`].
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns `true` for [`Outcome::Unavailable`].
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// A message flowing into or out of a channel.
///
/// Outbound messages keep the inbound topic and replace the payload with the
/// outcome. `error` is set only for failed outcomes.
///
/// # Examples
///
/// ```
/// use jointspace_lib::Message;
/// use serde_json::json;
///
/// let msg = Message::new("tv/currentsource", json!(null));
/// assert_eq!(msg.operation(), "currentsource");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Slash-delimited topic; the last segment selects the operation.
    pub topic: String,
    /// Message payload.
    pub payload: Value,
    /// Error text for failed outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Message {
    /// Creates a message with no error.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            error: None,
        }
    }

    /// Returns the operation selected by the topic.
    #[must_use]
    pub fn operation(&self) -> &str {
        crate::command::topic_operation(&self.topic)
    }

    /// Builds the reply to this message from an outcome.
    #[must_use]
    pub fn reply(&self, outcome: &Outcome) -> Self {
        let error = match outcome {
            Outcome::Failed(e) => Some(e.to_string()),
            _ => None,
        };
        Self {
            topic: self.topic.clone(),
            payload: outcome.payload(),
            error,
        }
    }
}
