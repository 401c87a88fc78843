// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commands accepted from consumer channels.
//!
//! Each channel kind supports a fixed set of logical operations, selected by
//! the last segment of a slash-delimited topic (case-insensitive). Key
//! channels ignore the topic and take the key name from the payload. The
//! power `off` operation is `on` with a `false` payload; its own payload is
//! ignored.
//!
//! | Channel | Operations |
//! |---------|------------|
//! | read    | `sources`, `currentsource`, `system`, `systemcountry`, `systemname`, `systemmenulanguage`, `systemmodel`, `systemserialnumber`, `systemsoftwareversion` |
//! | write   | `currentsource` |
//! | power   | `on`, `off`, `get` |
//! | key     | payload is a [`RemoteKey`] name |
//!
//! # Examples
//!
//! ```
//! use jointspace_lib::{ChannelKind, Command};
//! use serde_json::json;
//!
//! let cmd = Command::parse(ChannelKind::Power, "living/tv/ON", &json!("off")).unwrap();
//! assert_eq!(cmd, Command::PowerOn(false));
//!
//! assert!(Command::parse(ChannelKind::Read, "tv/volume", &json!(null)).is_err());
//! ```

mod key;
mod value;

pub use key::RemoteKey;

use std::fmt;

use serde_json::Value;

use crate::api::SystemAttribute;
use crate::error::CommandError;

/// Delimiter between topic segments.
pub const TOPIC_DELIMITER: char = '/';

/// The kind of a consumer channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Reads sources and system information.
    Read,
    /// Changes the current source.
    Write,
    /// Reports and controls power.
    Power,
    /// Sends remote-control keys.
    Key,
}

impl ChannelKind {
    /// Returns the lowercase channel name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Power => "power",
            Self::Key => "key",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A read-channel query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOperation {
    /// List of input sources.
    Sources,
    /// Identifier of the current source.
    CurrentSource,
    /// Full system information object.
    System,
    /// A single scalar system attribute.
    SystemAttribute(SystemAttribute),
}

impl ReadOperation {
    fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        let op = match upper.as_str() {
            "SOURCES" => Self::Sources,
            "CURRENTSOURCE" => Self::CurrentSource,
            "SYSTEM" => Self::System,
            other => {
                let attribute = other.strip_prefix("SYSTEM")?;
                SystemAttribute::ALL
                    .into_iter()
                    .find(|a| a.as_str().eq_ignore_ascii_case(attribute))
                    .map(Self::SystemAttribute)?
            }
        };
        Some(op)
    }
}

/// A validated command, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read-channel query.
    Read(ReadOperation),
    /// Select an input source.
    SetCurrentSource(String),
    /// Request the power state; `false` puts the device in standby.
    PowerOn(bool),
    /// Report current liveness.
    PowerGet,
    /// Send a remote-control key.
    Key(RemoteKey),
}

impl Command {
    /// Validates an inbound message for a channel kind.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the operation is not supported by `kind`,
    /// the key is not in the vocabulary, or the payload cannot be coerced.
    pub fn parse(kind: ChannelKind, topic: &str, payload: &Value) -> Result<Self, CommandError> {
        let operation = topic_operation(topic);
        let unsupported = || CommandError::UnsupportedOperation {
            kind,
            operation: operation.to_string(),
        };

        match kind {
            ChannelKind::Read => ReadOperation::from_name(operation)
                .map(Self::Read)
                .ok_or_else(unsupported),
            ChannelKind::Write => {
                if !operation.eq_ignore_ascii_case("currentsource") {
                    return Err(unsupported());
                }
                value::coerce_source_id(payload)
                    .map(Self::SetCurrentSource)
                    .ok_or_else(|| CommandError::InvalidPayload {
                        operation: operation.to_string(),
                        reason: format!("expected a source id, got {payload}"),
                    })
            }
            ChannelKind::Power => {
                if operation.eq_ignore_ascii_case("get") {
                    Ok(Self::PowerGet)
                } else if operation.eq_ignore_ascii_case("off") {
                    Ok(Self::PowerOn(false))
                } else if operation.eq_ignore_ascii_case("on") {
                    value::coerce_bool(payload)
                        .map(Self::PowerOn)
                        .ok_or_else(|| CommandError::InvalidPayload {
                            operation: operation.to_string(),
                            reason: format!("expected a boolean, got {payload}"),
                        })
                } else {
                    Err(unsupported())
                }
            }
            ChannelKind::Key => match payload {
                Value::String(name) => name.parse().map(Self::Key),
                other => Err(CommandError::InvalidKey(other.to_string())),
            },
        }
    }

    /// Returns the channel kind this command belongs to.
    #[must_use]
    pub fn kind(&self) -> ChannelKind {
        match self {
            Self::Read(_) => ChannelKind::Read,
            Self::SetCurrentSource(_) => ChannelKind::Write,
            Self::PowerOn(_) | Self::PowerGet => ChannelKind::Power,
            Self::Key(_) => ChannelKind::Key,
        }
    }
}

/// Returns the last segment of a slash-delimited topic.
///
/// ```
/// use jointspace_lib::command::topic_operation;
///
/// assert_eq!(topic_operation("home/tv/CurrentSource"), "CurrentSource");
/// assert_eq!(topic_operation("sources"), "sources");
/// ```
#[must_use]
pub fn topic_operation(topic: &str) -> &str {
    topic.rsplit(TOPIC_DELIMITER).next().unwrap_or(topic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn read_operations_are_case_insensitive() {
        assert_eq!(
            Command::parse(ChannelKind::Read, "a/b/Sources", &Value::Null),
            Ok(Command::Read(ReadOperation::Sources))
        );
        assert_eq!(
            Command::parse(ChannelKind::Read, "currentSOURCE", &Value::Null),
            Ok(Command::Read(ReadOperation::CurrentSource))
        );
        assert_eq!(
            Command::parse(ChannelKind::Read, "tv/system", &Value::Null),
            Ok(Command::Read(ReadOperation::System))
        );
    }

    #[test]
    fn read_system_attributes() {
        let cases = [
            ("systemcountry", SystemAttribute::Country),
            ("SystemName", SystemAttribute::Name),
            ("SYSTEMMENULANGUAGE", SystemAttribute::MenuLanguage),
            ("systemmodel", SystemAttribute::Model),
            ("systemserialnumber", SystemAttribute::SerialNumber),
            ("systemsoftwareversion", SystemAttribute::SoftwareVersion),
        ];
        for (topic, attribute) in cases {
            assert_eq!(
                Command::parse(ChannelKind::Read, topic, &Value::Null),
                Ok(Command::Read(ReadOperation::SystemAttribute(attribute))),
                "topic {topic}"
            );
        }
    }

    #[test]
    fn read_rejects_unknown_operation() {
        assert_eq!(
            Command::parse(ChannelKind::Read, "tv/systemvolume", &Value::Null),
            Err(CommandError::UnsupportedOperation {
                kind: ChannelKind::Read,
                operation: "systemvolume".to_string(),
            })
        );
    }

    #[test]
    fn write_current_source() {
        assert_eq!(
            Command::parse(ChannelKind::Write, "tv/currentsource", &json!("hdmi2")),
            Ok(Command::SetCurrentSource("hdmi2".to_string()))
        );
    }

    #[test]
    fn write_requires_source_id() {
        let result = Command::parse(ChannelKind::Write, "tv/currentsource", &json!({}));
        assert!(matches!(result, Err(CommandError::InvalidPayload { .. })));
    }

    #[test]
    fn write_rejects_read_operations() {
        let result = Command::parse(ChannelKind::Write, "tv/sources", &json!("x"));
        assert!(matches!(
            result,
            Err(CommandError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn power_operations() {
        assert_eq!(
            Command::parse(ChannelKind::Power, "tv/on", &json!(true)),
            Ok(Command::PowerOn(true))
        );
        assert_eq!(
            Command::parse(ChannelKind::Power, "tv/On", &json!("OFF")),
            Ok(Command::PowerOn(false))
        );
        assert_eq!(
            Command::parse(ChannelKind::Power, "tv/GET", &Value::Null),
            Ok(Command::PowerGet)
        );
    }

    #[test]
    fn power_rejects_uncoercible_payload() {
        let result = Command::parse(ChannelKind::Power, "on", &json!("later"));
        assert!(matches!(result, Err(CommandError::InvalidPayload { .. })));
    }

    #[test]
    fn power_off_topic_is_standby_request() {
        assert_eq!(
            Command::parse(ChannelKind::Power, "living/tv/off", &Value::Null),
            Ok(Command::PowerOn(false))
        );
        assert_eq!(
            Command::parse(ChannelKind::Power, "OFF", &json!(true)),
            Ok(Command::PowerOn(false))
        );
    }

    #[test]
    fn power_rejects_unknown_operation() {
        let result = Command::parse(ChannelKind::Power, "toggle", &json!(true));
        assert!(matches!(
            result,
            Err(CommandError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn key_takes_name_from_payload() {
        assert_eq!(
            Command::parse(ChannelKind::Key, "anything", &json!("VolumeUp")),
            Ok(Command::Key(RemoteKey::VolumeUp))
        );
    }

    #[test]
    fn key_rejects_non_string_and_unknown() {
        assert!(matches!(
            Command::parse(ChannelKind::Key, "", &json!(42)),
            Err(CommandError::InvalidKey(_))
        ));
        assert_eq!(
            Command::parse(ChannelKind::Key, "", &json!("Standby")),
            Err(CommandError::InvalidKey("Standby".to_string()))
        );
    }

    #[test]
    fn command_kind() {
        assert_eq!(Command::PowerGet.kind(), ChannelKind::Power);
        assert_eq!(
            Command::Read(ReadOperation::System).kind(),
            ChannelKind::Read
        );
        assert_eq!(Command::Key(RemoteKey::Mute).kind(), ChannelKind::Key);
    }

    #[test]
    fn topic_operation_takes_last_segment() {
        assert_eq!(topic_operation("a/b/c"), "c");
        assert_eq!(topic_operation("trailing/"), "");
        assert_eq!(topic_operation(""), "");
    }
}
