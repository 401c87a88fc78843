// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the jointSPACE broker.
//!
//! Errors are split by where they originate: the device API, the
//! reachability probe, command intake, and session configuration. None of
//! them is ever allowed to take down a shared [`DeviceSession`]; they are
//! resolved into per-request outcomes or log lines.
//!
//! [`DeviceSession`]: crate::DeviceSession

use thiserror::Error;

use crate::command::ChannelKind;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The device API call failed.
    #[error("device api error: {0}")]
    Api(#[from] ApiError),

    /// The session configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An inbound command could not be accepted.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// The reachability probe could not run.
    #[error("probe error: {0}")]
    Probe(#[from] ProbeError),
}

/// Errors returned by the device API collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The device answered with a non-success status.
    #[error("HTTP {code} - {reason}")]
    Status {
        /// The HTTP status code.
        code: u16,
        /// Canonical reason phrase.
        reason: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The response body was not valid JSON.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The configured device address is unusable.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The device API implementation panicked while handling the request.
    #[error("device request panicked: {0}")]
    Panicked(String),
}

/// Errors raised while launching or awaiting a reachability probe.
///
/// The prober treats every variant as an unreachable observation.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probe executable could not be spawned.
    #[error("failed to launch probe: {0}")]
    Launch(#[from] std::io::Error),

    /// The probe process did not exit in time.
    #[error("probe timed out after {0} ms")]
    Timeout(u64),
}

/// Errors raised during command intake.
///
/// These are logged and the command is dropped without an outbound message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The operation is not supported by the channel kind.
    #[error("invalid topic '{operation}' for {kind} channel")]
    UnsupportedOperation {
        /// Channel kind that received the command.
        kind: ChannelKind,
        /// The requested operation (last topic segment).
        operation: String,
    },

    /// The key name is not part of the remote-key vocabulary.
    #[error("invalid key '{0}'")]
    InvalidKey(String),

    /// The payload could not be interpreted for the operation.
    #[error("invalid payload for {operation}: {reason}")]
    InvalidPayload {
        /// The operation being processed.
        operation: String,
        /// Why the payload was rejected.
        reason: String,
    },
}

/// Errors in the device session configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No device host was configured.
    #[error("device host is missing")]
    MissingHost,

    /// The configured port is not usable.
    #[error("invalid port: {0}")]
    InvalidPort(u16),

    /// An interval or timeout was set to zero.
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_display() {
        let err = ApiError::Status {
            code: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 - Not Found");
    }

    #[test]
    fn error_from_config_error() {
        let err: Error = ConfigError::MissingHost.into();
        assert!(matches!(err, Error::Config(ConfigError::MissingHost)));
    }

    #[test]
    fn unsupported_operation_display() {
        let err = CommandError::UnsupportedOperation {
            kind: ChannelKind::Read,
            operation: "volume".to_string(),
        };
        assert_eq!(err.to_string(), "invalid topic 'volume' for read channel");
    }

    #[test]
    fn panicked_display() {
        assert_eq!(
            ApiError::Panicked("boom".to_string()).to_string(),
            "device request panicked: boom"
        );
    }

    #[test]
    fn probe_timeout_display() {
        assert_eq!(
            ProbeError::Timeout(5000).to_string(),
            "probe timed out after 5000 ms"
        );
    }
}
