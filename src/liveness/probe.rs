// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reachability probes.
//!
//! A [`ReachabilityProbe`] performs one out-of-band check against the device
//! address. [`PingProbe`] shells out to the platform `ping` with a single
//! attempt; only its argument list differs between platforms.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::config::millis;
use crate::error::ProbeError;

use super::Reachability;

/// Extra time granted to the probe process beyond its own deadline.
const PROBE_GRACE: Duration = Duration::from_secs(1);

/// A single-shot reachability check.
///
/// Implementations must make exactly one attempt and must not outlive
/// `timeout` by more than a small grace period.
pub trait ReachabilityProbe: Send + Sync + 'static {
    /// Probes `host` once.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] if the probe could not be launched or did not
    /// finish in time. Callers treat errors as unreachable.
    fn probe(
        &self,
        host: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<Reachability, ProbeError>> + Send;
}

/// ICMP echo probe backed by the system `ping` executable.
///
/// # Examples
///
/// ```no_run
/// use jointspace_lib::liveness::{PingProbe, ReachabilityProbe};
/// use std::time::Duration;
///
/// # async fn example() {
/// let probe = PingProbe::new();
/// let result = probe.probe("192.168.1.40", Duration::from_secs(5)).await;
/// println!("{result:?}");
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PingProbe {
    program: String,
}

impl PingProbe {
    /// Creates a probe that runs `ping` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "ping".to_string(),
        }
    }

    /// Uses a different executable, e.g. an absolute path to `ping`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Returns the executable name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for PingProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ReachabilityProbe for PingProbe {
    async fn probe(&self, host: &str, timeout: Duration) -> Result<Reachability, ProbeError> {
        let mut child = Command::new(&self.program)
            .args(ping_args(host, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        match tokio::time::timeout(timeout + PROBE_GRACE, child.wait()).await {
            Ok(status) => Ok(Reachability::from(status?.success())),
            Err(_) => Err(ProbeError::Timeout(millis(timeout))),
        }
    }
}


/// Whole seconds, rounded up, never below one.
#[cfg_attr(target_os = "windows", allow(dead_code))]
fn whole_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    secs.max(1)
}

#[cfg(target_os = "windows")]
fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
    vec![
        "-n".to_string(),
        "1".to_string(),
        "-w".to_string(),
        millis(timeout).max(1).to_string(),
        host.to_string(),
    ]
}

#[cfg(any(target_os = "macos", target_os = "freebsd"))]
fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
    vec![
        "-c".to_string(),
        "1".to_string(),
        "-t".to_string(),
        whole_secs(timeout).to_string(),
        host.to_string(),
    ]
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "freebsd")))]
fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
    vec![
        "-c".to_string(),
        "1".to_string(),
        "-W".to_string(),
        whole_secs(timeout).to_string(),
        host.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_secs_rounds_up() {
        assert_eq!(whole_secs(Duration::from_millis(4500)), 5);
        assert_eq!(whole_secs(Duration::from_secs(5)), 5);
        assert_eq!(whole_secs(Duration::from_millis(10)), 1);
        assert_eq!(whole_secs(Duration::ZERO), 1);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn linux_args_single_attempt() {
        let args = ping_args("192.168.1.40", Duration::from_secs(5));
        assert_eq!(args, vec!["-c", "1", "-W", "5", "192.168.1.40"]);
    }

    #[test]
    fn default_program_is_ping() {
        assert_eq!(PingProbe::default().program(), "ping");
    }

    #[tokio::test]
    async fn missing_executable_is_launch_error() {
        let probe = PingProbe::new().with_program("/nonexistent/jointspace-ping");
        let result = probe.probe("127.0.0.1", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(ProbeError::Launch(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_is_reachable() {
        let probe = PingProbe::new().with_program("true");
        let result = probe.probe("127.0.0.1", Duration::from_secs(1)).await;
        assert_eq!(result.unwrap(), Reachability::Reachable);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_unreachable() {
        let probe = PingProbe::new().with_program("false");
        let result = probe.probe("127.0.0.1", Duration::from_secs(1)).await;
        assert_eq!(result.unwrap(), Reachability::Unreachable);
    }
}
