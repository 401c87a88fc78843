// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-interval probe loop.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{Reachability, ReachabilityProbe};

/// Runs a [`ReachabilityProbe`] against one host on a fixed interval.
///
/// The prober only reduces each probe to a [`Reachability`]; deciding whether
/// that observation is a transition is up to the observer.
#[derive(Debug)]
pub(crate) struct Prober<P> {
    probe: P,
    host: String,
    interval: Duration,
    timeout: Duration,
}

impl<P: ReachabilityProbe> Prober<P> {
    pub(crate) fn new(probe: P, host: impl Into<String>, interval: Duration, timeout: Duration) -> Self {
        Self {
            probe,
            host: host.into(),
            interval,
            timeout,
        }
    }

    /// Runs one probe. Launch failures and timeouts count as unreachable.
    pub(crate) async fn observe_once(&self) -> Reachability {
        match self.probe.probe(&self.host, self.timeout).await {
            Ok(observed) => observed,
            Err(e) => {
                tracing::warn!(host = %self.host, error = %e, "Reachability probe failed");
                Reachability::Unreachable
            }
        }
    }

    /// Spawns the probe loop.
    ///
    /// The first probe runs immediately. The loop ends when `observer` returns
    /// [`ControlFlow::Break`], or when the returned handle is aborted.
    pub(crate) fn spawn<F>(self, mut observer: F) -> JoinHandle<()>
    where
        F: FnMut(Reachability) -> ControlFlow<()> + Send + 'static,
    {
        tokio::spawn(async move {
            tracing::debug!(host = %self.host, interval = ?self.interval, "Starting prober");

            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let observed = self.observe_once().await;
                if observer(observed).is_break() {
                    break;
                }
            }

            tracing::debug!(host = %self.host, "Prober stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::error::ProbeError;

    /// Replays a fixed list of results, then reports unreachable.
    struct ScriptedProbe {
        script: Mutex<VecDeque<Result<Reachability, ProbeError>>>,
    }

    impl ScriptedProbe {
        fn new(script: Vec<Result<Reachability, ProbeError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
            }
        }
    }

    impl ReachabilityProbe for ScriptedProbe {
        async fn probe(&self, _host: &str, _timeout: Duration) -> Result<Reachability, ProbeError> {
            self.script
                .lock()
                .pop_front()
                .unwrap_or(Ok(Reachability::Unreachable))
        }
    }

    #[tokio::test]
    async fn launch_failure_counts_as_unreachable() {
        let probe = ScriptedProbe::new(vec![Err(ProbeError::Launch(std::io::Error::other(
            "not permitted",
        )))]);
        let prober = Prober::new(probe, "tv", Duration::from_secs(3), Duration::from_secs(5));

        assert_eq!(prober.observe_once().await, Reachability::Unreachable);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_keeps_running_after_failures() {
        let probe = ScriptedProbe::new(vec![
            Err(ProbeError::Timeout(5000)),
            Ok(Reachability::Reachable),
            Ok(Reachability::Reachable),
        ]);
        let prober = Prober::new(probe, "tv", Duration::from_secs(3), Duration::from_secs(5));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handle = prober.spawn(move |observed| {
            let mut seen = sink.lock();
            seen.push(observed);
            if seen.len() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        handle.await.unwrap();

        assert_eq!(
            *seen.lock(),
            vec![
                Reachability::Unreachable,
                Reachability::Reachable,
                Reachability::Reachable
            ]
        );
    }
}
