//! Stabilization runs a daemon to repair the ring under churn.
//!
//! Every tick executes, in order: `stabilize` (verify and re-learn the
//! successor), `fix_fingers` (refresh one finger), `fix_successor_list`
//! (pull the successor's list), `fix_predecessor` (drop a dead
//! predecessor). The order matters: fixing fingers against a stale
//! successor wastes the tick. No error escapes the loop; a failing phase
//! logs and the next tick retries.

use std::sync::Arc;
use std::time::Duration;

use super::did::between;
use super::did::finger_start;
use super::types::Chord;
use crate::dht::Ring;
use crate::error::Error;
use crate::error::Result;

/// The stabilization runner.
#[derive(Clone)]
pub struct Stabilizer {
    ring: Arc<Ring>,
    interval: Duration,
}

impl Stabilizer {
    /// Create a new stabilization runner.
    pub fn new(ring: Arc<Ring>, interval: Duration) -> Self {
        Self { ring, interval }
    }

    /// Tick period of the runner.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one full maintenance cycle. A node that is not an active ring
    /// member has nothing to maintain.
    pub async fn run_cycle(&self) -> Result<()> {
        if !self.ring.is_active() {
            return Ok(());
        }
        tracing::debug!("STABILIZATION stabilize start");
        if let Err(e) = self.stabilize().await {
            tracing::error!("[stabilize] failed on stabilize {:?}", e);
        }
        tracing::debug!("STABILIZATION stabilize end");
        tracing::debug!("STABILIZATION fix_fingers start");
        if let Err(e) = self.fix_fingers().await {
            tracing::error!("[stabilize] failed on fix_fingers {:?}", e);
        }
        tracing::debug!("STABILIZATION fix_fingers end");
        tracing::debug!("STABILIZATION fix_successor_list start");
        if let Err(e) = self.fix_successor_list().await {
            tracing::error!("[stabilize] failed on fix_successor_list {:?}", e);
        }
        tracing::debug!("STABILIZATION fix_successor_list end");
        tracing::debug!("STABILIZATION fix_predecessor start");
        if let Err(e) = self.fix_predecessor().await {
            tracing::error!("[stabilize] failed on fix_predecessor {:?}", e);
        }
        tracing::debug!("STABILIZATION fix_predecessor end");
        Ok(())
    }

    /// Verify the successor is alive, failing over along the successor
    /// list and finger table when it is not, then learn a closer successor
    /// from it and announce ourselves as its predecessor.
    pub async fn stabilize(&self) -> Result<()> {
        // Phase A: make sure the successor pointer references a live node.
        let succ = loop {
            let Ok(succ) = self.ring.successor() else {
                return Ok(());
            };
            if self.ring.probe(&succ).await {
                break succ;
            }
            tracing::warn!("successor {} is dead, failing over", succ);
            let next_head = {
                let mut successors = self.ring.lock_successors()?;
                successors.pop_head();
                successors.head()
            };
            if let Some(head) = next_head {
                self.ring.set_successor(head)?;
                continue;
            }

            // Successor list exhausted: fall back to the farthest live
            // finger.
            let candidates = self.ring.lock_finger()?.distinct_desc();
            let mut found = None;
            for peer in candidates {
                if self.ring.probe(&peer).await {
                    found = Some(peer);
                    break;
                }
            }
            match found {
                Some(peer) => {
                    tracing::info!("recovered successor {} from finger table", peer);
                    self.ring.set_successor(peer)?;
                }
                None => {
                    tracing::warn!("{} has no live peer left, going inactive", self.ring.info);
                    self.ring.deactivate();
                    return Err(Error::Isolated);
                }
            }
        };

        // Phase B: the successor's predecessor may sit between us; adopt
        // it, then tell the successor about us.
        let candidate = if succ.did == self.ring.info.did {
            self.ring.lock_predecessor()?.clone()
        } else {
            match self.ring.client().predecessor(&succ.uri).await {
                Ok(candidate) => candidate,
                Err(Error::Unreachable) => return Ok(()),
                Err(e) => return Err(e),
            }
        };
        if let Some(x) = candidate {
            if between(x.did, self.ring.info.did, succ.did) && self.ring.probe(&x).await {
                self.ring.set_successor(x)?;
            }
        }

        let succ = self.ring.successor()?;
        if succ.did == self.ring.info.did {
            self.ring.notify(self.ring.info.clone())?;
            return Ok(());
        }
        if let Err(e) = self
            .ring
            .client()
            .notify(&succ.uri, self.ring.info.clone())
            .await
        {
            tracing::debug!("notify to successor {} failed: {}", succ, e);
        }
        Ok(())
    }

    /// Refresh one finger per tick, round-robin. The cursor advances even
    /// when the lookup fails, so a dead region cannot starve the sweep.
    pub async fn fix_fingers(&self) -> Result<()> {
        let next = self.ring.lock_finger()?.advance_fix_cursor();
        let start = finger_start(self.ring.info.did, next);
        match self.ring.find_successor(start).await {
            Ok(peer) => {
                self.ring.lock_finger()?.set(next, peer);
                Ok(())
            }
            Err(e) => {
                tracing::debug!("fix_fingers lookup for slot {} failed: {}", next, e);
                Err(e)
            }
        }
    }

    /// Pull the successor's successor list, prepend the successor itself,
    /// and adopt it. A transport failure leaves the list alone.
    pub async fn fix_successor_list(&self) -> Result<()> {
        let succ = self.ring.successor()?;
        if succ.did == self.ring.info.did {
            return Ok(());
        }
        match self.ring.client().successor_list(&succ.uri).await {
            Ok(remote) => {
                let mut list = vec![succ];
                list.extend(remote);
                self.ring.lock_successors()?.replace(list);
                Ok(())
            }
            Err(Error::Unreachable) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Clear the predecessor pointer when it stops answering; a future
    /// notify re-fills it.
    pub async fn fix_predecessor(&self) -> Result<()> {
        let Some(pred) = self.ring.lock_predecessor()?.clone() else {
            return Ok(());
        };
        if !self.ring.probe(&pred).await {
            tracing::info!("predecessor {} is dead, clearing", pred);
            *self.ring.lock_predecessor()? = None;
        }
        Ok(())
    }
}

mod runner {
    use tokio::time::interval;
    use tokio::time::MissedTickBehavior;

    use super::*;

    impl Stabilizer {
        /// Run maintenance until the node goes inactive, whether by a
        /// graceful leave or by isolation. A cycle that overruns its slot
        /// delays the next tick instead of bursting to catch up.
        pub async fn wait(self: Arc<Self>) {
            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick of a fresh interval fires immediately; a new
            // node gets one full period before maintenance starts
            ticker.tick().await;
            while self.ring.is_active() {
                ticker.tick().await;
                if let Err(e) = self.run_cycle().await {
                    tracing::error!("maintenance cycle error: {:?}", e);
                }
            }
            tracing::info!("{} inactive, maintenance loop done", self.ring.info);
        }
    }
}
