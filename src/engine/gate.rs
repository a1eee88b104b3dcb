// src/engine/gate.rs

//! Admission gate: the bounded set of jobs that are currently live.
//!
//! Admission checks the set size and inserts the new member under one lock,
//! so two acquirers can never both see the last free slot. Every release
//! wakes one waiting acquirer.
//!
//! Each member carries a [`KillSwitch`] so the controller can force-terminate
//! live jobs without owning their process handles (the supervisors do).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::{oneshot, Notify};
use tracing::debug;

use crate::engine::JobIndex;

/// Sending half of a job's termination request.
#[derive(Debug)]
pub struct KillSwitch {
    tx: Option<oneshot::Sender<()>>,
}

/// Receiving half, owned by the job's supervisor.
pub type KillSignal = oneshot::Receiver<()>;

/// Create a connected kill switch / signal pair.
pub fn kill_switch() -> (KillSwitch, KillSignal) {
    let (tx, rx) = oneshot::channel();
    (KillSwitch { tx: Some(tx) }, rx)
}

impl KillSwitch {
    /// Request termination. Returns `false` if the switch was already fired
    /// or the supervisor is no longer listening.
    pub fn fire(&mut self) -> bool {
        match self.tx.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

#[derive(Debug, Default)]
struct RunningSet {
    members: HashMap<JobIndex, KillSwitch>,
    /// Largest size the set has reached.
    peak: usize,
}

#[derive(Debug)]
pub struct AdmissionGate {
    limit: usize,
    running: Mutex<RunningSet>,
    released: Notify,
    /// Number of admissions that found the gate full and had to wait.
    blocked: AtomicUsize,
}

impl AdmissionGate {
    /// Create a gate admitting at most `limit` live jobs.
    ///
    /// `limit` is clamped to at least 1; a zero-slot gate would never admit.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            running: Mutex::new(RunningSet::default()),
            released: Notify::new(),
            blocked: AtomicUsize::new(0),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Wait for a free slot and admit job `index` into the running set.
    pub async fn acquire(&self, index: JobIndex, kill: KillSwitch) {
        let mut kill = kill;
        let mut waited = false;

        loop {
            match self.try_admit(index, kill) {
                Ok(()) => return,
                Err(returned) => kill = returned,
            }

            if !waited {
                waited = true;
                self.blocked.fetch_add(1, Ordering::SeqCst);
                debug!(job = index, limit = self.limit, "admission gate full; waiting for a slot");
            }

            // notify_one stores a permit, so a release that lands between the
            // failed check and this await is not lost.
            self.released.notified().await;
        }
    }

    /// Admit job `index` if a slot is free, otherwise hand the kill switch
    /// back to the caller.
    pub fn try_admit(&self, index: JobIndex, kill: KillSwitch) -> Result<(), KillSwitch> {
        let mut set = self.lock();
        if set.members.len() >= self.limit {
            return Err(kill);
        }

        set.members.insert(index, kill);
        set.peak = set.peak.max(set.members.len());
        debug!(job = index, running = set.members.len(), "job admitted");
        Ok(())
    }

    /// Remove job `index` from the running set and wake one waiter.
    ///
    /// Returns `false` if the job was not a member.
    pub fn release(&self, index: JobIndex) -> bool {
        let removed = self.lock().members.remove(&index).is_some();
        if removed {
            debug!(job = index, "job released its slot");
            self.released.notify_one();
        }
        removed
    }

    /// Ask a live job to terminate. The job stays a member until its
    /// supervisor releases it.
    pub fn terminate(&self, index: JobIndex) -> bool {
        match self.lock().members.get_mut(&index) {
            Some(kill) => kill.fire(),
            None => false,
        }
    }

    /// Ask every live job to terminate; returns how many requests were
    /// delivered.
    pub fn terminate_all(&self) -> usize {
        let mut set = self.lock();
        set.members
            .values_mut()
            .map(KillSwitch::fire)
            .filter(|delivered| *delivered)
            .count()
    }

    pub fn len(&self) -> usize {
        self.lock().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_running(&self, index: JobIndex) -> bool {
        self.lock().members.contains_key(&index)
    }

    /// Largest number of simultaneously admitted jobs so far.
    pub fn peak(&self) -> usize {
        self.lock().peak
    }

    pub fn blocked_admissions(&self) -> usize {
        self.blocked.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, RunningSet> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
