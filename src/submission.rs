// Copyright 2025 Cowboy AI, LLC.

//! Submission pipeline and its status machine
//!
//! Submission is the only write against the shared collection. Its progress
//! is tracked by an explicit four-state machine; the machine owns the
//! success auto-clear timer and guards it with an epoch counter so a stale
//! timer can never clobber a newer transition.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::PortalError;
use crate::identity::SessionIdentity;
use crate::infrastructure::ReportStore;
use crate::keys::ReportKey;
use crate::schema::{Report, SubmittedReport};

/// How long a Success status is shown before clearing back to Idle
pub const SUCCESS_CLEAR_DELAY: Duration = Duration::from_secs(3);

/// Submission progress states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitStatus {
    /// No submission in progress
    #[default]
    Idle,
    /// A submission is in flight
    Submitting,
    /// The last submission was accepted
    Success,
    /// The last submission failed
    Error,
}

impl SubmitStatus {
    /// Get the name of this status for logging
    pub fn name(&self) -> &'static str {
        match self {
            SubmitStatus::Idle => "idle",
            SubmitStatus::Submitting => "submitting",
            SubmitStatus::Success => "success",
            SubmitStatus::Error => "error",
        }
    }

    /// Check if a transition to the target status is valid
    pub fn can_transition_to(&self, target: SubmitStatus) -> bool {
        matches!(
            (self, target),
            (SubmitStatus::Idle, SubmitStatus::Submitting)
                | (SubmitStatus::Submitting, SubmitStatus::Success)
                | (SubmitStatus::Submitting, SubmitStatus::Error)
                | (SubmitStatus::Success, SubmitStatus::Idle)
                | (SubmitStatus::Success, SubmitStatus::Submitting)
                | (SubmitStatus::Error, SubmitStatus::Submitting)
        )
    }

    /// Get all valid target statuses from this status
    pub fn valid_transitions(&self) -> Vec<SubmitStatus> {
        match self {
            SubmitStatus::Idle => vec![SubmitStatus::Submitting],
            SubmitStatus::Submitting => vec![SubmitStatus::Success, SubmitStatus::Error],
            SubmitStatus::Success => vec![SubmitStatus::Idle, SubmitStatus::Submitting],
            SubmitStatus::Error => vec![SubmitStatus::Submitting],
        }
    }
}

/// One recorded status transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    /// Status before the transition
    pub from: SubmitStatus,
    /// Status after the transition
    pub to: SubmitStatus,
    /// Unique id of this transition
    pub transition_id: Uuid,
    /// When the transition happened
    pub timestamp: DateTime<Utc>,
}

struct MachineState {
    current: SubmitStatus,
    /// Bumped on every transition; stale timers compare against it
    epoch: u64,
    history: Vec<StatusTransition>,
}

impl MachineState {
    fn record(&mut self, from: SubmitStatus, to: SubmitStatus) -> u64 {
        self.current = to;
        self.epoch += 1;
        self.history.push(StatusTransition {
            from,
            to,
            transition_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        });
        self.epoch
    }
}

struct Inner {
    state: Mutex<MachineState>,
    tx: watch::Sender<SubmitStatus>,
    clear_delay: Duration,
}

/// Submission status machine
///
/// Cloning shares the machine; all clones observe the same status. Entering
/// [`SubmitStatus::Success`] arms a timer that clears back to Idle after
/// [`SUCCESS_CLEAR_DELAY`] unless a newer transition supersedes it, so the
/// timer must be armed from within a Tokio runtime.
#[derive(Clone)]
pub struct StatusMachine {
    inner: Arc<Inner>,
}

impl StatusMachine {
    /// Machine starting at Idle with the standard auto-clear delay
    pub fn new() -> Self {
        Self::with_clear_delay(SUCCESS_CLEAR_DELAY)
    }

    fn with_clear_delay(clear_delay: Duration) -> Self {
        let (tx, _rx) = watch::channel(SubmitStatus::Idle);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(MachineState {
                    current: SubmitStatus::Idle,
                    epoch: 0,
                    history: Vec::new(),
                }),
                tx,
                clear_delay,
            }),
        }
    }

    /// The current status
    pub fn current(&self) -> SubmitStatus {
        self.inner.state.lock().unwrap().current
    }

    /// Subscribe to status changes
    pub fn subscribe(&self) -> watch::Receiver<SubmitStatus> {
        self.inner.tx.subscribe()
    }

    /// Every transition recorded so far, oldest first
    pub fn history(&self) -> Vec<StatusTransition> {
        self.inner.state.lock().unwrap().history.clone()
    }

    /// Apply a transition, rejecting targets the table does not allow
    pub fn transition_to(&self, to: SubmitStatus) -> Result<(), PortalError> {
        let epoch = {
            let mut state = self.inner.state.lock().unwrap();
            let from = state.current;
            if !from.can_transition_to(to) {
                return Err(PortalError::InvalidStatusTransition {
                    from: from.name().to_string(),
                    to: to.name().to_string(),
                });
            }
            state.record(from, to)
        };

        self.inner.tx.send_replace(to);
        if to == SubmitStatus::Success {
            self.arm_success_clear(epoch);
        }
        Ok(())
    }

    fn arm_success_clear(&self, epoch: u64) {
        let inner = Arc::clone(&self.inner);
        let delay = self.inner.clear_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let cleared = {
                let mut state = inner.state.lock().unwrap();
                // A newer transition owns the status now; let the timer lapse
                if state.epoch != epoch {
                    false
                } else {
                    state.record(SubmitStatus::Success, SubmitStatus::Idle);
                    true
                }
            };
            if cleared {
                inner.tx.send_replace(SubmitStatus::Idle);
            }
        });
    }
}

impl Default for StatusMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a submission was refused before reaching the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRefusal {
    /// Sign-in has not completed yet
    IdentityPending,
    /// The report has no department name to derive a key from
    MissingDepartmentName,
    /// Another submission is still in flight
    AlreadyInFlight,
}

impl SubmitRefusal {
    /// Operator-facing advisory text for this refusal
    pub fn advisory(&self) -> &'static str {
        match self {
            SubmitRefusal::IdentityPending => {
                "Authenticating... please wait a moment and try again."
            }
            SubmitRefusal::MissingDepartmentName => {
                "Please enter a Department Name in Basic Details before submitting."
            }
            SubmitRefusal::AlreadyInFlight => "A submission is already in progress.",
        }
    }
}

/// Outcome of a submission attempt
///
/// Refusals and store failures are ordinary outcomes, not errors; the caller
/// decides how to surface them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The report was accepted under the given key
    Submitted(ReportKey),
    /// The attempt never reached the store
    Refused(SubmitRefusal),
    /// The store rejected or lost the write
    Failed(String),
}

/// Submit a report to the shared collection
///
/// Guards run first and leave the status machine untouched: a missing
/// identity or an unnamed report refuses the attempt outright. Past the
/// guards the machine moves to Submitting, the document is stamped with
/// provenance, and the awaited store write decides Success or Error.
pub async fn submit_report(
    machine: &StatusMachine,
    store: &dyn ReportStore,
    identity: Option<&SessionIdentity>,
    report: &Report,
) -> SubmitOutcome {
    let Some(identity) = identity else {
        return SubmitOutcome::Refused(SubmitRefusal::IdentityPending);
    };

    if report.department_details.dept_name.is_empty() {
        return SubmitOutcome::Refused(SubmitRefusal::MissingDepartmentName);
    }

    if machine.transition_to(SubmitStatus::Submitting).is_err() {
        return SubmitOutcome::Refused(SubmitRefusal::AlreadyInFlight);
    }

    let key = ReportKey::derive(&report.department_details.dept_name);
    let document = SubmittedReport::stamp(report.clone(), &key, identity);

    match store.upsert(&key, &document).await {
        Ok(()) => {
            info!(%key, uid = %identity.uid, "Report submitted");
            if let Err(err) = machine.transition_to(SubmitStatus::Success) {
                warn!("Status machine out of step after submit: {err}");
            }
            SubmitOutcome::Submitted(key)
        }
        Err(err) => {
            error!(%key, "Report submission failed: {err}");
            if let Err(err) = machine.transition_to(SubmitStatus::Error) {
                warn!("Status machine out of step after failure: {err}");
            }
            SubmitOutcome::Failed(err.to_string())
        }
    }
}
