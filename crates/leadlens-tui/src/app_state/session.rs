use std::collections::HashMap;

use leadlens_client::LeadBundle;

/// Outcome of one dispatch lifecycle for a single query key.
///
/// Transitions are monotonic within a lifecycle: `Pending` moves to exactly
/// one of `Success` or `Failure` and never back.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Pending,
    Success(LeadBundle),
    Failure(String),
}

impl DispatchOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, DispatchOutcome::Pending)
    }
}

/// Phase of the orchestration state machine.
///
/// `Armed` and `Dispatching` carry the query key snapshotted at submission
/// time. Results are keyed by that snapshot, not by whatever the query store
/// holds later, so a slow response to a superseded submission cannot clobber
/// the newest one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DispatchPhase {
    #[default]
    Idle,
    Armed {
        key: String,
    },
    Dispatching {
        key: String,
    },
    /// Transition marker only; the machine never rests here.
    Settled {
        key: String,
    },
}

/// The orchestration state machine.
///
/// Single-writer: only the state manager task mutates this. `armed` is set
/// true by an explicit submission and forced false by settlement of the
/// active lifecycle, which is what keeps a completed dispatch from silently
/// re-arming a new one.
#[derive(Debug, Default)]
pub struct LeadSession {
    armed: bool,
    phase: DispatchPhase,
    latest_key: Option<String>,
    outcomes: HashMap<String, DispatchOutcome>,
}

impl LeadSession {
    /// Idle -> Armed. Blank input (empty or whitespace-only) is a no-op and
    /// authorizes no network traffic.
    pub fn submit(&mut self, raw: &str) -> Option<String> {
        if raw.trim().is_empty() {
            return None;
        }
        // The wire contract accepts the raw string untrimmed.
        let key = raw.to_owned();
        self.armed = true;
        self.phase = DispatchPhase::Armed { key: key.clone() };
        Some(key)
    }

    /// Armed -> Dispatching. The only path that authorizes a network call.
    ///
    /// Marks the key's outcome `Pending` and makes it the latest key. An
    /// identical string resubmitted later dispatches again; there is no
    /// passive cache suppression.
    pub fn begin_dispatch(&mut self) -> Option<String> {
        let key = match (&self.phase, self.armed) {
            (DispatchPhase::Armed { key }, true) => key.clone(),
            _ => return None,
        };
        self.phase = DispatchPhase::Dispatching { key: key.clone() };
        self.outcomes.insert(key.clone(), DispatchOutcome::Pending);
        self.latest_key = Some(key.clone());
        Some(key)
    }

    /// Dispatching -> Settled -> Idle for the active lifecycle.
    ///
    /// A settlement for a superseded key records into that key's own entry
    /// and leaves the active lifecycle untouched.
    pub fn settle(&mut self, key: &str, outcome: DispatchOutcome) {
        debug_assert!(!outcome.is_pending(), "settlement must be final");
        self.outcomes.insert(key.to_owned(), outcome);
        match &self.phase {
            DispatchPhase::Dispatching { key: active } if active == key => {
                self.armed = false;
                self.phase = DispatchPhase::Settled { key: key.to_owned() };
                // Settled is administrative; return to Idle at once so a new
                // submission can start a fresh lifecycle.
                self.phase = DispatchPhase::Idle;
            }
            _ => {}
        }
    }

    pub fn armed(&self) -> bool {
        self.armed
    }

    pub fn is_idle(&self) -> bool {
        self.phase == DispatchPhase::Idle
    }

    pub fn phase(&self) -> &DispatchPhase {
        &self.phase
    }

    pub fn latest_key(&self) -> Option<&str> {
        self.latest_key.as_deref()
    }

    pub fn outcome(&self, key: &str) -> Option<&DispatchOutcome> {
        self.outcomes.get(key)
    }

    /// Outcome of the newest submission; the only entry the presenter reads.
    pub fn latest_outcome(&self) -> Option<&DispatchOutcome> {
        self.latest_key
            .as_deref()
            .and_then(|key| self.outcomes.get(key))
    }

    pub fn pending(&self) -> bool {
        matches!(self.latest_outcome(), Some(DispatchOutcome::Pending))
    }

    /// True once the newest submission's outcome is final.
    pub fn settled(&self) -> bool {
        matches!(self.latest_outcome(), Some(o) if !o.is_pending())
    }

    pub fn error(&self) -> Option<&str> {
        match self.latest_outcome() {
            Some(DispatchOutcome::Failure(msg)) => Some(msg),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&LeadBundle> {
        match self.latest_outcome() {
            Some(DispatchOutcome::Success(bundle)) => Some(bundle),
            _ => None,
        }
    }
}
