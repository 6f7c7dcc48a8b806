//! Per-interaction request tracking.
//!
//! DESIGN
//! ======
//! Every gateway request is issued against an [`Interaction`] and tagged with
//! the input value it was issued for. Two rules decide what a resolution may
//! do:
//!
//! - A response may render only if its tag equals the interaction's current
//!   value ("last request wins by value match", not by arrival order).
//! - Status settles only when the response belongs to the newest request.
//!   An older response for the same value renders but leaves the newer
//!   request `Pending`.
//!
//! Nothing is cancelled; superseded requests simply lose the right to settle.

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tracker_test;

use std::collections::HashMap;
use std::fmt;

/// An interactive surface that issues gateway requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Interaction {
    /// The prediction form.
    Prediction,
    CompareSelector,
    AnalysisSelector,
    /// The country catalog load.
    Catalog,
}

impl Interaction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prediction => "prediction",
            Self::CompareSelector => "compare",
            Self::AnalysisSelector => "analysis",
            Self::Catalog => "catalog",
        }
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Idle -> Pending -> {Success, Failed} -> Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Failed,
}

/// Handle of one issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    interaction: Interaction,
    seq: u64,
    tag: String,
}

impl RequestToken {
    #[must_use]
    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The input value the request was issued for.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

#[derive(Debug, Default)]
struct Lane {
    next_seq: u64,
    latest: Option<u64>,
    current: Option<String>,
    status: RequestStatus,
    last_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    lanes: HashMap<Interaction, Lane>,
}

impl RequestTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new request for `tag` and make `tag` the current value.
    pub fn issue(&mut self, interaction: Interaction, tag: impl Into<String>) -> RequestToken {
        let tag = tag.into();
        let lane = self.lanes.entry(interaction).or_default();
        lane.next_seq += 1;
        lane.latest = Some(lane.next_seq);
        lane.current = Some(tag.clone());
        lane.status = RequestStatus::Pending;
        lane.last_error = None;
        RequestToken { interaction, seq: lane.next_seq, tag }
    }

    /// Whether `token` was issued for the interaction's current value.
    #[must_use]
    pub fn matches_current(&self, token: &RequestToken) -> bool {
        self.lane(token.interaction)
            .and_then(|lane| lane.current.as_deref())
            .is_some_and(|current| current == token.tag)
    }

    /// Whether `token` is the newest request of its interaction.
    #[must_use]
    pub fn is_latest(&self, token: &RequestToken) -> bool {
        self.lane(token.interaction).is_some_and(|lane| lane.latest == Some(token.seq))
    }

    /// Settle `token` as succeeded. Returns `false`, changing nothing, when a
    /// newer request is outstanding.
    pub fn settle_success(&mut self, token: &RequestToken) -> bool {
        if !self.is_latest(token) {
            return false;
        }
        let lane = self.lanes.entry(token.interaction).or_default();
        lane.status = RequestStatus::Success;
        lane.last_error = None;
        true
    }

    /// Settle `token` as failed with `error`. Returns `false`, changing
    /// nothing, when a newer request is outstanding.
    pub fn settle_failure(&mut self, token: &RequestToken, error: impl Into<String>) -> bool {
        if !self.is_latest(token) {
            return false;
        }
        let lane = self.lanes.entry(token.interaction).or_default();
        lane.status = RequestStatus::Failed;
        lane.last_error = Some(error.into());
        true
    }

    #[must_use]
    pub fn status(&self, interaction: Interaction) -> RequestStatus {
        self.lane(interaction).map_or(RequestStatus::Idle, |lane| lane.status)
    }

    /// Error of the failed request, until acknowledged.
    #[must_use]
    pub fn last_error(&self, interaction: Interaction) -> Option<&str> {
        self.lane(interaction).and_then(|lane| lane.last_error.as_deref())
    }

    /// The value the interaction's newest request was issued for.
    #[must_use]
    pub fn current(&self, interaction: Interaction) -> Option<&str> {
        self.lane(interaction).and_then(|lane| lane.current.as_deref())
    }

    /// Return a settled interaction to `Idle`. Pending requests are untouched.
    pub fn acknowledge(&mut self, interaction: Interaction) {
        if let Some(lane) = self.lanes.get_mut(&interaction) {
            if matches!(lane.status, RequestStatus::Success | RequestStatus::Failed) {
                lane.status = RequestStatus::Idle;
                lane.last_error = None;
            }
        }
    }

    fn lane(&self, interaction: Interaction) -> Option<&Lane> {
        self.lanes.get(&interaction)
    }
}
