use serde::{Deserialize, Serialize};
use std::fmt;

/// Lead status (pipeline stage)
///
/// Stages are ordered as they appear on the board:
/// - New: freshly captured, not yet worked
/// - Contacted: first touch made
/// - Interested: prospect engaged
/// - Closed: deal won (terminal, locked for pipeline moves)
/// - Lost: deal lost (can be revived by moving it back)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    Contacted,
    Interested,
    Closed,
    Lost,
}

impl LeadStatus {
    /// All stages in board order
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Interested,
        LeadStatus::Closed,
        LeadStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Interested => "Interested",
            LeadStatus::Closed => "Closed",
            LeadStatus::Lost => "Lost",
        }
    }

    /// Parse a stage name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Some(LeadStatus::New),
            "contacted" => Some(LeadStatus::Contacted),
            "interested" => Some(LeadStatus::Interested),
            "closed" => Some(LeadStatus::Closed),
            "lost" => Some(LeadStatus::Lost),
            _ => None,
        }
    }

    /// Closed leads cannot be moved through the pipeline
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Stages that count toward an agent's active workload
    pub fn is_active(&self) -> bool {
        matches!(self, Self::New | Self::Contacted | Self::Interested)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owning agent as carried on a lead record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    pub id: i64,
    pub name: String,
}

/// Lead model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub source: String,
    pub status: LeadStatus,
    pub assigned_to: Option<AgentRef>,
    pub created_by: Option<i64>,
    pub created_ts: i64,
    pub updated_ts: i64,
}

impl Lead {
    pub fn is_unassigned(&self) -> bool {
        self.assigned_to.is_none()
    }

    /// Check whether the lead is owned by the given agent
    pub fn is_owned_by(&self, agent_id: i64) -> bool {
        self.assigned_to.as_ref().map(|a| a.id) == Some(agent_id)
    }
}

pub const DEFAULT_SOURCE: &str = "Manual";

/// Input for the add-lead flow. Status is always `New` on creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub created_by: Option<i64>,
}

impl NewLead {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            ..Self::default()
        }
    }

    /// Source tag to persist; blank or missing falls back to "Manual"
    pub fn source_or_default(&self) -> &str {
        match self.source.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => DEFAULT_SOURCE,
        }
    }
}

/// Partial update sent to the store. `None` leaves a field untouched;
/// `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub source: Option<String>,
    pub status: Option<LeadStatus>,
    pub assigned_to: Option<Option<i64>>,
}

impl LeadPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the fields this patch carries, for log and notice text
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() { fields.push("name"); }
        if self.phone.is_some() { fields.push("phone"); }
        if self.email.is_some() { fields.push("email"); }
        if self.company.is_some() { fields.push("company"); }
        if self.source.is_some() { fields.push("source"); }
        if self.status.is_some() { fields.push("status"); }
        if self.assigned_to.is_some() { fields.push("assigned_to"); }
        fields
    }
}
