use serde::{Deserialize, Serialize};
use crate::models::AgentRef;

/// Agent role. Admins manage the team and are left off the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentRole {
    Agent,
    Admin,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Agent => "agent",
            AgentRole::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "agent" => Some(AgentRole::Agent),
            "admin" => Some(AgentRole::Admin),
            _ => None,
        }
    }
}

/// Agent model (a user account that can own leads)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub role: AgentRole,
    pub created_ts: i64,
}

impl Agent {
    pub fn to_ref(&self) -> AgentRef {
        AgentRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}
