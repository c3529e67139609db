//! Boundary to the authoritative lead store
//!
//! The pipeline engine never owns persistence. Everything it needs from the
//! backing store goes through [`LeadStore`], and every call is treated as
//! fallible and all-or-nothing. Owners are normalized to [`AgentRef`] before
//! they cross this boundary.
//!
//! [`AgentRef`]: crate::models::AgentRef

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::models::{Agent, AgentRole, Lead, LeadPatch, NewLead};

/// Which leads a listing should include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadScope {
    All,
    AssignedTo(i64),
}

pub trait LeadStore {
    /// List leads ordered by id
    fn list_leads(&mut self, scope: LeadScope) -> Result<Vec<Lead>, StoreError>;

    /// Create a lead; the store forces status `New` and assigns the id
    fn create_lead(&mut self, lead: &NewLead) -> Result<Lead, StoreError>;

    /// Apply a partial update and return the stored record
    fn update_lead(&mut self, id: i64, patch: &LeadPatch) -> Result<Lead, StoreError>;

    /// Assign every listed lead to one agent, all or nothing
    fn assign_leads(&mut self, ids: &[i64], agent_id: i64) -> Result<(), StoreError>;

    /// Delete every listed lead, all or nothing
    fn delete_leads(&mut self, ids: &[i64]) -> Result<(), StoreError>;

    fn delete_lead(&mut self, id: i64) -> Result<(), StoreError>;

    fn list_agents(&mut self) -> Result<Vec<Agent>, StoreError>;

    fn create_agent(&mut self, name: &str, email: Option<&str>, role: AgentRole) -> Result<Agent, StoreError>;
}
