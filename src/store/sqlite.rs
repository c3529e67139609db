use rusqlite::Connection;
use crate::error::StoreError;
use crate::models::{Agent, AgentRole, Lead, LeadPatch, NewLead};
use crate::repo::{AgentRepo, LeadRepo};
use crate::store::{LeadScope, LeadStore};

/// Lead store backed by a local SQLite database.
///
/// Batched operations run inside one transaction, so a missing lead or
/// agent leaves the database untouched. Concurrent writers are resolved by
/// SQLite's own locking: the last committed write wins.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn require_agent(&self, agent_id: i64) -> Result<(), StoreError> {
        match AgentRepo::get_by_id(&self.conn, agent_id)? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { entity: "agent", id: agent_id }),
        }
    }

    fn require_leads(conn: &Connection, ids: &[i64]) -> Result<(), StoreError> {
        match LeadRepo::missing_ids(conn, ids)?.first() {
            Some(&id) => Err(StoreError::NotFound { entity: "lead", id }),
            None => Ok(()),
        }
    }
}

fn reject_blank(value: Option<&str>, field: &str) -> Result<(), StoreError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(StoreError::Rejected(format!("{} is required", field))),
        _ => Ok(()),
    }
}

impl LeadStore for SqliteStore {
    fn list_leads(&mut self, scope: LeadScope) -> Result<Vec<Lead>, StoreError> {
        let leads = match scope {
            LeadScope::All => LeadRepo::list_all(&self.conn)?,
            LeadScope::AssignedTo(agent_id) => LeadRepo::list_assigned_to(&self.conn, agent_id)?,
        };
        Ok(leads)
    }

    fn create_lead(&mut self, lead: &NewLead) -> Result<Lead, StoreError> {
        reject_blank(Some(&lead.name), "name")?;
        reject_blank(Some(&lead.phone), "phone")?;
        if let Some(creator) = lead.created_by {
            self.require_agent(creator)?;
        }
        let created = LeadRepo::create(&self.conn, lead)?;
        log::info!("Created lead {} ({})", created.id, created.name);
        Ok(created)
    }

    fn update_lead(&mut self, id: i64, patch: &LeadPatch) -> Result<Lead, StoreError> {
        reject_blank(patch.name.as_deref(), "name")?;
        reject_blank(patch.phone.as_deref(), "phone")?;
        if let Some(Some(agent_id)) = patch.assigned_to {
            self.require_agent(agent_id)?;
        }
        let updated = LeadRepo::update(&self.conn, id, patch)?
            .ok_or(StoreError::NotFound { entity: "lead", id })?;
        log::debug!("Updated lead {} fields {:?}", id, patch.changed_fields());
        Ok(updated)
    }

    fn assign_leads(&mut self, ids: &[i64], agent_id: i64) -> Result<(), StoreError> {
        self.require_agent(agent_id)?;
        let tx = self.conn.unchecked_transaction()?;
        Self::require_leads(&tx, ids)?;
        let count = LeadRepo::assign_many(&tx, ids, agent_id)?;
        tx.commit()?;
        log::info!("Assigned {} lead(s) to agent {}", count, agent_id);
        Ok(())
    }

    fn delete_leads(&mut self, ids: &[i64]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        Self::require_leads(&tx, ids)?;
        let count = LeadRepo::delete_many(&tx, ids)?;
        tx.commit()?;
        log::info!("Deleted {} lead(s)", count);
        Ok(())
    }

    fn delete_lead(&mut self, id: i64) -> Result<(), StoreError> {
        if !LeadRepo::delete(&self.conn, id)? {
            return Err(StoreError::NotFound { entity: "lead", id });
        }
        log::info!("Deleted lead {}", id);
        Ok(())
    }

    fn list_agents(&mut self) -> Result<Vec<Agent>, StoreError> {
        Ok(AgentRepo::list_all(&self.conn)?)
    }

    fn create_agent(&mut self, name: &str, email: Option<&str>, role: AgentRole) -> Result<Agent, StoreError> {
        reject_blank(Some(name), "name")?;
        Ok(AgentRepo::create(&self.conn, name, email, role)?)
    }
}
