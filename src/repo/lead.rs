use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{AgentRef, Lead, LeadPatch, LeadStatus, NewLead};
use anyhow::{Context, Result};

/// Lead columns joined with the owning agent's name, so every lead leaves
/// the repository with a canonical `AgentRef` (or none).
const LEAD_SELECT: &str =
    "SELECT l.id, l.name, l.phone, l.email, l.company, l.source, l.status,
            l.assigned_to, a.name, l.created_by, l.created_ts, l.updated_ts
     FROM leads l LEFT JOIN agents a ON a.id = l.assigned_to";

fn row_to_lead(row: &Row<'_>) -> rusqlite::Result<Lead> {
    let assigned_id: Option<i64> = row.get(7)?;
    let assigned_name: Option<String> = row.get(8)?;
    let assigned_to = assigned_id.map(|id| AgentRef {
        id,
        name: assigned_name.unwrap_or_default(),
    });

    Ok(Lead {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        company: row.get(4)?,
        source: row.get(5)?,
        status: LeadStatus::from_str(&row.get::<_, String>(6)?)
            .unwrap_or(LeadStatus::New),
        assigned_to,
        created_by: row.get(9)?,
        created_ts: row.get(10)?,
        updated_ts: row.get(11)?,
    })
}

/// Lead repository for database operations
pub struct LeadRepo;

impl LeadRepo {
    /// Create a new lead. Status is always `New`.
    pub fn create(conn: &Connection, new_lead: &NewLead) -> Result<Lead> {
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO leads (name, phone, email, company, source, status, created_by, created_ts, updated_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                new_lead.name.trim(),
                new_lead.phone.trim(),
                new_lead.email,
                new_lead.company,
                new_lead.source_or_default(),
                LeadStatus::New.as_str(),
                new_lead.created_by,
                now,
                now
            ],
        )
        .with_context(|| format!("Failed to create lead: {}", new_lead.name))?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| anyhow::anyhow!("Lead {} vanished after insert", id))
    }

    /// Get lead by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Lead>> {
        let sql = format!("{} WHERE l.id = ?1", LEAD_SELECT);
        let lead = conn.query_row(&sql, [id], row_to_lead).optional()?;
        Ok(lead)
    }

    /// List all leads in creation order
    pub fn list_all(conn: &Connection) -> Result<Vec<Lead>> {
        let sql = format!("{} ORDER BY l.id", LEAD_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_lead)?;

        let mut leads = Vec::new();
        for row in rows {
            leads.push(row?);
        }
        Ok(leads)
    }

    /// List leads owned by one agent
    pub fn list_assigned_to(conn: &Connection, agent_id: i64) -> Result<Vec<Lead>> {
        let sql = format!("{} WHERE l.assigned_to = ?1 ORDER BY l.id", LEAD_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([agent_id], row_to_lead)?;

        let mut leads = Vec::new();
        for row in rows {
            leads.push(row?);
        }
        Ok(leads)
    }

    /// Return the ids from `ids` that have no lead row
    pub fn missing_ids(conn: &Connection, ids: &[i64]) -> Result<Vec<i64>> {
        let mut stmt = conn.prepare("SELECT 1 FROM leads WHERE id = ?1")?;
        let mut missing = Vec::new();
        for id in ids {
            if !stmt.exists([id])? {
                missing.push(*id);
            }
        }
        Ok(missing)
    }

    /// Apply a partial update. Returns `None` when the lead does not exist.
    pub fn update(conn: &Connection, id: i64, patch: &LeadPatch) -> Result<Option<Lead>> {
        let mut sets = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(ref name) = patch.name {
            sets.push("name = ?");
            params.push(Box::new(name.trim().to_string()));
        }
        if let Some(ref phone) = patch.phone {
            sets.push("phone = ?");
            params.push(Box::new(phone.trim().to_string()));
        }
        if let Some(ref email) = patch.email {
            sets.push("email = ?");
            params.push(Box::new(email.clone()));
        }
        if let Some(ref company) = patch.company {
            sets.push("company = ?");
            params.push(Box::new(company.clone()));
        }
        if let Some(ref source) = patch.source {
            sets.push("source = ?");
            params.push(Box::new(source.clone()));
        }
        if let Some(status) = patch.status {
            sets.push("status = ?");
            params.push(Box::new(status.as_str()));
        }
        if let Some(agent_id) = patch.assigned_to {
            sets.push("assigned_to = ?");
            params.push(Box::new(agent_id));
        }

        sets.push("updated_ts = ?");
        params.push(Box::new(chrono::Utc::now().timestamp()));

        // Number the parameters
        let mut numbered_sets = Vec::new();
        for (i, set) in sets.iter().enumerate() {
            numbered_sets.push(set.replace('?', &format!("?{}", i + 1)));
        }
        let id_param = params.len() + 1;
        let sql = format!(
            "UPDATE leads SET {} WHERE id = ?{}",
            numbered_sets.join(", "),
            id_param
        );
        params.push(Box::new(id));

        let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let updated = conn.execute(&sql, param_refs.as_slice())
            .with_context(|| format!("Failed to update lead {}", id))?;

        if updated == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, id)
    }

    /// Set the owner of every listed lead. Caller provides the transaction.
    pub fn assign_many(conn: &Connection, ids: &[i64], agent_id: i64) -> Result<usize> {
        let now = chrono::Utc::now().timestamp();
        let mut stmt = conn.prepare(
            "UPDATE leads SET assigned_to = ?1, updated_ts = ?2 WHERE id = ?3"
        )?;
        let mut count = 0;
        for id in ids {
            count += stmt.execute(rusqlite::params![agent_id, now, id])
                .with_context(|| format!("Failed to assign lead {}", id))?;
        }
        Ok(count)
    }

    /// Delete a lead. Returns false when nothing was deleted.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let deleted = conn.execute("DELETE FROM leads WHERE id = ?1", [id])
            .with_context(|| format!("Failed to delete lead {}", id))?;
        Ok(deleted > 0)
    }

    /// Delete every listed lead. Caller provides the transaction.
    pub fn delete_many(conn: &Connection, ids: &[i64]) -> Result<usize> {
        let mut stmt = conn.prepare("DELETE FROM leads WHERE id = ?1")?;
        let mut count = 0;
        for id in ids {
            count += stmt.execute([id])
                .with_context(|| format!("Failed to delete lead {}", id))?;
        }
        Ok(count)
    }
}
