use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{Agent, AgentRole};
use anyhow::{Context, Result};

fn row_to_agent(row: &Row<'_>) -> rusqlite::Result<Agent> {
    Ok(Agent {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        role: AgentRole::from_str(&row.get::<_, String>(3)?)
            .unwrap_or(AgentRole::Agent),
        created_ts: row.get(4)?,
    })
}

/// Agent repository
pub struct AgentRepo;

impl AgentRepo {
    pub fn create(conn: &Connection, name: &str, email: Option<&str>, role: AgentRole) -> Result<Agent> {
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO agents (name, email, role, created_ts) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![name.trim(), email, role.as_str(), now],
        )
        .with_context(|| format!("Failed to create agent: {}", name))?;

        Ok(Agent {
            id: conn.last_insert_rowid(),
            name: name.trim().to_string(),
            email: email.map(str::to_string),
            role,
            created_ts: now,
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Agent>> {
        let agent = conn.query_row(
            "SELECT id, name, email, role, created_ts FROM agents WHERE id = ?1",
            [id],
            row_to_agent,
        ).optional()?;
        Ok(agent)
    }

    pub fn list_all(conn: &Connection) -> Result<Vec<Agent>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, email, role, created_ts FROM agents ORDER BY id"
        )?;
        let rows = stmt.query_map([], row_to_agent)?;

        let mut agents = Vec::new();
        for row in rows {
            agents.push(row?);
        }
        Ok(agents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    #[test]
    fn test_create_and_list_agents() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let grace = AgentRepo::create(&conn, "Grace", Some("grace@example.com"), AgentRole::Agent).unwrap();
        AgentRepo::create(&conn, "Root", None, AgentRole::Admin).unwrap();

        let agents = AgentRepo::list_all(&conn).unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0], grace);
        assert_eq!(agents[1].role, AgentRole::Admin);

        assert!(AgentRepo::get_by_id(&conn, 99).unwrap().is_none());
    }
}
