use rusqlite::{Connection, Result};
use std::collections::HashMap;

/// Current database schema version
const CURRENT_VERSION: u32 = 2;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        // Foreign keys are per-connection and cannot be toggled inside a transaction
        conn.execute_batch("PRAGMA foreign_keys=ON")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version = Self::get_version(conn).unwrap_or(0);

        for version in (current_version + 1)..=CURRENT_VERSION {
            Self::apply_migration(conn, version)?;
        }

        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            log::debug!("Applied schema migration v{}", version);
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>> {
    let mut migrations: HashMap<u32, fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations
}

/// Migration v1: Initial schema
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE agents (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NULL,
            role TEXT NOT NULL DEFAULT 'agent' CHECK(role IN ('agent','admin')),
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;

    // Leads table
    tx.execute(
        "CREATE TABLE leads (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT NULL,
            source TEXT NOT NULL DEFAULT 'Manual',
            status TEXT NOT NULL DEFAULT 'New'
                CHECK(status IN ('New','Contacted','Interested','Closed','Lost')),
            assigned_to INTEGER NULL REFERENCES agents(id) ON DELETE SET NULL,
            created_by INTEGER NULL REFERENCES agents(id) ON DELETE SET NULL,
            created_ts INTEGER NOT NULL,
            updated_ts INTEGER NOT NULL
        )",
        [],
    )?;

    tx.execute(
        "CREATE INDEX idx_leads_status ON leads(status)",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_leads_assigned_to ON leads(assigned_to)",
        [],
    )?;

    Ok(())
}

/// Migration v2: company on leads, recency index for activity displays
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "ALTER TABLE leads ADD COLUMN company TEXT NULL",
        [],
    )?;
    tx.execute(
        "CREATE INDEX idx_leads_updated_ts ON leads(updated_ts)",
        [],
    )?;
    Ok(())
}
