//! leadpipe - a lead pipeline engine for small sales teams
//!
//! This library provides the core functionality for leadpipe, including:
//! - Database operations and migrations
//! - Data models for leads and agents
//! - Repository layer and the `LeadStore` boundary
//! - The pipeline engine: stage rules, quick select, bulk assignment,
//!   projections and the optimistic mutation coordinator
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use leadpipe::db::DbConnection;
//! use leadpipe::models::{AgentRole, LeadStatus, NewLead};
//! use leadpipe::pipeline::Coordinator;
//! use leadpipe::store::{LeadStore, SqliteStore};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut store = SqliteStore::new(DbConnection::connect_in_memory()?);
//!     let agent = store.create_agent("agent-1", None, AgentRole::Agent)?;
//!
//!     let mut pipeline = Coordinator::load(store)?;
//!     let lead = pipeline.add_lead(NewLead::new("Ada", "555"))?;
//!     pipeline.move_lead(lead.id, LeadStatus::Interested, &agent.to_ref())?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repo;
pub mod store;
pub mod pipeline;
pub mod cli;
pub mod utils;
