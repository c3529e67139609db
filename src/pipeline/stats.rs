//! Agent portfolio and leaderboard figures
//!
//! Both are pure functions over the cached leads, computed the same way the
//! projections are.

use serde::Serialize;
use crate::models::{Agent, AgentRole, Lead, LeadStatus};

/// Points awarded per won deal on the leaderboard
pub const XP_PER_WIN: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Portfolio<'a> {
    pub agent_id: i64,
    pub total: usize,
    pub active: usize,
    pub won: usize,
    /// Won deals as a rounded percentage of all owned leads
    pub conversion: u32,
    pub stage_counts: Vec<(LeadStatus, usize)>,
    /// Lead count per source, in order of first appearance
    pub sources: Vec<(String, usize)>,
    /// Active leads, New first, then Interested, then Contacted; most
    /// recently updated first within a stage
    pub active_leads: Vec<&'a Lead>,
}

fn work_priority(status: LeadStatus) -> u8 {
    match status {
        LeadStatus::New => 3,
        LeadStatus::Interested => 2,
        LeadStatus::Contacted => 1,
        _ => 0,
    }
}

fn conversion_rate(won: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((won as f64 / total as f64) * 100.0).round() as u32
}

/// Portfolio of the leads owned by one agent
pub fn portfolio(leads: &[Lead], agent_id: i64) -> Portfolio<'_> {
    let owned: Vec<&Lead> = leads.iter().filter(|l| l.is_owned_by(agent_id)).collect();

    let mut active_leads: Vec<&Lead> = owned.iter()
        .copied()
        .filter(|l| l.status.is_active())
        .collect();
    active_leads.sort_by(|a, b| {
        work_priority(b.status).cmp(&work_priority(a.status))
            .then(b.updated_ts.cmp(&a.updated_ts))
    });

    let won = owned.iter().filter(|l| l.status == LeadStatus::Closed).count();

    let stage_counts = LeadStatus::ALL.iter()
        .map(|&stage| (stage, owned.iter().filter(|l| l.status == stage).count()))
        .collect();

    let mut sources: Vec<(String, usize)> = Vec::new();
    for lead in &owned {
        match sources.iter_mut().find(|(name, _)| *name == lead.source) {
            Some((_, count)) => *count += 1,
            None => sources.push((lead.source.clone(), 1)),
        }
    }

    Portfolio {
        agent_id,
        total: owned.len(),
        active: active_leads.len(),
        won,
        conversion: conversion_rate(won, owned.len()),
        stage_counts,
        sources,
        active_leads,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub agent_id: i64,
    pub name: String,
    pub wins: usize,
    pub xp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub total_closed: usize,
    pub top_performer: Option<String>,
}

/// Rank non-admin agents by won deals. Ties keep agent order.
pub fn leaderboard(agents: &[Agent], leads: &[Lead]) -> Leaderboard {
    let mut entries: Vec<LeaderboardEntry> = agents.iter()
        .filter(|a| a.role != AgentRole::Admin)
        .map(|agent| {
            let wins = leads.iter()
                .filter(|l| l.is_owned_by(agent.id) && l.status == LeadStatus::Closed)
                .count();
            LeaderboardEntry {
                agent_id: agent.id,
                name: agent.name.clone(),
                wins,
                xp: wins as u32 * XP_PER_WIN,
            }
        })
        .collect();
    entries.sort_by(|a, b| b.wins.cmp(&a.wins));

    Leaderboard {
        total_closed: leads.iter().filter(|l| l.status == LeadStatus::Closed).count(),
        top_performer: entries.first().map(|e| e.name.clone()),
        entries,
    }
}
