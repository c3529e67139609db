//! Read-only projections over the lead collection
//!
//! Projections borrow the cache and never mutate it. They are cheap enough
//! to recompute on every input change, so nothing holds on to a derived copy.

use serde::Serialize;
use crate::models::{Lead, LeadStatus};

/// Status dimension of a list filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(LeadStatus),
}

impl StatusFilter {
    /// Parse "All" or a stage name
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(StatusFilter::All);
        }
        LeadStatus::from_str(s).map(StatusFilter::Only)
    }

    fn admits(&self, status: LeadStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(s) => *s == status,
        }
    }
}

/// Inputs of the list view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub search: String,
    pub status: StatusFilter,
    pub unassigned_only: bool,
}

/// Case-insensitive match on name, substring match on phone
pub fn matches_search(lead: &Lead, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    lead.name.to_lowercase().contains(&search.to_lowercase()) || lead.phone.contains(search)
}

/// Leads matching every part of the filter, in collection order
pub fn project<'a>(leads: &'a [Lead], filter: &ViewFilter) -> Vec<&'a Lead> {
    leads.iter()
        .filter(|l| matches_search(l, &filter.search))
        .filter(|l| filter.status.admits(l.status))
        .filter(|l| !filter.unassigned_only || l.is_unassigned())
        .collect()
}

/// One kanban column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageColumn<'a> {
    pub stage: LeadStatus,
    pub leads: Vec<&'a Lead>,
}

/// Whether a lead is shown in a given board column.
///
/// Unassigned leads always surface under New, whatever their stored status,
/// so they are never hidden from the working view. Other columns only show
/// owned leads.
pub fn in_column(lead: &Lead, stage: LeadStatus) -> bool {
    if stage == LeadStatus::New {
        lead.status == LeadStatus::New || lead.is_unassigned()
    } else {
        lead.status == stage && !lead.is_unassigned()
    }
}

/// Board columns in stage order
pub fn project_by_stage<'a>(leads: &'a [Lead], search: &str) -> Vec<StageColumn<'a>> {
    LeadStatus::ALL.iter()
        .map(|&stage| StageColumn {
            stage,
            leads: leads.iter()
                .filter(|l| matches_search(l, search))
                .filter(|l| in_column(l, stage))
                .collect(),
        })
        .collect()
}
