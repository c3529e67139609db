//! Bulk selection ("quick select")
//!
//! A quick select derives a candidate pool from one filter and takes the
//! first N leads of it, in the pool's existing order. Closed leads never
//! enter a pool. The chosen ids become the active selection, which is the
//! exact input to bulk assign and bulk delete.

use std::fmt;
use crate::error::PipelineError;
use crate::models::{Lead, LeadStatus};

/// Filter a quick-select pool is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickFilter {
    Unassigned,
    Status(LeadStatus),
}

impl QuickFilter {
    /// Parse "unassigned" or a stage name. Closed is never offered.
    pub fn parse(s: &str) -> Result<Self, PipelineError> {
        if s.trim().eq_ignore_ascii_case("unassigned") {
            return Ok(QuickFilter::Unassigned);
        }
        match LeadStatus::from_str(s) {
            Some(LeadStatus::Closed) => Err(PipelineError::validation(
                "Closed leads cannot be bulk selected",
            )),
            Some(status) => Ok(QuickFilter::Status(status)),
            None => Err(PipelineError::validation(format!(
                "Invalid quick-select filter: '{}'. Use 'unassigned' or a stage name.",
                s
            ))),
        }
    }

    /// Filters an operator can pick from
    pub fn offerable() -> Vec<QuickFilter> {
        std::iter::once(QuickFilter::Unassigned)
            .chain(
                LeadStatus::ALL.iter()
                    .filter(|s| !s.is_locked())
                    .map(|s| QuickFilter::Status(*s)),
            )
            .collect()
    }

    fn admits(&self, lead: &Lead) -> bool {
        match self {
            QuickFilter::Unassigned => lead.is_unassigned(),
            QuickFilter::Status(status) => lead.status == *status,
        }
    }
}

impl fmt::Display for QuickFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuickFilter::Unassigned => f.write_str("Unassigned"),
            QuickFilter::Status(status) => f.write_str(status.as_str()),
        }
    }
}

/// Candidate pool for a filter, in collection order
pub fn pool<'a>(leads: &'a [Lead], filter: QuickFilter) -> Vec<&'a Lead> {
    leads.iter()
        .filter(|l| l.status != LeadStatus::Closed)
        .filter(|l| filter.admits(l))
        .collect()
}

/// Deterministic prefix of the pool, at most `count` long
pub fn sample<'a>(pool: &[&'a Lead], count: usize) -> Vec<&'a Lead> {
    pool.iter().take(count).copied().collect()
}

/// The operator's active bulk selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSelection {
    ids: Vec<i64>,
}

impl BulkSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with the first `count` leads of the filter's pool.
    /// An empty pool is refused and leaves the selection as it was.
    pub fn quick_select(
        &mut self,
        leads: &[Lead],
        filter: QuickFilter,
        count: usize,
    ) -> Result<&[i64], PipelineError> {
        let candidates = pool(leads, filter);
        if candidates.is_empty() {
            return Err(PipelineError::NoCandidates { filter: filter.to_string() });
        }
        self.ids = sample(&candidates, count).iter().map(|l| l.id).collect();
        log::debug!("Quick select {} x{} -> {:?}", filter, count, self.ids);
        Ok(&self.ids)
    }

    /// Add or remove one lead by hand
    pub fn toggle(&mut self, id: i64) {
        if let Some(pos) = self.ids.iter().position(|&x| x == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
