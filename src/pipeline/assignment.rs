use crate::error::PipelineError;
use crate::models::Lead;

/// A validated bulk assignment, ready for one batched store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkAssignment {
    pub lead_ids: Vec<i64>,
    pub agent_id: i64,
}

impl BulkAssignment {
    /// True when any target already has an owner, so the action reads as a
    /// reassignment rather than a first assignment
    pub fn is_reassignment(&self, leads: &[Lead]) -> bool {
        leads.iter()
            .filter(|l| self.lead_ids.contains(&l.id))
            .any(|l| !l.is_unassigned())
    }
}

/// Validate a bulk assignment request.
///
/// Status is not inspected here: the candidate ids come from a selection
/// pool that has already excluded closed leads.
pub fn assign_many(lead_ids: &[i64], agent_id: Option<i64>) -> Result<BulkAssignment, PipelineError> {
    let agent_id = agent_id
        .ok_or_else(|| PipelineError::validation("Select an agent to assign leads to"))?;
    if lead_ids.is_empty() {
        return Err(PipelineError::validation("No leads selected for assignment"));
    }

    Ok(BulkAssignment { lead_ids: unique_ids(lead_ids), agent_id })
}

/// Collapse duplicate ids, keeping first occurrence order
pub fn unique_ids(lead_ids: &[i64]) -> Vec<i64> {
    let mut unique = Vec::with_capacity(lead_ids.len());
    for id in lead_ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}
