//! Stage transition policy
//!
//! Any stage may be reached from any other stage (backward moves are fine),
//! with one exception: a `Closed` lead is locked and can no longer be moved
//! through the pipeline. Moving an unassigned lead hands it to the operator
//! performing the move.

use crate::error::PipelineError;
use crate::models::{AgentRef, Lead, LeadPatch, LeadStatus};

/// Check whether a lead may be moved to `target` through the pipeline
pub fn can_transition(lead: &Lead, _target: LeadStatus) -> bool {
    !lead.status.is_locked()
}

/// Outcome of a permitted stage move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub lead_id: i64,
    pub from: LeadStatus,
    pub status: LeadStatus,
    pub assigned_to: Option<AgentRef>,
    /// The lead was unassigned and now belongs to the actor
    pub auto_assigned: bool,
    pub reached_closed: bool,
}

impl Transition {
    /// Minimal store patch: status, plus the owner when it changed
    pub fn patch(&self) -> LeadPatch {
        LeadPatch {
            status: Some(self.status),
            assigned_to: if self.auto_assigned {
                self.assigned_to.as_ref().map(|a| Some(a.id))
            } else {
                None
            },
            ..LeadPatch::default()
        }
    }

    /// The predicted record after the move
    pub fn apply(&self, lead: &Lead) -> Lead {
        Lead {
            status: self.status,
            assigned_to: self.assigned_to.clone(),
            ..lead.clone()
        }
    }
}

/// Compute the result of moving `lead` to `target` on behalf of `actor`
pub fn compute_transition(
    lead: &Lead,
    target: LeadStatus,
    actor: &AgentRef,
) -> Result<Transition, PipelineError> {
    if !can_transition(lead, target) {
        return Err(PipelineError::LockedStage { lead_id: lead.id });
    }

    let auto_assigned = lead.is_unassigned();
    let assigned_to = if auto_assigned {
        Some(actor.clone())
    } else {
        lead.assigned_to.clone()
    };

    Ok(Transition {
        lead_id: lead.id,
        from: lead.status,
        status: target,
        assigned_to,
        auto_assigned,
        reached_closed: target == LeadStatus::Closed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::lead;

    fn actor() -> AgentRef {
        AgentRef { id: 1, name: "agent-1".to_string() }
    }

    #[test]
    fn test_closed_lead_cannot_move_anywhere() {
        let closed = lead(1, LeadStatus::Closed, Some((2, "Grace")));
        for target in LeadStatus::ALL {
            assert!(!can_transition(&closed, target));
            let err = compute_transition(&closed, target, &actor()).unwrap_err();
            assert!(matches!(err, PipelineError::LockedStage { lead_id: 1 }));
        }
    }

    #[test]
    fn test_unassigned_lead_goes_to_actor() {
        for target in [LeadStatus::New, LeadStatus::Contacted, LeadStatus::Interested, LeadStatus::Lost] {
            let t = compute_transition(&lead(1, LeadStatus::New, None), target, &actor()).unwrap();
            assert_eq!(t.assigned_to, Some(actor()));
            assert!(t.auto_assigned);
            assert_eq!(t.patch().assigned_to, Some(Some(1)));
        }
    }

    #[test]
    fn test_assigned_lead_keeps_owner() {
        let owned = lead(3, LeadStatus::Interested, Some((2, "Grace")));
        let t = compute_transition(&owned, LeadStatus::Contacted, &actor()).unwrap();
        assert_eq!(t.assigned_to.as_ref().map(|a| a.id), Some(2));
        assert!(!t.auto_assigned);
        assert_eq!(t.patch(), LeadPatch { status: Some(LeadStatus::Contacted), ..LeadPatch::default() });
    }

    #[test]
    fn test_ada_dragged_to_interested() {
        let mut ada = lead(1, LeadStatus::New, None);
        ada.name = "Ada".to_string();
        ada.phone = "555".to_string();

        let t = compute_transition(&ada, LeadStatus::Interested, &actor()).unwrap();
        let predicted = t.apply(&ada);

        assert_eq!(predicted.status, LeadStatus::Interested);
        assert_eq!(predicted.assigned_to, Some(actor()));
        assert_eq!(predicted.name, "Ada");
        assert_eq!(predicted.updated_ts, ada.updated_ts);
    }

    #[test]
    fn test_reaching_closed_is_flagged() {
        let t = compute_transition(&lead(1, LeadStatus::Interested, None), LeadStatus::Closed, &actor()).unwrap();
        assert!(t.reached_closed);
        assert_eq!(t.from, LeadStatus::Interested);
    }
}
