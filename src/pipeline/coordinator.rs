//! Optimistic mutation coordinator
//!
//! The coordinator owns the local lead cache and is its only writer. A
//! single-lead stage move is optimistic:
//!
//! ```text
//! Idle --begin_move--> Predicted --commit ok--> Confirmed
//!                               \--commit err-> RolledBack
//! ```
//!
//! `begin_move` writes the predicted record into the cache before any store
//! call, so views reflect the move immediately. `commit` sends the minimal
//! patch; on success the whole cache is refetched, on failure the snapshot
//! taken before the prediction is restored exactly.
//!
//! Batched operations (bulk assign, bulk delete) and direct record edits
//! are not optimistic: the store call completes before the cache changes.
//!
//! Every refetch is authoritative. A refetch triggered by one mutation
//! replaces any prediction still pending for another; the pending move's own
//! commit reconciles again once it resolves. The last refetch wins.
//!
//! A rollback restores the whole snapshot, so changes confirmed by other
//! operations while the move was pending also leave the cache until the
//! next refresh brings them back from the store.
//!
//! A `PendingMove` dropped without `commit` leaves its prediction in the
//! cache until the next refresh, but stops counting as in flight.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use crate::error::PipelineError;
use crate::models::{AgentRef, Lead, LeadPatch, LeadStatus, NewLead};
use crate::pipeline::assignment::{self, BulkAssignment};
use crate::pipeline::projection::{self, StageColumn, ViewFilter};
use crate::pipeline::selection::{BulkSelection, QuickFilter};
use crate::pipeline::transition::{self, Transition};
use crate::store::{LeadScope, LeadStore};

/// Lifecycle of one mutation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MutationState {
    Idle,
    Predicted,
    Confirmed,
    RolledBack,
}

impl MutationState {
    pub fn can_advance_to(self, next: MutationState) -> bool {
        matches!(
            (self, next),
            (MutationState::Idle, MutationState::Predicted)
                | (MutationState::Predicted, MutationState::Confirmed)
                | (MutationState::Predicted, MutationState::RolledBack)
        )
    }

    pub fn is_settled(self) -> bool {
        matches!(self, MutationState::Confirmed | MutationState::RolledBack)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient, dismissible message for the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Something the consumer may react to. The coordinator never depends on
/// anyone handling these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PipelineEvent {
    Notice(Notice),
    /// A lead was moved into Closed
    DealWon { lead_id: i64 },
}

/// Holds one slot of the coordinator's in-flight count while alive
#[derive(Debug)]
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// A stage move whose prediction is in the cache but not yet committed
#[must_use = "a predicted move must be committed to reach the store"]
#[derive(Debug)]
pub struct PendingMove {
    id: u64,
    transition: Transition,
    snapshot: Vec<Lead>,
    state: MutationState,
    in_flight: Option<InFlight>,
}

impl PendingMove {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    pub fn state(&self) -> MutationState {
        self.state
    }

    fn advance(&mut self, next: MutationState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal mutation transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }
}

pub struct Coordinator<S: LeadStore> {
    store: S,
    leads: Vec<Lead>,
    events: Vec<PipelineEvent>,
    next_mutation: u64,
    in_flight: Arc<AtomicUsize>,
}

impl<S: LeadStore> Coordinator<S> {
    /// Coordinator with an empty cache
    pub fn new(store: S) -> Self {
        Self {
            store,
            leads: Vec::new(),
            events: Vec::new(),
            next_mutation: 1,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Coordinator with the cache populated from the store
    pub fn load(store: S) -> Result<Self, PipelineError> {
        let mut coordinator = Self::new(store);
        coordinator.refresh()?;
        Ok(coordinator)
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn find(&self, lead_id: i64) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == lead_id)
    }

    pub fn project(&self, filter: &ViewFilter) -> Vec<&Lead> {
        projection::project(&self.leads, filter)
    }

    pub fn project_by_stage(&self, search: &str) -> Vec<StageColumn<'_>> {
        projection::project_by_stage(&self.leads, search)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Number of live predicted moves not yet committed
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<PipelineEvent> {
        std::mem::take(&mut self.events)
    }

    fn notify_success(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("notice: {}", message);
        self.events.push(PipelineEvent::Notice(Notice {
            level: NoticeLevel::Success,
            message,
        }));
    }

    fn notify_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("error notice: {}", message);
        self.events.push(PipelineEvent::Notice(Notice {
            level: NoticeLevel::Error,
            message,
        }));
    }

    /// Report an error to the operator and hand it back to the caller
    fn fail(&mut self, err: PipelineError) -> PipelineError {
        self.notify_error(err.to_string());
        err
    }

    /// Replace the cache with the store's current lead list
    pub fn refresh(&mut self) -> Result<(), PipelineError> {
        let leads = self.store.list_leads(LeadScope::All)
            .map_err(|e| PipelineError::remote("Refresh", e))?;
        let pending = self.in_flight();
        if pending > 0 {
            log::debug!("Refetch replaces {} pending prediction(s)", pending);
        }
        self.leads = leads;
        Ok(())
    }

    /// Refetch after a successful store call. A failed refetch leaves the
    /// cache as it is; the next successful one reconciles.
    fn reconcile(&mut self) {
        if let Err(err) = self.refresh() {
            self.notify_error(err.to_string());
        }
    }

    // -- optimistic single-lead path --------------------------------------

    /// Predict a stage move and apply it to the cache immediately
    pub fn begin_move(
        &mut self,
        lead_id: i64,
        target: LeadStatus,
        actor: &AgentRef,
    ) -> Result<PendingMove, PipelineError> {
        let Some(index) = self.leads.iter().position(|l| l.id == lead_id) else {
            return Err(self.fail(PipelineError::validation(format!("Lead {} not found", lead_id))));
        };

        let transition = match transition::compute_transition(&self.leads[index], target, actor) {
            Ok(t) => t,
            Err(PipelineError::LockedStage { lead_id }) => {
                self.notify_error("Closed deals are locked.");
                return Err(PipelineError::LockedStage { lead_id });
            }
            Err(err) => return Err(self.fail(err)),
        };

        let mut pending = PendingMove {
            id: self.next_mutation,
            transition,
            snapshot: self.leads.clone(),
            state: MutationState::Idle,
            in_flight: None,
        };
        self.next_mutation += 1;

        let predicted = pending.transition.apply(&self.leads[index]);
        self.leads[index] = predicted;
        pending.advance(MutationState::Predicted);
        pending.in_flight = Some(InFlight::enter(&self.in_flight));

        if pending.transition.reached_closed {
            let name = self.leads[index].name.clone();
            self.notify_success(format!("Deal won! {} closed.", name));
            self.events.push(PipelineEvent::DealWon { lead_id });
        } else {
            self.notify_success(format!("Moved to {}", target));
        }

        log::debug!(
            "Mutation {} predicted: lead {} {} -> {}",
            pending.id, lead_id, pending.transition.from, target
        );
        Ok(pending)
    }

    /// Send a predicted move to the store and settle it
    pub fn commit(&mut self, mut pending: PendingMove) -> Result<MutationState, PipelineError> {
        pending.in_flight = None;
        let patch = pending.transition.patch();
        let lead_id = pending.transition.lead_id;

        match self.store.update_lead(lead_id, &patch) {
            Ok(_) => {
                pending.advance(MutationState::Confirmed);
                log::debug!("Mutation {} confirmed", pending.id);
                self.reconcile();
                Ok(pending.state)
            }
            Err(source) => {
                pending.advance(MutationState::RolledBack);
                self.leads = std::mem::take(&mut pending.snapshot);
                log::warn!("Mutation {} rolled back for lead {}: {}", pending.id, lead_id, source);
                let action = format!("Move to {}", pending.transition.status);
                self.notify_error(format!("{} failed. Reverting changes.", action));
                Err(PipelineError::remote(action, source))
            }
        }
    }

    /// Predict and commit a stage move in one step
    pub fn move_lead(
        &mut self,
        lead_id: i64,
        target: LeadStatus,
        actor: &AgentRef,
    ) -> Result<MutationState, PipelineError> {
        let pending = self.begin_move(lead_id, target, actor)?;
        self.commit(pending)
    }

    // -- selection and batched path ----------------------------------------

    /// Quick select against the current cache
    pub fn quick_select(
        &mut self,
        selection: &mut BulkSelection,
        filter: QuickFilter,
        count: usize,
    ) -> Result<Vec<i64>, PipelineError> {
        match selection.quick_select(&self.leads, filter, count) {
            Ok(ids) => {
                let ids = ids.to_vec();
                self.notify_success(format!("Selected {} lead(s) from {}", ids.len(), filter));
                Ok(ids)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Assign every listed lead to one agent in a single store call
    pub fn bulk_assign(
        &mut self,
        lead_ids: &[i64],
        agent_id: Option<i64>,
    ) -> Result<BulkAssignment, PipelineError> {
        let assignment = assignment::assign_many(lead_ids, agent_id).map_err(|e| self.fail(e))?;
        let verb = if assignment.is_reassignment(&self.leads) { "Reassigned" } else { "Assigned" };

        if let Err(source) = self.store.assign_leads(&assignment.lead_ids, assignment.agent_id) {
            return Err(self.fail(PipelineError::remote("Bulk assign", source)));
        }

        self.reconcile();
        let owner = self.agent_name(assignment.agent_id);
        self.notify_success(format!(
            "{} {} lead(s) to {}",
            verb,
            assignment.lead_ids.len(),
            owner
        ));
        Ok(assignment)
    }

    /// Display name for an agent, falling back to its id
    fn agent_name(&mut self, agent_id: i64) -> String {
        let found = self.leads.iter()
            .filter_map(|l| l.assigned_to.as_ref())
            .find(|a| a.id == agent_id)
            .map(|a| a.name.clone());
        if let Some(name) = found {
            return name;
        }
        match self.store.list_agents() {
            Ok(agents) => agents.into_iter()
                .find(|a| a.id == agent_id)
                .map(|a| a.name)
                .unwrap_or_else(|| format!("agent {}", agent_id)),
            Err(err) => {
                log::debug!("Agent lookup failed: {}", err);
                format!("agent {}", agent_id)
            }
        }
    }

    /// Delete every listed lead in a single store call
    pub fn bulk_delete(&mut self, lead_ids: &[i64]) -> Result<usize, PipelineError> {
        let lead_ids = assignment::unique_ids(lead_ids);
        if lead_ids.is_empty() {
            return Err(self.fail(PipelineError::validation("No leads selected for deletion")));
        }

        if let Err(source) = self.store.delete_leads(&lead_ids) {
            return Err(self.fail(PipelineError::remote("Bulk delete", source)));
        }

        self.leads.retain(|l| !lead_ids.contains(&l.id));
        self.reconcile();
        self.notify_success(format!("Deleted {} lead(s)", lead_ids.len()));
        Ok(lead_ids.len())
    }

    // -- direct record operations ------------------------------------------

    /// Add-lead flow. The store forces the status to `New`.
    pub fn add_lead(&mut self, new_lead: NewLead) -> Result<Lead, PipelineError> {
        if new_lead.name.trim().is_empty() || new_lead.phone.trim().is_empty() {
            return Err(self.fail(PipelineError::validation("Name and phone are required")));
        }

        let created = self.store.create_lead(&new_lead)
            .map_err(|e| PipelineError::remote("Create lead", e))
            .map_err(|e| self.fail(e))?;

        self.reconcile();
        self.notify_success(format!("Created lead {}: {}", created.id, created.name));
        Ok(created)
    }

    /// Direct record edit. Unlike pipeline moves this may change any field,
    /// including the status of a closed lead.
    pub fn edit_lead(&mut self, lead_id: i64, patch: LeadPatch) -> Result<Lead, PipelineError> {
        if patch.is_empty() {
            return Err(self.fail(PipelineError::validation("Nothing to update")));
        }
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&patch.name) || blank(&patch.phone) {
            return Err(self.fail(PipelineError::validation("Name and phone cannot be empty")));
        }

        let updated = self.store.update_lead(lead_id, &patch)
            .map_err(|e| PipelineError::remote(format!("Update lead {}", lead_id), e))
            .map_err(|e| self.fail(e))?;

        self.reconcile();
        self.notify_success("Lead updated successfully");
        Ok(updated)
    }

    pub fn delete_lead(&mut self, lead_id: i64) -> Result<(), PipelineError> {
        self.store.delete_lead(lead_id)
            .map_err(|e| PipelineError::remote(format!("Delete lead {}", lead_id), e))
            .map_err(|e| self.fail(e))?;

        self.leads.retain(|l| l.id != lead_id);
        self.reconcile();
        self.notify_success("Lead removed permanently.");
        Ok(())
    }
}
