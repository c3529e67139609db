// Pipeline engine: stage rules, selection, projections and the mutation coordinator

pub mod transition;
pub mod assignment;
pub mod selection;
pub mod projection;
pub mod coordinator;
pub mod stats;

pub use assignment::{assign_many, BulkAssignment};
pub use coordinator::{Coordinator, MutationState, Notice, NoticeLevel, PendingMove, PipelineEvent};
pub use projection::{project, project_by_stage, StageColumn, StatusFilter, ViewFilter};
pub use selection::{BulkSelection, QuickFilter};
pub use transition::{can_transition, compute_transition, Transition};
