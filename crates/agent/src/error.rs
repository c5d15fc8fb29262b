//! Closed error taxonomy for resolution and execution.

use blockhand_core::{Item, ToolRequirement};
use blockhand_facade::{BlockPos, FacadeError, NavError};
use thiserror::Error;

/// Failures detected while decomposing a goal; no execution is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("no way to obtain {item}")]
    Unsatisfiable { item: Item },
    #[error("unresolvable production cycle at {item}")]
    Cycle { item: Item },
}

/// Why a placement gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementReason {
    NoReference,
    EquipFailed,
    VerifyMismatch,
}

impl std::fmt::Display for PlacementReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            PlacementReason::NoReference => "no reference face",
            PlacementReason::EquipFailed => "could not equip the block",
            PlacementReason::VerifyMismatch => "placed block did not verify",
        };
        f.write_str(text)
    }
}

/// Failures during plan execution. A failing task terminates the plan;
/// remaining tasks are not attempted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("no {block} found within range")]
    ResourceExhausted { block: Item },
    #[error("missing required tool ({} tier {})",
        .requirement.kind.as_str(),
        .requirement.min_tier.map(|t| t.as_str()).unwrap_or("any"))]
    ToolMissing { requirement: ToolRequirement },
    #[error(transparent)]
    Nav(#[from] NavError),
    #[error("placement failed at {pos}: {reason}")]
    Placement {
        pos: BlockPos,
        reason: PlacementReason,
    },
    #[error("busy with another command")]
    Busy,
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },
    #[error("aborted")]
    Aborted,
    #[error("world facade: {0}")]
    Facade(FacadeError),
}

impl From<FacadeError> for TaskError {
    fn from(err: FacadeError) -> Self {
        match err {
            FacadeError::Nav(nav) => TaskError::Nav(nav),
            other => TaskError::Facade(other),
        }
    }
}

impl TaskError {
    /// Transient failures are retried a few times before the plan fails.
    pub fn is_transient(&self) -> bool {
        matches!(self, TaskError::Nav(_) | TaskError::Placement { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockhand_core::{ToolKind, ToolTier};

    #[test]
    fn facade_nav_errors_collapse_into_nav() {
        let err: TaskError = FacadeError::Nav(NavError::Unreachable).into();
        assert_eq!(err, TaskError::Nav(NavError::Unreachable));
        assert!(err.is_transient());
    }

    #[test]
    fn resolver_errors_are_not_transient() {
        let err: TaskError = ResolveError::Unsatisfiable {
            item: Item::new("bedrock"),
        }
        .into();
        assert!(!err.is_transient());
    }

    #[test]
    fn messages_name_the_problem() {
        let err = TaskError::ToolMissing {
            requirement: ToolRequirement::new(ToolKind::Pickaxe, ToolTier::Iron),
        };
        assert_eq!(err.to_string(), "missing required tool (pickaxe tier iron)");

        let err = TaskError::Placement {
            pos: BlockPos::new(1, 2, 3),
            reason: PlacementReason::VerifyMismatch,
        };
        assert_eq!(
            err.to_string(),
            "placement failed at (1, 2, 3): placed block did not verify"
        );
    }
}
