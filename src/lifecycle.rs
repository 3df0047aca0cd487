//! Order/booking transition table.
//!
//! [`transition`] is the only place that knows which operation may move an
//! order from which status. Services load and lock rows, check ownership, ask
//! this module for the resulting flips and persist them.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::entity::sea_orm_active_enums::OrderStatus;

/// Who is allowed to drive an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Customer,
    Business,
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Cancel,
    ResetToPending,
    RequestCancel,
    RefundIfEligible,
    ApproveCancel,
    RejectCancel,
    MarkPaid,
    MarkRefunded,
    RejectOrder,
    UnrejectOrder,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::Cancel,
        Operation::ResetToPending,
        Operation::RequestCancel,
        Operation::RefundIfEligible,
        Operation::ApproveCancel,
        Operation::RejectCancel,
        Operation::MarkPaid,
        Operation::MarkRefunded,
        Operation::RejectOrder,
        Operation::UnrejectOrder,
    ];

    pub fn actor(&self) -> Actor {
        match self {
            Operation::Cancel | Operation::ResetToPending | Operation::RequestCancel => {
                Actor::Customer
            }
            Operation::RefundIfEligible => Actor::Either,
            Operation::ApproveCancel
            | Operation::RejectCancel
            | Operation::MarkPaid
            | Operation::MarkRefunded
            | Operation::RejectOrder
            | Operation::UnrejectOrder => Actor::Business,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Cancel => "cancel",
            Operation::ResetToPending => "reset_to_pending",
            Operation::RequestCancel => "request_cancel",
            Operation::RefundIfEligible => "refund_if_eligible",
            Operation::ApproveCancel => "approve_cancel",
            Operation::RejectCancel => "reject_cancel",
            Operation::MarkPaid => "mark_paid",
            Operation::MarkRefunded => "mark_refunded",
            Operation::RejectOrder => "reject_order",
            Operation::UnrejectOrder => "unreject_order",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Operation::Cancel => "cancel",
            Operation::ResetToPending => "reset to pending",
            Operation::RequestCancel => "request cancellation of",
            Operation::RefundIfEligible => "refund",
            Operation::ApproveCancel => "approve cancellation of",
            Operation::RejectCancel => "reject cancellation of",
            Operation::MarkPaid => "mark as paid",
            Operation::MarkRefunded => "mark as refunded",
            Operation::RejectOrder => "reject",
            Operation::UnrejectOrder => "unreject",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a permitted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Already in the target state; nothing is written.
    Noop,
    /// Statuses to move through, in order. Each step is persisted and
    /// recorded separately.
    Apply(Vec<OrderStatus>),
}

impl Transition {
    pub fn steps(&self) -> &[OrderStatus] {
        match self {
            Transition::Noop => &[],
            Transition::Apply(steps) => steps,
        }
    }

    pub fn final_status(&self) -> Option<OrderStatus> {
        self.steps().last().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot {} an order that is {from}", .operation.verb())]
    NotAllowed {
        operation: Operation,
        from: OrderStatus,
    },
}

fn to(status: OrderStatus) -> Result<Transition, TransitionError> {
    Ok(Transition::Apply(vec![status]))
}

fn noop() -> Result<Transition, TransitionError> {
    Ok(Transition::Noop)
}

pub fn transition(operation: Operation, from: OrderStatus) -> Result<Transition, TransitionError> {
    use OrderStatus::*;

    let conflict = || -> Result<Transition, TransitionError> {
        Err(TransitionError::NotAllowed { operation, from })
    };

    match operation {
        Operation::Cancel => match from {
            Pending | CancelRequested => to(Canceled),
            Canceled => noop(),
            Completed | Rejected | Refunded => conflict(),
        },
        Operation::ResetToPending => match from {
            Pending => noop(),
            CancelRequested | Canceled | Rejected => to(Pending),
            Completed | Refunded => conflict(),
        },
        Operation::RequestCancel => match from {
            Pending => to(CancelRequested),
            CancelRequested | Canceled => noop(),
            Completed | Rejected | Refunded => conflict(),
        },
        Operation::RefundIfEligible => match from {
            Pending | CancelRequested => Ok(Transition::Apply(vec![Canceled, Refunded])),
            Canceled => to(Refunded),
            Refunded => noop(),
            Completed | Rejected => conflict(),
        },
        Operation::ApproveCancel => match from {
            CancelRequested => to(Canceled),
            Canceled => noop(),
            Pending | Completed | Rejected | Refunded => conflict(),
        },
        Operation::RejectCancel => match from {
            CancelRequested => to(Pending),
            Completed => noop(),
            Pending | Canceled | Rejected | Refunded => conflict(),
        },
        Operation::MarkPaid => match from {
            Pending | CancelRequested | Canceled | Rejected => to(Completed),
            Completed => noop(),
            Refunded => conflict(),
        },
        Operation::MarkRefunded => match from {
            Refunded => noop(),
            _ => to(Refunded),
        },
        Operation::RejectOrder => match from {
            Pending | CancelRequested | Canceled => to(Rejected),
            Rejected => noop(),
            Completed | Refunded => conflict(),
        },
        Operation::UnrejectOrder => match from {
            Canceled | Rejected => to(Pending),
            Pending | CancelRequested | Completed | Refunded => conflict(),
        },
    }
}
