// Domain errors shared by every module of the library.
// Binaries and loaders wrap these in anyhow; pure functions return them directly.

use crate::entities::CategoryKey;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FinanceError {
    #[error("budget for {0} has a zero limit")]
    ZeroBudgetLimit(CategoryKey),

    #[error("budget for {category} has negative spending ({spent})")]
    NegativeSpending { category: CategoryKey, spent: f64 },

    #[error("goal {0} has a zero target")]
    ZeroGoalTarget(String),

    #[error("goal {goal} holds {current}, above its target of {target}")]
    GoalAboveTarget { goal: String, current: f64, target: f64 },

    #[error("a month cannot have zero days")]
    ZeroDaysInMonth,

    #[error("day {day} is outside a month of {days_in_month} days")]
    DayOutOfRange { day: u32, days_in_month: u32 },

    #[error("contribution must be a positive amount, got {0}")]
    InvalidContribution(f64),

    #[error("goal not found: {0}")]
    GoalNotFound(String),

    #[error("alert not found: {0}")]
    AlertNotFound(String),

    #[error("message is empty")]
    EmptyMessage,

    #[error("coach is still typing a reply")]
    CoachBusy,
}

/// Text that names none of the values of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown alert type: {0}")]
    AlertType(String),

    #[error("unsupported currency: {0}")]
    Currency(String),

    #[error("unknown notification: {0}")]
    Notification(String),
}

pub type FinanceResult<T> = std::result::Result<T, FinanceError>;
