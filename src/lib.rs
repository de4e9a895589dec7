// ZenSpend - Core Library
// Exposes all modules for use in the terminal dashboard, API server, and tests

pub mod error;
pub mod entities;
pub mod fixtures;
pub mod metrics;        // Burn rate, cash flow, trend math
pub mod filter;         // Transaction search
pub mod coach;          // Canned financial coach
pub mod settings;
pub mod import;         // CSV import with fingerprint dedup
pub mod config;
pub mod app;            // Workspace: per-session state

// Re-export commonly used types
pub use error::{FinanceError, FinanceResult, ParseError};
pub use entities::{
    Alert, AlertBoard, AlertCounts, AlertType,
    Budget, BudgetStatus, BudgetSummary,
    Category, CategoryKey, CategoryRegistry, CategoryType,
    Contribution, Goal, GoalIcon, CONTRIBUTION_PRESETS,
    BillingCycle, Subscription,
    Transaction,
};
pub use fixtures::{CategorySpending, CategoryTrend, CurrentMonth, FixtureStore, MonthlyTrend};
pub use metrics::{
    classify_burn_rate, burn_rate_for, cash_flow, category_totals,
    BurnRate, BurnStatus, CashFlow, CategoryTotal, MonthProgress, TrendChange, TrendSeries,
};
pub use filter::{CategorySelector, TransactionFilter};
pub use coach::{
    CannedResponder, ChatMessage, CoachSession, CoachState, PendingReply, Reply, Role,
    SUGGESTED_QUESTIONS,
};
pub use settings::{Currency, NotificationKind, NotificationPrefs, Settings};
pub use import::{load_csv, read_transactions, ImportReport};
pub use app::{Analytics, BudgetRow, Overview, Workspace};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
