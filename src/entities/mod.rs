// Entity Models
// Plain data records behind every dashboard page. Each module owns the
// arithmetic that belongs to its record (budget percentage, goal clamping, ...).

pub mod alert;
pub mod budget;
pub mod category;
pub mod goal;
pub mod subscription;
pub mod transaction;

pub use alert::{Alert, AlertBoard, AlertCounts, AlertType};
pub use budget::{Budget, BudgetStatus, BudgetSummary};
pub use category::{Category, CategoryKey, CategoryRegistry, CategoryType};
pub use goal::{Contribution, Goal, GoalIcon, CONTRIBUTION_PRESETS};
pub use subscription::{BillingCycle, Subscription};
pub use transaction::Transaction;
