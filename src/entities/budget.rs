// 💸 Budget Entity - monthly spending limit per category

use serde::{Deserialize, Serialize};

use super::CategoryKey;
use crate::error::{FinanceError, FinanceResult};

/// Percentage above which a budget counts as close to its limit
pub const NEAR_LIMIT_THRESHOLD: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Under,
    NearLimit,
    Over,
}

impl BudgetStatus {
    /// Over: > 100 %. Near limit: (80 %, 100 %]. Under: everything else.
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage > 100 {
            BudgetStatus::Over
        } else if percentage > NEAR_LIMIT_THRESHOLD {
            BudgetStatus::NearLimit
        } else {
            BudgetStatus::Under
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BudgetStatus::Under => "On budget",
            BudgetStatus::NearLimit => "Near limit",
            BudgetStatus::Over => "Over budget",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: CategoryKey,
    pub limit: f64,
    pub spent: f64,
}

impl Budget {
    pub fn new(category: CategoryKey, limit: f64, spent: f64) -> Self {
        Budget { category, limit, spent }
    }

    /// Reject budgets whose percentage cannot be computed
    pub fn validate(&self) -> FinanceResult<()> {
        if self.limit <= 0.0 || !self.limit.is_finite() {
            return Err(FinanceError::ZeroBudgetLimit(self.category));
        }
        if self.spent < 0.0 {
            return Err(FinanceError::NegativeSpending {
                category: self.category,
                spent: self.spent,
            });
        }
        Ok(())
    }

    /// round(spent / limit × 100)
    pub fn percentage(&self) -> FinanceResult<u32> {
        self.validate()?;
        Ok((self.spent / self.limit * 100.0).round() as u32)
    }

    pub fn status(&self) -> FinanceResult<BudgetStatus> {
        self.percentage().map(BudgetStatus::from_percentage)
    }

    /// Progress bar fill, capped at 100
    pub fn fill(&self) -> FinanceResult<u32> {
        self.percentage().map(|p| p.min(100))
    }

    /// Money left in this budget; negative once over
    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }
}

/// Totals across a set of budgets
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub total_limit: f64,
    pub total_spent: f64,
    pub under: usize,
    pub near_limit: usize,
    pub over: usize,
}

impl BudgetSummary {
    pub fn from_budgets(budgets: &[Budget]) -> FinanceResult<Self> {
        let mut summary = BudgetSummary::default();

        for budget in budgets {
            summary.total_limit += budget.limit;
            summary.total_spent += budget.spent;
            match budget.status()? {
                BudgetStatus::Under => summary.under += 1,
                BudgetStatus::NearLimit => summary.near_limit += 1,
                BudgetStatus::Over => summary.over += 1,
            }
        }

        Ok(summary)
    }

    pub fn remaining(&self) -> f64 {
        self.total_limit - self.total_spent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_budget_example() {
        let budget = Budget::new(CategoryKey::Shopping, 500.0, 520.0);

        assert_eq!(budget.percentage(), Ok(104));
        assert_eq!(budget.status(), Ok(BudgetStatus::Over));
        assert_eq!(budget.fill(), Ok(100));
        assert_eq!(budget.remaining(), -20.0);
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(BudgetStatus::from_percentage(0), BudgetStatus::Under);
        assert_eq!(BudgetStatus::from_percentage(80), BudgetStatus::Under);
        assert_eq!(BudgetStatus::from_percentage(81), BudgetStatus::NearLimit);
        assert_eq!(BudgetStatus::from_percentage(100), BudgetStatus::NearLimit);
        assert_eq!(BudgetStatus::from_percentage(101), BudgetStatus::Over);
    }

    #[test]
    fn test_percentage_rounds() {
        // 455.92 / 600 = 75.99 %
        let food = Budget::new(CategoryKey::Food, 600.0, 455.92);
        assert_eq!(food.percentage(), Ok(76));

        // 80.4 % rounds down into "under"
        let edge = Budget::new(CategoryKey::Health, 1000.0, 804.0);
        assert_eq!(edge.status(), Ok(BudgetStatus::Under));

        // 80.5 % rounds up to 81 and becomes "near limit"
        let edge = Budget::new(CategoryKey::Health, 1000.0, 805.0);
        assert_eq!(edge.status(), Ok(BudgetStatus::NearLimit));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let budget = Budget::new(CategoryKey::Misc, 0.0, 10.0);

        assert_eq!(budget.percentage(), Err(FinanceError::ZeroBudgetLimit(CategoryKey::Misc)));
        assert!(budget.status().is_err());
    }

    #[test]
    fn test_negative_spending_rejected() {
        let budget = Budget::new(CategoryKey::Food, 100.0, -5.0);
        assert!(matches!(budget.percentage(), Err(FinanceError::NegativeSpending { .. })));
    }

    #[test]
    fn test_percentage_never_negative_and_consistent() {
        let samples = [(500.0, 0.0), (500.0, 399.0), (500.0, 450.0), (500.0, 500.0), (1.0, 3.0)];

        for (limit, spent) in samples {
            let budget = Budget::new(CategoryKey::Food, limit, spent);
            let pct = budget.percentage().unwrap();
            let status = budget.status().unwrap();
            match status {
                BudgetStatus::Over => assert!(pct > 100),
                BudgetStatus::NearLimit => assert!(pct > 80 && pct <= 100),
                BudgetStatus::Under => assert!(pct <= 80),
            }
        }
    }

    #[test]
    fn test_summary_counts() {
        let budgets = vec![
            Budget::new(CategoryKey::Housing, 1800.0, 1800.0),
            Budget::new(CategoryKey::Food, 600.0, 455.92),
            Budget::new(CategoryKey::Shopping, 500.0, 520.0),
        ];

        let summary = BudgetSummary::from_budgets(&budgets).unwrap();
        assert_eq!(summary.under, 1);
        assert_eq!(summary.near_limit, 1);
        assert_eq!(summary.over, 1);
        assert_eq!(summary.total_limit, 2900.0);
        assert!((summary.remaining() - 124.08).abs() < 1e-9);
    }
}
