// 🗂️ Fixture Store - the static dataset every page renders
//
// Built-in data mirrors the dashboard's demo account. A JSON file with the same
// shape can replace it (see `config`); loaded files are validated before use.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::entities::{
    Alert, AlertType, BillingCycle, Budget, CategoryKey, Goal, Subscription, Transaction,
};
use crate::error::FinanceResult;

/// Donut slice: precomputed spending share for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: CategoryKey,
    pub amount: f64,
    pub percentage: u32,
}

/// Income vs. expenses for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
}

/// Per-series spending for one month of the analytics chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrend {
    pub month: String,
    pub food: f64,
    pub transport: f64,
    pub fun: f64,
    pub shopping: f64,
}

/// Overall budget usage for the running month (percent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentMonth {
    pub budget_used: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureStore {
    pub current_month: CurrentMonth,
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub subscriptions: Vec<Subscription>,
    pub goals: Vec<Goal>,
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub category_spending: Vec<CategorySpending>,
    #[serde(default)]
    pub monthly_trends: Vec<MonthlyTrend>,
    #[serde(default)]
    pub category_trends: Vec<CategoryTrend>,
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // Only called with literal dates below
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

impl FixtureStore {
    /// The built-in demo dataset
    pub fn builtin() -> Self {
        use CategoryKey::*;

        let transactions = vec![
            Transaction::new("1", "Grocery Store", -85.50, ymd(2023, 10, 25), Food),
            Transaction::new("2", "Uber Ride", -15.20, ymd(2023, 10, 24), Transport),
            Transaction::new("3", "Netflix Subscription", -14.99, ymd(2023, 10, 23), Entertainment),
            Transaction::new("4", "Salary Deposit", 3500.00, ymd(2023, 10, 20), Income),
            Transaction::new("5", "Gas Station", -45.00, ymd(2023, 10, 19), Transport),
            Transaction::new("6", "Amazon Purchase", -120.00, ymd(2023, 10, 18), Shopping),
        ];

        let budgets = vec![
            Budget::new(Housing, 1800.0, 1800.0),
            Budget::new(Food, 600.0, 455.92),
            Budget::new(Transport, 400.0, 320.0),
            Budget::new(Shopping, 500.0, 520.0),
            Budget::new(Entertainment, 200.0, 125.0),
            Budget::new(Utilities, 250.0, 204.0),
        ];

        let subscription = |id: &str, name: &str, amount: f64, next: NaiveDate, cycle: BillingCycle, icon: &str| Subscription {
            id: id.to_string(),
            name: name.to_string(),
            amount,
            next_payment: next,
            billing_cycle: cycle,
            icon: icon.to_string(),
        };
        let subscriptions = vec![
            subscription("1", "Netflix", 15.99, ymd(2024, 2, 1), BillingCycle::Monthly, "🎬"),
            subscription("2", "Spotify", 9.99, ymd(2024, 2, 5), BillingCycle::Monthly, "🎵"),
            subscription("3", "iCloud Storage", 2.99, ymd(2024, 2, 10), BillingCycle::Monthly, "☁️"),
            subscription("4", "Gym Membership", 49.00, ymd(2024, 2, 1), BillingCycle::Monthly, "🏋️"),
            subscription("5", "Amazon Prime", 139.00, ymd(2024, 6, 15), BillingCycle::Yearly, "📦"),
        ];

        let goal = |id: &str, name: &str, target: f64, current: f64, deadline: NaiveDate, icon: &str, color: &str| Goal {
            id: id.to_string(),
            name: name.to_string(),
            target,
            current,
            deadline,
            icon: icon.to_string(),
            color: color.to_string(),
        };
        let goals = vec![
            goal("1", "Emergency Fund", 10000.0, 6500.0, ymd(2024, 12, 31), "Shield", "#10B981"),
            goal("2", "New Car", 25000.0, 8000.0, ymd(2025, 6, 30), "Car", "#3B82F6"),
            goal("3", "Vacation", 3000.0, 1200.0, ymd(2024, 7, 1), "Plane", "#F59E0B"),
            goal("4", "New Laptop", 1000.0, 900.0, ymd(2024, 3, 15), "Laptop", "#8B5CF6"),
        ];

        let alert = |id: &str, alert_type: AlertType, title: &str, message: &str, date: NaiveDate, action: Option<&str>| Alert {
            id: id.to_string(),
            alert_type,
            title: title.to_string(),
            message: message.to_string(),
            date,
            action: action.map(str::to_string),
        };
        let alerts = vec![
            alert(
                "1",
                AlertType::Warning,
                "Shopping budget exceeded",
                "You've spent Birr 520 of your Birr 500 shopping budget this month.",
                ymd(2024, 1, 20),
                Some("Review budget"),
            ),
            alert(
                "2",
                AlertType::Info,
                "Upcoming subscription renewal",
                "Netflix (Birr 15.99) renews in 3 days.",
                ymd(2024, 1, 19),
                Some("Manage subscriptions"),
            ),
            alert(
                "3",
                AlertType::Success,
                "Savings milestone reached",
                "Your Emergency Fund passed 65% of its target.",
                ymd(2024, 1, 18),
                None,
            ),
            alert(
                "4",
                AlertType::Info,
                "Weekly report ready",
                "Your spending summary for last week is available.",
                ymd(2024, 1, 15),
                Some("View report"),
            ),
            alert(
                "5",
                AlertType::Success,
                "Transport spending down",
                "Transport costs dropped 16% over the last three months.",
                ymd(2024, 1, 12),
                None,
            ),
        ];

        let category_spending = vec![
            CategorySpending { category: Housing, amount: 1200.0, percentage: 40 },
            CategorySpending { category: Food, amount: 600.0, percentage: 20 },
            CategorySpending { category: Transport, amount: 300.0, percentage: 10 },
            CategorySpending { category: Shopping, amount: 450.0, percentage: 15 },
            CategorySpending { category: Health, amount: 150.0, percentage: 5 },
            CategorySpending { category: Utilities, amount: 300.0, percentage: 10 },
        ];

        let monthly_trends = [
            ("Aug", 5200.0, 4100.0),
            ("Sep", 5350.0, 3900.0),
            ("Oct", 5500.0, 3650.0),
            ("Nov", 5400.0, 4200.0),
            ("Dec", 6100.0, 4800.0),
            ("Jan", 5500.0, 2514.0),
        ]
        .into_iter()
        .map(|(month, income, expenses)| MonthlyTrend {
            month: month.to_string(),
            income,
            expenses,
        })
        .collect();

        let category_trends = [
            ("Aug", 520.0, 380.0, 180.0, 240.0),
            ("Sep", 480.0, 350.0, 220.0, 280.0),
            ("Oct", 450.0, 320.0, 150.0, 190.0),
            ("Nov", 580.0, 340.0, 200.0, 350.0),
            ("Dec", 650.0, 400.0, 280.0, 420.0),
            ("Jan", 455.0, 320.0, 125.0, 203.0),
        ]
        .into_iter()
        .map(|(month, food, transport, fun, shopping)| CategoryTrend {
            month: month.to_string(),
            food,
            transport,
            fun,
            shopping,
        })
        .collect();

        FixtureStore {
            current_month: CurrentMonth { budget_used: 65 },
            transactions,
            budgets,
            subscriptions,
            goals,
            alerts,
            category_spending,
            monthly_trends,
            category_trends,
        }
    }

    /// Load a dataset from a JSON file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file: {:?}", path))?;

        let store: FixtureStore = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse fixture JSON: {:?}", path))?;

        store
            .validate()
            .with_context(|| format!("Invalid fixture data in {:?}", path))?;

        info!(
            path = %path.display(),
            transactions = store.transactions.len(),
            budgets = store.budgets.len(),
            goals = store.goals.len(),
            alerts = store.alerts.len(),
            "fixtures loaded"
        );

        Ok(store)
    }

    /// Built-in data unless a file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Check every record whose arithmetic could divide by zero or break an invariant
    pub fn validate(&self) -> FinanceResult<()> {
        for budget in &self.budgets {
            budget.validate()?;
        }
        for goal in &self.goals {
            goal.validate()?;
        }
        Ok(())
    }
}

impl Default for FixtureStore {
    fn default() -> Self {
        Self::builtin()
    }
}
