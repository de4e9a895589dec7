// 🧭 Workspace - the in-memory state behind every page
//
// One workspace per session. The fixture store is read-only; goals, alerts,
// the chat transcript, settings and the search state are local copies that
// reset when the process restarts.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::coach::{CannedResponder, CoachSession};
use crate::entities::{
    AlertBoard, Budget, BudgetStatus, BudgetSummary, CategoryKey, CategoryRegistry, Contribution,
    Goal, Subscription, Transaction,
};
use crate::entities::subscription::total_monthly_cost;
use crate::error::{FinanceError, FinanceResult};
use crate::filter::{CategorySelector, TransactionFilter};
use crate::fixtures::{CategorySpending, CategoryTrend, FixtureStore, MonthlyTrend};
use crate::import::{self, ImportReport};
use crate::metrics::{
    self, BurnRate, CashFlow, CategoryTotal, MonthProgress, MonthlyNet, TrendChange, TrendSeries,
};
use crate::settings::Settings;

/// Number of rows in the dashboard's "recent transactions" card
pub const RECENT_TRANSACTIONS: usize = 5;

/// One row of the budgets page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetRow {
    pub category: CategoryKey,
    pub name: String,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: u32,
    pub fill: u32,
    pub status: BudgetStatus,
}

impl BudgetRow {
    fn from_budget(budget: &Budget, categories: &CategoryRegistry) -> FinanceResult<Self> {
        Ok(BudgetRow {
            category: budget.category,
            name: categories.name_of(budget.category),
            limit: budget.limit,
            spent: budget.spent,
            remaining: budget.remaining(),
            percentage: budget.percentage()?,
            fill: budget.fill()?,
            status: budget.status()?,
        })
    }
}

/// Everything the dashboard page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub cash_flow: CashFlow,
    pub savings_rate: f64,
    pub burn_rate: BurnRate,
    pub budgets: BudgetSummary,
    pub recent_transactions: Vec<Transaction>,
    pub category_spending: Vec<CategorySpending>,
    pub category_totals: Vec<CategoryTotal>,
    pub monthly_subscriptions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub monthly_trends: Vec<MonthlyTrend>,
    pub monthly_net: Vec<MonthlyNet>,
    pub category_trends: Vec<CategoryTrend>,
    pub changes: Vec<TrendChange>,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    store: FixtureStore,
    categories: CategoryRegistry,
    goals: Vec<Goal>,
    alerts: AlertBoard,
    filter: TransactionFilter,
    coach: CoachSession,
    settings: Settings,
    today: NaiveDate,
}

impl Workspace {
    pub fn new(store: FixtureStore, coach_delay: Duration, today: NaiveDate) -> Self {
        let goals = store.goals.clone();
        let alerts = AlertBoard::new(store.alerts.clone());
        let coach = CoachSession::new(Arc::new(CannedResponder::builtin()), coach_delay);

        Workspace {
            store,
            categories: CategoryRegistry::with_defaults(),
            goals,
            alerts,
            filter: TransactionFilter::default(),
            coach,
            settings: Settings::default(),
            today,
        }
    }

    /// Load fixtures (built-in or from `data`) and validate them
    pub fn load(data: Option<&Path>, coach_delay: Duration, today: NaiveDate) -> Result<Self> {
        let store = FixtureStore::load(data)?;
        store.validate()?;
        Ok(Self::new(store, coach_delay, today))
    }

    pub fn store(&self) -> &FixtureStore {
        &self.store
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    // ------------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------------

    pub fn transactions(&self) -> &[Transaction] {
        &self.store.transactions
    }

    pub fn filter(&self) -> &TransactionFilter {
        &self.filter
    }

    pub fn set_query(&mut self, query: &str) {
        self.filter.query = query.to_string();
        debug!(query, "transaction search changed");
    }

    pub fn set_category(&mut self, category: CategorySelector) {
        self.filter.category = category;
        debug!(category = %category, "transaction category changed");
    }

    pub fn set_filter(&mut self, filter: TransactionFilter) {
        debug!(query = %filter.query, category = %filter.category, "transaction filter replaced");
        self.filter = filter;
    }

    pub fn filtered_transactions(&self) -> Vec<&Transaction> {
        self.filter.apply(&self.store.transactions)
    }

    /// Read a CSV file and append the rows that are not already present
    pub fn import_csv(&mut self, path: &Path) -> Result<ImportReport> {
        let report = import::load_csv(path, &self.store.transactions)?;
        self.store.transactions.extend(report.imported.iter().cloned());
        info!(total = self.store.transactions.len(), "transactions after import");
        Ok(report)
    }

    // ------------------------------------------------------------------------
    // Budgets
    // ------------------------------------------------------------------------

    pub fn budget_rows(&self) -> FinanceResult<Vec<BudgetRow>> {
        self.store
            .budgets
            .iter()
            .map(|budget| BudgetRow::from_budget(budget, &self.categories))
            .collect()
    }

    pub fn budget_summary(&self) -> FinanceResult<BudgetSummary> {
        BudgetSummary::from_budgets(&self.store.budgets)
    }

    pub fn burn_rate(&self) -> BurnRate {
        metrics::burn_rate_for(self.store.current_month.budget_used, MonthProgress::for_date(self.today))
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.store.subscriptions
    }

    // ------------------------------------------------------------------------
    // Goals
    // ------------------------------------------------------------------------

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, id: &str) -> FinanceResult<&Goal> {
        self.goals
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| FinanceError::GoalNotFound(id.to_string()))
    }

    pub fn add_to_goal(&mut self, id: &str, amount: f64) -> FinanceResult<Contribution> {
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| {
                warn!(goal = id, "contribution for unknown goal");
                FinanceError::GoalNotFound(id.to_string())
            })?;
        goal.contribute(amount)
    }

    // ------------------------------------------------------------------------
    // Alerts, coach, settings
    // ------------------------------------------------------------------------

    pub fn alerts(&self) -> &AlertBoard {
        &self.alerts
    }

    pub fn dismiss_alert(&mut self, id: &str) -> FinanceResult<()> {
        self.alerts.dismiss(id).map(|_| ())
    }

    pub fn coach(&self) -> &CoachSession {
        &self.coach
    }

    pub fn coach_mut(&mut self) -> &mut CoachSession {
        &mut self.coach
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Amount in the selected display currency
    pub fn money(&self, amount: f64) -> String {
        self.settings.format_amount(amount)
    }

    // ------------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------------

    pub fn overview(&self) -> FinanceResult<Overview> {
        let cash_flow = metrics::cash_flow(&self.store.transactions);

        Ok(Overview {
            savings_rate: cash_flow.savings_rate(),
            cash_flow,
            burn_rate: self.burn_rate(),
            budgets: self.budget_summary()?,
            recent_transactions: self
                .store
                .transactions
                .iter()
                .take(RECENT_TRANSACTIONS)
                .cloned()
                .collect(),
            category_spending: self.store.category_spending.clone(),
            category_totals: metrics::category_totals(&self.store.transactions),
            monthly_subscriptions: total_monthly_cost(&self.store.subscriptions),
        })
    }

    pub fn analytics(&self) -> Analytics {
        let trends = &self.store.category_trends;

        Analytics {
            monthly_trends: self.store.monthly_trends.clone(),
            monthly_net: metrics::monthly_net(&self.store.monthly_trends),
            category_trends: trends.clone(),
            changes: TrendSeries::ALL
                .iter()
                .filter_map(|series| metrics::trend_change(trends, *series))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AlertType;
    use crate::metrics::BurnStatus;
    use std::io::Write;

    fn workspace() -> Workspace {
        let today = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        Workspace::new(FixtureStore::builtin(), Duration::ZERO, today)
    }

    #[test]
    fn test_budget_rows() {
        let ws = workspace();
        let rows = ws.budget_rows().unwrap();

        let shopping = rows.iter().find(|r| r.category == CategoryKey::Shopping).unwrap();
        assert_eq!(shopping.percentage, 104);
        assert_eq!(shopping.fill, 100);
        assert_eq!(shopping.status, BudgetStatus::Over);
        assert_eq!(shopping.remaining, -20.0);

        let food = rows.iter().find(|r| r.category == CategoryKey::Food).unwrap();
        assert_eq!(food.name, "Food & Dining");
        assert_eq!(food.percentage, 76);
        assert_eq!(food.status, BudgetStatus::Under);
    }

    #[test]
    fn test_burn_rate_uses_today() {
        // Jan 20 → 65% of the month elapsed, 65% used: inside the caution band
        let ws = workspace();
        let rate = ws.burn_rate();

        assert_eq!(rate.expected_usage, 65);
        assert_eq!(rate.status, BurnStatus::Caution);

        let month_end = Workspace::new(
            FixtureStore::builtin(),
            Duration::ZERO,
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        assert_eq!(month_end.burn_rate().status, BurnStatus::OnTrack);
    }

    #[test]
    fn test_filter_state() {
        let mut ws = workspace();
        ws.set_query("uber");
        assert_eq!(ws.filtered_transactions().len(), 1);

        ws.set_query("");
        ws.set_category(CategorySelector::Only(CategoryKey::Transport));
        let ids: Vec<_> = ws.filtered_transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "5"]);
    }

    #[test]
    fn test_add_to_goal_clamps_and_reports_once() {
        let mut ws = workspace();

        let first = ws.add_to_goal("4", 500.0).unwrap();
        assert_eq!(first.current, 1000.0);
        assert!(first.reached_target);

        let second = ws.add_to_goal("4", 100.0).unwrap();
        assert_eq!(second.current, 1000.0);
        assert!(!second.reached_target);
        assert!(ws.goal("4").unwrap().is_complete());

        // Fixture store keeps the original value
        assert_eq!(ws.store().goals[3].current, 900.0);
    }

    #[test]
    fn test_add_to_missing_goal() {
        let mut ws = workspace();
        assert_eq!(
            ws.add_to_goal("99", 100.0),
            Err(FinanceError::GoalNotFound("99".to_string()))
        );
    }

    #[test]
    fn test_alerts() {
        let mut ws = workspace();
        let warnings = ws.alerts().filter(Some(AlertType::Warning));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].id, "1");

        ws.dismiss_alert("1").unwrap();
        assert_eq!(ws.alerts().count(AlertType::Warning), 0);
        assert!(ws.dismiss_alert("1").is_err());
    }

    #[test]
    fn test_overview() {
        let ws = workspace();
        let overview = ws.overview().unwrap();

        assert_eq!(overview.recent_transactions.len(), RECENT_TRANSACTIONS);
        assert_eq!(overview.recent_transactions[0].id, "1");
        assert_eq!(overview.cash_flow.income, 3500.0);
        assert!((overview.cash_flow.expenses - 280.69).abs() < 1e-9);
        assert_eq!(overview.budgets.over, 1);
        assert_eq!(overview.category_totals[0].category, CategoryKey::Shopping);
    }

    #[test]
    fn test_analytics_changes() {
        let ws = workspace();
        let analytics = ws.analytics();

        assert_eq!(analytics.monthly_net.len(), 6);
        assert_eq!(analytics.monthly_net[5].net, 2986.0);

        let transport = analytics
            .changes
            .iter()
            .find(|c| c.series == TrendSeries::Transport)
            .unwrap();
        assert_eq!(transport.change, -60.0);
    }

    #[test]
    fn test_money_follows_currency() {
        let mut ws = workspace();
        assert_eq!(ws.money(-85.5), "-$85.50");

        ws.settings_mut().set_currency(crate::settings::Currency::EUR);
        assert_eq!(ws.money(3500.0), "€3,500.00");
    }

    #[test]
    fn test_import_csv_appends_new_rows() {
        let path = std::env::temp_dir().join(format!("zenspend-import-{}.csv", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "id,description,amount,date,category").unwrap();
        writeln!(file, "7,Pharmacy,-22.10,2023-10-27,health").unwrap();
        writeln!(file, "8,Uber Ride,-15.20,2023-10-24,transport").unwrap();
        drop(file);

        let mut ws = workspace();
        let report = ws.import_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(ws.transactions().len(), 7);
    }

    #[tokio::test]
    async fn test_coach_through_workspace() {
        let mut ws = workspace();
        let answer = ws.coach_mut().ask("Where can I cut expenses?").await.unwrap();

        assert!(answer.content.contains("Subscriptions"));
        assert_eq!(ws.coach().messages().len(), 3);
    }
}
