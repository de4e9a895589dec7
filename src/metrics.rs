// 📊 Derived Metrics - pure arithmetic over the fixture records
//
// Burn rate, month progress, cash flow and category totals. Nothing here
// mutates state; every function is recomputed on demand by the front-ends.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

use crate::entities::{CategoryKey, Transaction};
use crate::error::{FinanceError, FinanceResult};
use crate::fixtures::{CategoryTrend, MonthlyTrend};

/// Width of the caution band around the expected usage, in percentage points
pub const CAUTION_BAND: i64 = 10;

// ============================================================================
// MONTH PROGRESS
// ============================================================================

/// Number of days in the month of `year`/`month` (1-based month)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthProgress {
    pub day_of_month: u32,
    pub days_in_month: u32,
}

impl MonthProgress {
    pub fn new(day_of_month: u32, days_in_month: u32) -> FinanceResult<Self> {
        if days_in_month == 0 {
            return Err(FinanceError::ZeroDaysInMonth);
        }
        if day_of_month == 0 || day_of_month > days_in_month {
            return Err(FinanceError::DayOutOfRange {
                day: day_of_month,
                days_in_month,
            });
        }
        Ok(MonthProgress {
            day_of_month,
            days_in_month,
        })
    }

    pub fn for_date(date: NaiveDate) -> Self {
        MonthProgress {
            day_of_month: date.day(),
            days_in_month: days_in_month(date.year(), date.month()),
        }
    }

    /// round(day_of_month / days_in_month × 100)
    pub fn percent(&self) -> i64 {
        (self.day_of_month as f64 / self.days_in_month as f64 * 100.0).round() as i64
    }
}

// ============================================================================
// BURN RATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnStatus {
    OnTrack,
    Caution,
    OverBudget,
}

impl BurnStatus {
    /// Headline shown next to the burn-rate card
    pub fn message(&self) -> &'static str {
        match self {
            BurnStatus::OnTrack => "You're on track",
            BurnStatus::Caution => "Watch your spending",
            BurnStatus::OverBudget => "Spending is high",
        }
    }

    /// Legend name
    pub fn label(&self) -> &'static str {
        match self {
            BurnStatus::OnTrack => "On Track",
            BurnStatus::Caution => "Caution",
            BurnStatus::OverBudget => "Over Budget",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BurnRate {
    pub budget_used: i64,
    pub progress: MonthProgress,
    pub expected_usage: i64,
    pub status: BurnStatus,
}

/// Compare the share of budget used with the share of the month elapsed.
pub fn classify_burn_rate(budget_used: u32, day_of_month: u32, days_in_month: u32) -> FinanceResult<BurnRate> {
    let progress = MonthProgress::new(day_of_month, days_in_month)?;
    Ok(burn_rate_for(budget_used, progress))
}

pub fn burn_rate_for(budget_used: u32, progress: MonthProgress) -> BurnRate {
    let expected_usage = progress.percent();
    let used = budget_used as i64;

    let status = if used <= expected_usage - CAUTION_BAND {
        BurnStatus::OnTrack
    } else if used <= expected_usage + CAUTION_BAND {
        BurnStatus::Caution
    } else {
        BurnStatus::OverBudget
    };

    BurnRate {
        budget_used: used,
        progress,
        expected_usage,
        status,
    }
}

// ============================================================================
// CASH FLOW & CATEGORY TOTALS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CashFlow {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

impl CashFlow {
    /// net / income, 0 when there is no income
    pub fn savings_rate(&self) -> f64 {
        if self.income > 0.0 {
            self.net / self.income
        } else {
            0.0
        }
    }
}

pub fn cash_flow(transactions: &[Transaction]) -> CashFlow {
    let mut flow = CashFlow::default();

    for tx in transactions {
        if tx.is_income() {
            flow.income += tx.amount;
        } else {
            flow.expenses += tx.amount.abs();
        }
    }

    flow.net = flow.income - flow.expenses;
    flow
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: CategoryKey,
    pub total: f64,
    pub count: usize,
}

/// Spending per category (magnitudes of negative amounts), largest first
pub fn category_totals(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<CategoryKey, (f64, usize)> = HashMap::new();

    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        let entry = totals.entry(tx.category).or_insert((0.0, 0));
        entry.0 += tx.amount.abs();
        entry.1 += 1;
    }

    let mut result: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal { category, total, count })
        .collect();

    result.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.category.cmp(&b.category))
    });
    result
}

// ============================================================================
// ANALYTICS SERIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyNet {
    pub month: String,
    pub net: f64,
}

pub fn monthly_net(trends: &[MonthlyTrend]) -> Vec<MonthlyNet> {
    trends
        .iter()
        .map(|t| MonthlyNet {
            month: t.month.clone(),
            net: t.income - t.expenses,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendSeries {
    Food,
    Transport,
    Fun,
    Shopping,
}

impl TrendSeries {
    pub const ALL: [TrendSeries; 4] = [
        TrendSeries::Food,
        TrendSeries::Transport,
        TrendSeries::Fun,
        TrendSeries::Shopping,
    ];

    pub fn value(&self, trend: &CategoryTrend) -> f64 {
        match self {
            TrendSeries::Food => trend.food,
            TrendSeries::Transport => trend.transport,
            TrendSeries::Fun => trend.fun,
            TrendSeries::Shopping => trend.shopping,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChange {
    pub series: TrendSeries,
    pub from_month: String,
    pub to_month: String,
    /// last − first (negative = spending went down)
    pub change: f64,
}

/// Change of one series between the first and last month; None with fewer than two months
pub fn trend_change(trends: &[CategoryTrend], series: TrendSeries) -> Option<TrendChange> {
    if trends.len() < 2 {
        return None;
    }
    let first = trends.first()?;
    let last = trends.last()?;

    Some(TrendChange {
        series,
        from_month: first.month.clone(),
        to_month: last.month.clone(),
        change: series.value(last) - series.value(first),
    })
}

// ============================================================================
// TESTS
// ============================================================================
