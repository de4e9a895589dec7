// ⚙️ Settings - display currency, profile and notification toggles
// Held in memory only; a restart brings back the defaults.

use num_format::{Locale, ToFormattedString as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::USD, Currency::EUR, Currency::GBP, Currency::CAD];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CAD => "CAD",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::CAD => "C$",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::USD => "US Dollar",
            Currency::EUR => "Euro",
            Currency::GBP => "British Pound",
            Currency::CAD => "Canadian Dollar",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| ParseError::Currency(s.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BudgetAlerts,
    WeeklyReport,
    UnusualSpending,
    BillReminders,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::BudgetAlerts,
        NotificationKind::WeeklyReport,
        NotificationKind::UnusualSpending,
        NotificationKind::BillReminders,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::BudgetAlerts => "Budget Alerts",
            NotificationKind::WeeklyReport => "Weekly Report",
            NotificationKind::UnusualSpending => "Unusual Spending",
            NotificationKind::BillReminders => "Bill Reminders",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            NotificationKind::BudgetAlerts => "Get notified when approaching budget limits",
            NotificationKind::WeeklyReport => "Receive a summary every Sunday",
            NotificationKind::UnusualSpending => "Alert for suspicious or high transactions",
            NotificationKind::BillReminders => "Get reminded before subscription renewals",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "budget_alerts" => Ok(NotificationKind::BudgetAlerts),
            "weekly_report" => Ok(NotificationKind::WeeklyReport),
            "unusual_spending" => Ok(NotificationKind::UnusualSpending),
            "bill_reminders" => Ok(NotificationKind::BillReminders),
            other => Err(ParseError::Notification(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub budget_alerts: bool,
    pub weekly_report: bool,
    pub unusual_spending: bool,
    pub bill_reminders: bool,
}

impl Default for NotificationPrefs {
    fn default() -> Self {
        NotificationPrefs {
            budget_alerts: true,
            weekly_report: true,
            unusual_spending: true,
            bill_reminders: false,
        }
    }
}

impl NotificationPrefs {
    pub fn get(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::BudgetAlerts => self.budget_alerts,
            NotificationKind::WeeklyReport => self.weekly_report,
            NotificationKind::UnusualSpending => self.unusual_spending,
            NotificationKind::BillReminders => self.bill_reminders,
        }
    }

    fn slot(&mut self, kind: NotificationKind) -> &mut bool {
        match kind {
            NotificationKind::BudgetAlerts => &mut self.budget_alerts,
            NotificationKind::WeeklyReport => &mut self.weekly_report,
            NotificationKind::UnusualSpending => &mut self.unusual_spending,
            NotificationKind::BillReminders => &mut self.bill_reminders,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub profile_name: String,
    pub currency: Currency,
    pub notifications: NotificationPrefs,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            profile_name: "Alex Johnson".to_string(),
            currency: Currency::default(),
            notifications: NotificationPrefs::default(),
        }
    }
}

impl Settings {
    pub fn set_currency(&mut self, currency: Currency) {
        info!(from = %self.currency, to = %currency, "currency changed");
        self.currency = currency;
    }

    /// Flip one notification flag and return its new value
    pub fn toggle(&mut self, kind: NotificationKind) -> bool {
        let slot = self.notifications.slot(kind);
        *slot = !*slot;
        let enabled = *slot;
        info!(notification = kind.title(), enabled, "notification toggled");
        enabled
    }

    pub fn format_amount(&self, amount: f64) -> String {
        format_money(amount, self.currency)
    }
}

/// "-$1,234.50" style formatting: sign, symbol, thousands separators, two decimals
pub fn format_money(amount: f64, currency: Currency) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let grouped = (cents / 100).to_formatted_string(&Locale::en);
    let fraction = cents % 100;

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}{}.{:02}", sign, currency.symbol(), grouped, fraction)
}
