// Subscription Entity - recurring charges shown on the budget page

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "Monthly",
            BillingCycle::Yearly => "Yearly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    /// Amount charged once per billing cycle
    pub amount: f64,
    pub next_payment: NaiveDate,
    pub billing_cycle: BillingCycle,
    pub icon: String,
}

impl Subscription {
    /// Cost spread over one month
    pub fn monthly_cost(&self) -> f64 {
        match self.billing_cycle {
            BillingCycle::Monthly => self.amount,
            BillingCycle::Yearly => self.amount / 12.0,
        }
    }

    /// Days until the next charge; negative once the date has passed
    pub fn days_until_payment(&self, today: NaiveDate) -> i64 {
        (self.next_payment - today).num_days()
    }
}

/// Sum of the per-cycle amounts, as the budget page lists them
pub fn total_amount(subscriptions: &[Subscription]) -> f64 {
    subscriptions.iter().map(|s| s.amount).sum()
}

/// Sum of monthly-equivalent costs
pub fn total_monthly_cost(subscriptions: &[Subscription]) -> f64 {
    subscriptions.iter().map(Subscription::monthly_cost).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(amount: f64, cycle: BillingCycle, next: &str) -> Subscription {
        Subscription {
            id: "s".to_string(),
            name: "Test".to_string(),
            amount,
            next_payment: NaiveDate::parse_from_str(next, "%Y-%m-%d").unwrap(),
            billing_cycle: cycle,
            icon: "📺".to_string(),
        }
    }

    #[test]
    fn test_monthly_cost() {
        assert_eq!(subscription(15.99, BillingCycle::Monthly, "2024-02-01").monthly_cost(), 15.99);
        assert_eq!(subscription(120.0, BillingCycle::Yearly, "2024-06-01").monthly_cost(), 10.0);
    }

    #[test]
    fn test_totals() {
        let subs = vec![
            subscription(10.0, BillingCycle::Monthly, "2024-02-01"),
            subscription(120.0, BillingCycle::Yearly, "2024-06-01"),
        ];

        assert_eq!(total_amount(&subs), 130.0);
        assert_eq!(total_monthly_cost(&subs), 20.0);
        assert_eq!(total_amount(&[]), 0.0);
    }

    #[test]
    fn test_days_until_payment() {
        let sub = subscription(9.99, BillingCycle::Monthly, "2024-02-01");
        let today = NaiveDate::from_ymd_opt(2024, 1, 29).unwrap();

        assert_eq!(sub.days_until_payment(today), 3);
        assert_eq!(sub.days_until_payment(NaiveDate::from_ymd_opt(2024, 2, 3).unwrap()), -2);
    }
}
