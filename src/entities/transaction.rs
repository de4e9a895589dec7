// Transaction Entity - a single signed cash movement
// Positive amounts are income, negative amounts are spending.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::CategoryKey;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    /// Signed amount (negative = money going out)
    pub amount: f64,
    pub date: NaiveDate,
    pub category: CategoryKey,
}

impl Transaction {
    pub fn new(id: &str, description: &str, amount: f64, date: NaiveDate, category: CategoryKey) -> Self {
        Transaction {
            id: id.to_string(),
            description: description.to_string(),
            amount,
            date,
            category,
        }
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Compute a content fingerprint for duplicate detection.
    /// Two rows with the same date, amount, description and category collide
    /// regardless of their ids.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{:.2}|{}|{}",
            self.date,
            self.amount,
            self.description.trim().to_lowercase(),
            self.category
        ));
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_sign_helpers() {
        let salary = Transaction::new("4", "Salary Deposit", 3500.0, date("2023-10-20"), CategoryKey::Income);
        let uber = Transaction::new("2", "Uber Ride", -15.20, date("2023-10-24"), CategoryKey::Transport);

        assert!(salary.is_income());
        assert!(!salary.is_expense());
        assert!(uber.is_expense());
    }

    #[test]
    fn test_fingerprint_ignores_id_and_case() {
        let a = Transaction::new("1", "Grocery Store", -85.50, date("2023-10-25"), CategoryKey::Food);
        let b = Transaction::new("99", "GROCERY STORE ", -85.5, date("2023-10-25"), CategoryKey::Food);
        let c = Transaction::new("1", "Grocery Store", -85.50, date("2023-10-26"), CategoryKey::Food);

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_iso_date_serde() {
        let tx = Transaction::new("6", "Amazon Purchase", -120.0, date("2023-10-18"), CategoryKey::Shopping);
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["date"], "2023-10-18");
        assert_eq!(json["category"], "shopping");
    }
}
