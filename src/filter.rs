// 🔍 Transaction filter - free-text search plus category selector

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::category::UnknownCategory;
use crate::entities::{CategoryKey, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySelector {
    #[default]
    All,
    Only(CategoryKey),
}

impl CategorySelector {
    pub fn matches(&self, category: CategoryKey) -> bool {
        match self {
            CategorySelector::All => true,
            CategorySelector::Only(key) => *key == category,
        }
    }

    /// Cycle through "all" and then every category key, in order
    pub fn next(&self) -> Self {
        match self {
            CategorySelector::All => CategorySelector::Only(CategoryKey::ALL[0]),
            CategorySelector::Only(key) => {
                let index = CategoryKey::ALL.iter().position(|k| k == key).unwrap_or(0);
                CategoryKey::ALL
                    .get(index + 1)
                    .map(|k| CategorySelector::Only(*k))
                    .unwrap_or(CategorySelector::All)
            }
        }
    }
}

impl fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategorySelector::All => f.write_str("all"),
            CategorySelector::Only(key) => write!(f, "{}", key),
        }
    }
}

impl FromStr for CategorySelector {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") || s.trim().is_empty() {
            Ok(CategorySelector::All)
        } else {
            s.parse().map(CategorySelector::Only)
        }
    }
}

impl Serialize for CategorySelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CategorySelector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Search state of the transactions page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub category: CategorySelector,
}

impl TransactionFilter {
    pub fn new(query: &str, category: CategorySelector) -> Self {
        TransactionFilter {
            query: query.to_string(),
            category,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.category != CategorySelector::All
    }

    /// Case-insensitive substring match on the description AND category match
    pub fn matches(&self, tx: &Transaction) -> bool {
        let needle = self.query.to_lowercase();
        tx.description.to_lowercase().contains(&needle) && self.category.matches(tx.category)
    }

    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|tx| self.matches(tx)).collect()
    }

    pub fn apply_owned(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|tx| self.matches(tx))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureStore;

    fn ids(transactions: &[&Transaction]) -> Vec<String> {
        transactions.iter().map(|tx| tx.id.clone()).collect()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let store = FixtureStore::builtin();
        let filter = TransactionFilter::default();

        assert!(!filter.is_active());
        assert_eq!(filter.apply(&store.transactions).len(), store.transactions.len());
    }

    #[test]
    fn test_case_insensitive_search() {
        let store = FixtureStore::builtin();
        let filter = TransactionFilter::new("UBER", CategorySelector::All);

        assert_eq!(ids(&filter.apply(&store.transactions)), vec!["2"]);
    }

    #[test]
    fn test_category_selector() {
        let store = FixtureStore::builtin();
        let filter = TransactionFilter::new("", CategorySelector::Only(CategoryKey::Transport));

        assert_eq!(ids(&filter.apply(&store.transactions)), vec!["2", "5"]);
    }

    #[test]
    fn test_query_and_category_combined() {
        let store = FixtureStore::builtin();

        let hit = TransactionFilter::new("gas", CategorySelector::Only(CategoryKey::Transport));
        assert_eq!(ids(&hit.apply(&store.transactions)), vec!["5"]);

        let miss = TransactionFilter::new("gas", CategorySelector::Only(CategoryKey::Food));
        assert!(miss.apply(&store.transactions).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let store = FixtureStore::builtin();
        let filters = [
            TransactionFilter::new("s", CategorySelector::All),
            TransactionFilter::new("", CategorySelector::Only(CategoryKey::Food)),
            TransactionFilter::new("zzz", CategorySelector::All),
        ];

        for filter in filters {
            let once = filter.apply_owned(&store.transactions);
            let twice = filter.apply_owned(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("all".parse::<CategorySelector>(), Ok(CategorySelector::All));
        assert_eq!("".parse::<CategorySelector>(), Ok(CategorySelector::All));
        assert_eq!(
            "food".parse::<CategorySelector>(),
            Ok(CategorySelector::Only(CategoryKey::Food))
        );
        assert!("groceries".parse::<CategorySelector>().is_err());
    }

    #[test]
    fn test_selector_cycles_back_to_all() {
        let mut selector = CategorySelector::All;
        for _ in 0..CategoryKey::ALL.len() {
            selector = selector.next();
            assert_ne!(selector, CategorySelector::All);
        }
        assert_eq!(selector.next(), CategorySelector::All);
    }
}
