// 🏷️ Category Entity - fixed spending categories with display attributes
//
// The key is the identity used by transactions and budgets; name, color and
// icon are presentation values looked up through the registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CATEGORY KEY
// ============================================================================

/// Closed set of category keys. Fixture files naming anything else fail to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKey {
    Shopping,
    Food,
    Transport,
    Housing,
    Health,
    Utilities,
    Entertainment,
    Electronics,
    Misc,
    Income,
}

impl CategoryKey {
    pub const ALL: [CategoryKey; 10] = [
        CategoryKey::Shopping,
        CategoryKey::Food,
        CategoryKey::Transport,
        CategoryKey::Housing,
        CategoryKey::Health,
        CategoryKey::Utilities,
        CategoryKey::Entertainment,
        CategoryKey::Electronics,
        CategoryKey::Misc,
        CategoryKey::Income,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKey::Shopping => "shopping",
            CategoryKey::Food => "food",
            CategoryKey::Transport => "transport",
            CategoryKey::Housing => "housing",
            CategoryKey::Health => "health",
            CategoryKey::Utilities => "utilities",
            CategoryKey::Entertainment => "entertainment",
            CategoryKey::Electronics => "electronics",
            CategoryKey::Misc => "misc",
            CategoryKey::Income => "income",
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for CategoryKey {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        CategoryKey::ALL
            .into_iter()
            .find(|key| key.as_str() == lower)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// ============================================================================
// CATEGORY TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryType {
    /// Expense category (money going out)
    Expense,

    /// Income category (money coming in)
    Income,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Expense => "Expense",
            CategoryType::Income => "Income",
        }
    }
}

// ============================================================================
// CATEGORY ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub key: CategoryKey,

    /// Display name (e.g., "Food & Dining")
    pub name: String,

    /// Hex color used by charts and badges
    pub color: String,

    /// Icon glyph for the UI (e.g., "🍽️")
    pub icon: String,

    pub category_type: CategoryType,
}

impl Category {
    pub fn new(
        key: CategoryKey,
        name: &str,
        color: &str,
        icon: &str,
        category_type: CategoryType,
    ) -> Self {
        Category {
            key,
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
            category_type,
        }
    }

    pub fn is_income(&self) -> bool {
        self.category_type == CategoryType::Income
    }
}

// ============================================================================
// CATEGORY REGISTRY
// ============================================================================

/// Registry of the known categories, in display order.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        CategoryRegistry {
            categories: Vec::new(),
        }
    }

    /// Create registry with the ten dashboard categories pre-loaded
    pub fn with_defaults() -> Self {
        let mut registry = CategoryRegistry::new();
        registry.register_default_categories();
        registry
    }

    fn register_default_categories(&mut self) {
        use CategoryKey::*;
        use CategoryType::Expense;

        let defaults = [
            (Shopping, "Shopping", "#6366F1", "🛍️", Expense),
            (Food, "Food & Dining", "#F97316", "🍽️", Expense),
            (Transport, "Transport", "#0EA5E9", "🚗", Expense),
            (Housing, "Housing", "#A855F7", "🏠", Expense),
            (Health, "Health", "#EF4444", "💊", Expense),
            (Utilities, "Utilities", "#8884D8", "⚡", Expense),
            (Entertainment, "Entertainment", "#82CA9D", "☕", Expense),
            (Electronics, "Electronics", "#FFC658", "📱", Expense),
            // Misc reuses the shopping glyph
            (Misc, "Miscellaneous", "#CBD5E1", "🛍️", Expense),
            (CategoryKey::Income, "Income", "#22C55E", "💰", CategoryType::Income),
        ];

        for (key, name, color, icon, category_type) in defaults {
            self.register(Category::new(key, name, color, icon, category_type));
        }
    }

    /// Register a category, replacing any existing entry with the same key
    pub fn register(&mut self, category: Category) {
        match self.categories.iter_mut().find(|c| c.key == category.key) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
    }

    pub fn get(&self, key: CategoryKey) -> Option<&Category> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Display name for a key, falling back to the raw key
    pub fn name_of(&self, key: CategoryKey) -> String {
        self.get(key)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| key.to_string())
    }

    /// Find category by display name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        let lower_name = name.to_lowercase();
        self.categories
            .iter()
            .find(|cat| cat.name.to_lowercase() == lower_name)
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn by_type(&self, category_type: CategoryType) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|cat| cat.category_type == category_type)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.categories.len()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_every_key() {
        let registry = CategoryRegistry::with_defaults();

        assert_eq!(registry.count(), 10);
        for key in CategoryKey::ALL {
            assert!(registry.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_display_names() {
        let registry = CategoryRegistry::with_defaults();

        assert_eq!(registry.name_of(CategoryKey::Food), "Food & Dining");
        assert_eq!(registry.name_of(CategoryKey::Misc), "Miscellaneous");
        assert!(registry.get(CategoryKey::Income).unwrap().is_income());
        assert_eq!(registry.name_of(CategoryKey::Income), "Income");
    }

    #[test]
    fn test_find_by_name_case_insensitive() {
        let registry = CategoryRegistry::with_defaults();

        let food = registry.find_by_name("food & dining");
        assert_eq!(food.map(|c| c.key), Some(CategoryKey::Food));
        assert!(registry.find_by_name("Groceries").is_none());
    }

    #[test]
    fn test_by_type() {
        let registry = CategoryRegistry::with_defaults();

        assert_eq!(registry.by_type(CategoryType::Income).len(), 1);
        assert_eq!(registry.by_type(CategoryType::Expense).len(), 9);
    }

    #[test]
    fn test_register_replaces_existing_key() {
        let mut registry = CategoryRegistry::with_defaults();
        registry.register(Category::new(
            CategoryKey::Health,
            "Wellness",
            "#000000",
            "🧘",
            CategoryType::Expense,
        ));

        assert_eq!(registry.count(), 10);
        assert_eq!(registry.name_of(CategoryKey::Health), "Wellness");
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("Transport".parse::<CategoryKey>(), Ok(CategoryKey::Transport));
        assert_eq!(" misc ".parse::<CategoryKey>(), Ok(CategoryKey::Misc));
        assert_eq!(
            "groceries".parse::<CategoryKey>().unwrap_err().to_string(),
            "unknown category: groceries"
        );
    }

    #[test]
    fn test_key_serde_is_lowercase() {
        let json = serde_json::to_string(&CategoryKey::Entertainment).unwrap();
        assert_eq!(json, "\"entertainment\"");

        let parsed: CategoryKey = serde_json::from_str("\"housing\"").unwrap();
        assert_eq!(parsed, CategoryKey::Housing);
        assert!(serde_json::from_str::<CategoryKey>("\"rent\"").is_err());
    }
}
