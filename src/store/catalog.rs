use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::AppResult;
use crate::models::{CategoryListing, CreateItemRequest, MenuItem};

/// Cuisine used to fill categories a preferred cuisine does not offer
pub const SUPPLEMENT_CUISINE: &str = "International";

/// In-memory menu catalog.
///
/// The engine treats items as immutable; inserts come from the thin
/// catalog-management API only.
#[derive(Debug, Default)]
pub struct Catalog {
    items: HashMap<u32, MenuItem>,
    next_id: u32,
}

impl Catalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            next_id: 1,
        }
    }

    /// Loads a catalog from a JSON array of menu items
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let items: Vec<MenuItem> = serde_json::from_str(&raw)?;
        let mut catalog = Self::new();
        for item in items {
            catalog.next_id = catalog.next_id.max(item.id + 1);
            catalog.items.insert(item.id, item);
        }
        Ok(catalog)
    }

    /// Inserts a new item, assigning the next free identifier
    pub fn insert(&mut self, request: CreateItemRequest) -> MenuItem {
        let item = MenuItem {
            id: self.next_id,
            name: request.name,
            description: request.description,
            price: request.price,
            cuisine: request.cuisine,
            category: request.category,
            tags: request.tags,
        };
        self.next_id += 1;
        self.items.insert(item.id, item.clone());
        item
    }

    pub fn get(&self, id: u32) -> Option<&MenuItem> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items, ordered by id for stable output
    pub fn all(&self) -> Vec<MenuItem> {
        let mut items: Vec<MenuItem> = self.items.values().cloned().collect();
        items.sort_by_key(|item| item.id);
        items
    }

    /// All item ids known to the catalog
    pub fn item_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.items.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Distinct cuisine labels, sorted
    pub fn cuisines(&self) -> Vec<String> {
        self.items
            .values()
            .map(|item| item.cuisine.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn categories_of(&self, cuisine: &str) -> BTreeSet<String> {
        self.items
            .values()
            .filter(|item| item.cuisine == cuisine)
            .map(|item| item.category.clone())
            .collect()
    }

    /// Categories available for a cuisine, with the International cuisine
    /// filling in the categories the cuisine does not natively offer
    pub fn category_listing(&self, cuisine: &str) -> CategoryListing {
        let native = self.categories_of(cuisine);
        let supplemented: Vec<String> = self
            .categories_of(SUPPLEMENT_CUISINE)
            .into_iter()
            .filter(|category| !native.contains(category))
            .collect();

        let mut total: Vec<String> = native.iter().cloned().chain(supplemented.iter().cloned()).collect();
        total.sort();

        CategoryListing {
            cuisine: cuisine.to_string(),
            native_categories: native.into_iter().collect(),
            supplemented_categories: supplemented,
            total_categories: total,
        }
    }

    /// Items eligible for a recommendation request: the preferred cuisine
    /// for the categories it natively offers, the International cuisine for
    /// the requested categories it lacks. Ordered by id.
    pub fn candidate_items(&self, cuisine: &str, categories: &[String]) -> Vec<MenuItem> {
        let native = self.categories_of(cuisine);
        let mut eligible: Vec<MenuItem> = self
            .items
            .values()
            .filter(|item| {
                categories.contains(&item.category)
                    && if native.contains(&item.category) {
                        item.cuisine == cuisine
                    } else {
                        item.cuisine == SUPPLEMENT_CUISINE
                    }
            })
            .cloned()
            .collect();
        eligible.sort_by_key(|item| item.id);
        eligible
    }
}

// ============================================================================
// Item-name normalization
// ============================================================================

const SIZE_WORDS: &[&str] = &["small", "large", "medium", "regular", "mini", "xl", "extra large"];

/// Portion-exclusivity key: the item name lowercased with its portion-size
/// suffix removed, so "Fried Rice (L)" and "Fried Rice (S)" share a key.
/// Handles the bracket form ("(S)", "(Large)") and the dash form
/// ("- Small", "- Extra Large").
pub fn portion_key(name: &str) -> String {
    let lower = name.trim().to_lowercase();

    if let Some(open) = lower.rfind('(') {
        let inner = lower[open + 1..].trim_end_matches(')').trim();
        let is_letter_code = matches!(inner, "s" | "r" | "l" | "m" | "x");
        if is_letter_code || SIZE_WORDS.contains(&inner) {
            return lower[..open].trim().to_string();
        }
    }

    if let Some(dash) = lower.rfind('-') {
        let suffix = lower[dash + 1..].trim();
        if SIZE_WORDS.iter().any(|word| suffix.starts_with(word)) {
            return lower[..dash].trim().to_string();
        }
    }

    lower
}

/// Keyword patterns mapped to a dish family, checked in order
const FAMILY_PATTERNS: &[(&str, &str)] = &[
    ("ice cream", "ice cream"),
    ("soup", "soup"),
    ("chicken", "chicken"),
    ("beef", "beef"),
    ("pork", "pork"),
    ("prawn", "prawn"),
    ("shrimp", "prawn"),
    ("crab", "crab"),
    ("fish", "fish"),
    ("seafood", "seafood"),
    ("mushroom", "mushroom"),
    ("noodle", "noodles"),
    ("rice", "rice"),
    ("curry", "curry"),
    ("salad", "salad"),
    ("omelette", "omelette"),
    ("cake", "cake"),
    ("pudding", "pudding"),
    ("tea", "tea"),
    ("coffee", "coffee"),
    ("juice", "juice"),
];

/// Dish-family key used for diversity caps: first matching family keyword
/// in the portion-stripped name, falling back to the name's last word.
pub fn family_key(name: &str) -> String {
    let base = portion_key(name);
    for (pattern, family) in FAMILY_PATTERNS {
        if base.contains(pattern) {
            return (*family).to_string();
        }
    }
    base.split_whitespace()
        .last()
        .unwrap_or("unknown")
        .to_string()
}
