//! Filter and sort pipeline over the product list.
//!
//! Pure functions: given the full product list and the current filter
//! state, derive the view to render. Nothing here holds state.

use std::cmp::Ordering;

use barely_used_core::Product;

/// Selection value that disables the category and condition filters.
pub const ALL: &str = "all";

/// Which product fields the text filter looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SearchFields {
    pub name: bool,
    pub description: bool,
    pub category: bool,
    pub subcategory: bool,
}

impl SearchFields {
    /// Aggregate listing page.
    pub const LISTING: Self = Self {
        name: true,
        description: true,
        category: true,
        subcategory: false,
    };

    /// Single-category page; the category is already fixed.
    pub const CATEGORY_PAGE: Self = Self {
        name: true,
        description: true,
        category: false,
        subcategory: false,
    };

    /// Remote search endpoint.
    pub const API_SEARCH: Self = Self {
        name: true,
        description: true,
        category: true,
        subcategory: true,
    };
}

impl Default for SearchFields {
    fn default() -> Self {
        Self::LISTING
    }
}

/// Whether `product` contains `needle` in any of `fields`.
///
/// `needle` must already be lowercase. An empty needle matches everything.
#[must_use]
pub fn matches_query(product: &Product, needle: &str, fields: SearchFields) -> bool {
    if needle.is_empty() {
        return true;
    }

    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    (fields.name && contains(&product.name))
        || (fields.description && contains(&product.description))
        || (fields.category && contains(&product.category))
        || (fields.subcategory && contains(&product.subcategory))
}

/// Product ordering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Most recently posted first.
    #[default]
    Newest,
    Oldest,
    PriceLow,
    PriceHigh,
    /// Most viewed first.
    Popular,
}

impl SortMode {
    /// Parse from a URL parameter / CLI value. Unknown values mean newest.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "oldest" => Self::Oldest,
            "price-low" | "price_low" => Self::PriceLow,
            "price-high" | "price_high" => Self::PriceHigh,
            "popular" => Self::Popular,
            _ => Self::Newest,
        }
    }

    /// Convert to URL parameter value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Popular => "popular",
        }
    }

    /// Comparator for this mode.
    ///
    /// Listings without a usable posting time count as the oldest.
    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Newest => b.posted_at.cmp(&a.posted_at),
            Self::Oldest => a.posted_at.cmp(&b.posted_at),
            Self::PriceLow => a.price.cmp(&b.price),
            Self::PriceHigh => b.price.cmp(&a.price),
            Self::Popular => b.views.cmp(&a.views),
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current filter state of a product list page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Free-text search; trimmed and lowercased before matching.
    pub search: String,
    /// Selected category, or `"all"`.
    pub category: String,
    /// Selected condition, or `"all"`.
    pub condition: String,
    pub sort: SortMode,
    pub fields: SearchFields,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL.to_string(),
            condition: ALL.to_string(),
            sort: SortMode::default(),
            fields: SearchFields::default(),
        }
    }
}

impl CatalogQuery {
    /// Filter and sort `products`. Ties keep their input order.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let needle = self.search.trim().to_lowercase();
        let category = selection(&self.category);
        let condition = selection(&self.condition);

        let mut view: Vec<Product> = products
            .iter()
            .filter(|p| matches_query(p, &needle, self.fields))
            .filter(|p| category.as_deref().is_none_or(|c| p.category.to_lowercase() == c))
            .filter(|p| condition.as_deref().is_none_or(|c| p.condition.to_lowercase() == c))
            .cloned()
            .collect();

        view.sort_by(|a, b| self.sort.compare(a, b));
        view
    }
}

/// Lowercased selection, or `None` when the filter is bypassed.
fn selection(value: &str) -> Option<String> {
    let value = value.trim().to_lowercase();
    if value.is_empty() || value == ALL {
        None
    } else {
        Some(value)
    }
}

/// Category choices for a filter dropdown: `"all"`, then each distinct
/// lowercase category in first-seen order.
#[must_use]
pub fn available_categories(products: &[Product]) -> Vec<String> {
    let mut categories = vec![ALL.to_string()];
    for product in products {
        let category = product.category.trim().to_lowercase();
        if !category.is_empty() && !categories.contains(&category) {
            categories.push(category);
        }
    }
    categories
}
