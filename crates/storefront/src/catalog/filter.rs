//! Product listing filters.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::types::{Product, Term};

/// Tag slug marking products suggested on the cart page.
pub const TRENDING_TAG: &str = "trending-cart";

/// Query string of the product listing, e.g. `?category=Shirts&color=blue,red`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterQuery {
    pub category: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
}

/// Active listing filters.
///
/// A product must match every non-empty facet, and matches a facet when any
/// of its values is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductFilter {
    pub categories: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
}

fn split(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

fn facet_matches(selected: &[String], terms: &[Term]) -> bool {
    selected.is_empty()
        || selected
            .iter()
            .any(|value| terms.iter().any(|term| term.matches(value)))
}

impl From<&FilterQuery> for ProductFilter {
    fn from(query: &FilterQuery) -> Self {
        Self {
            categories: split(query.category.as_deref()),
            colors: split(query.color.as_deref()),
            sizes: split(query.size.as_deref()),
        }
    }
}

impl ProductFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.colors.is_empty() && self.sizes.is_empty()
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        facet_matches(&self.categories, &product.categories)
            && facet_matches(&self.colors, &product.colors)
            && facet_matches(&self.sizes, &product.sizes)
    }

    /// Products passing the filter, in their original order.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct filter values offered by a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub categories: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
}

/// Collect the distinct category names, colors and sizes of a listing.
#[must_use]
pub fn facets(products: &[Product]) -> Facets {
    let collect = |pick: fn(&Product) -> &[Term]| -> Vec<String> {
        products
            .iter()
            .flat_map(|p| pick(p).iter().map(|t| t.name.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    };

    Facets {
        categories: collect(|p| p.categories.as_slice()),
        colors: collect(|p| p.colors.as_slice()),
        sizes: collect(|p| p.sizes.as_slice()),
    }
}

/// Products carrying a tag slug (case-insensitive).
#[must_use]
pub fn tagged<'a>(products: &'a [Product], tag: &str) -> Vec<&'a Product> {
    products.iter().filter(|p| p.has_tag(tag)).collect()
}
