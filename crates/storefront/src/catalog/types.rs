//! Catalog domain types and their conversion from content API responses.
//!
//! Response nodes are parsed leniently (every field optional) and converted
//! into strict domain types. Nodes that cannot be used are dropped with a log
//! line instead of failing the whole listing.

use serde::{Deserialize, Deserializer, Serialize};

use bloom_core::{Money, NewLineItem, ProductId, SelectedAttributes};

/// A named taxonomy entry (tag, category, attribute term).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub name: String,
    pub slug: String,
}

impl Term {
    /// Case-insensitive match against the name or the slug.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.name.eq_ignore_ascii_case(value) || self.slug.eq_ignore_ascii_case(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Opaque GraphQL node id.
    pub global_id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Money,
    pub image_url: String,
    pub tags: Vec<Term>,
    pub categories: Vec<Term>,
    pub colors: Vec<Term>,
    pub sizes: Vec<Term>,
}

impl Product {
    /// Cart line data for this product with the chosen variant.
    ///
    /// A missing choice defaults to the first offered option, as the product
    /// page does.
    #[must_use]
    pub fn line_item(&self, color: Option<String>, size: Option<String>) -> NewLineItem {
        let first = |terms: &[Term]| terms.first().map(|t| t.name.clone());
        NewLineItem {
            product_id: self.id,
            name: self.name.clone(),
            unit_price: self.price,
            image_url: self.image_url.clone(),
            attributes: SelectedAttributes {
                color: color.or_else(|| first(&self.colors)),
                size: size.or_else(|| first(&self.sizes)),
            },
        }
    }

    #[must_use]
    pub fn has_tag(&self, slug: &str) -> bool {
        self.tags.iter().any(|t| t.slug.eq_ignore_ascii_case(slug))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image_url: Option<String>,
    pub children: Vec<Term>,
}

// =============================================================================
// Response shapes
// =============================================================================

#[derive(Debug, Deserialize)]
pub(super) struct Nodes<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

impl<T> Default for Nodes<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

/// Treat an explicit `null` connection like a missing one.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawImage {
    pub media_item_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawTerm {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawAttribute {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub terms: Nodes<RawTerm>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawProduct {
    pub id: Option<String>,
    pub database_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub slug: Option<String>,
    pub image: Option<RawImage>,
    #[serde(default, deserialize_with = "nullable")]
    pub product_tags: Nodes<RawTerm>,
    #[serde(default, deserialize_with = "nullable")]
    pub product_categories: Nodes<RawTerm>,
    #[serde(default, deserialize_with = "nullable")]
    pub attributes: Nodes<RawAttribute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawCategory {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<RawImage>,
    #[serde(default, deserialize_with = "nullable")]
    pub children: Nodes<RawTerm>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductsData {
    pub products: Option<Nodes<RawProduct>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductData {
    pub product: Option<RawProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CategoriesData {
    pub product_categories: Option<Nodes<RawCategory>>,
}

const COLOR_ATTRIBUTE: &str = "pa_color";
const SIZE_ATTRIBUTE: &str = "pa_size";

fn terms(raw: Nodes<RawTerm>) -> Vec<Term> {
    raw.nodes
        .into_iter()
        .filter_map(|t| {
            Some(Term {
                name: t.name?,
                slug: t.slug.unwrap_or_default(),
            })
        })
        .collect()
}

impl RawProduct {
    /// Convert to a [`Product`], or `None` for nodes that are not simple
    /// products or have no usable price.
    pub(super) fn into_product(self) -> Option<Product> {
        let (Some(global_id), Some(database_id), Some(name)) = (self.id, self.database_id, self.name)
        else {
            return None;
        };

        let raw_price = self.price.unwrap_or_default();
        let price = match Money::parse(&raw_price) {
            Ok(price) if !price.is_negative() => price,
            _ => {
                tracing::warn!(product = %name, price = %raw_price, "skipping product with unusable price");
                return None;
            }
        };

        let mut colors = Vec::new();
        let mut sizes = Vec::new();
        for attribute in self.attributes.nodes {
            match attribute.name.as_deref() {
                Some(COLOR_ATTRIBUTE) => colors.extend(terms(attribute.terms)),
                Some(SIZE_ATTRIBUTE) => sizes.extend(terms(attribute.terms)),
                _ => {}
            }
        }

        Some(Product {
            id: ProductId::new(database_id),
            global_id,
            name,
            slug: self.slug.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            price,
            image_url: self
                .image
                .and_then(|i| i.media_item_url)
                .unwrap_or_default(),
            tags: terms(self.product_tags),
            categories: terms(self.product_categories),
            colors,
            sizes,
        })
    }
}

impl From<RawCategory> for Category {
    fn from(raw: RawCategory) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            slug: raw.slug,
            description: raw.description.unwrap_or_default(),
            image_url: raw.image.and_then(|i| i.media_item_url),
            children: terms(raw.children),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw_shirt() -> serde_json::Value {
        json!({
            "id": "cHJvZHVjdDoxMg==",
            "databaseId": 12,
            "name": "Linen Shirt",
            "description": "Breathable.",
            "price": "19.99",
            "slug": "linen-shirt",
            "image": {"slug": "shirt", "mediaItemUrl": "https://cdn.example.com/shirt.jpg"},
            "productTags": {"nodes": [{"name": "Trending", "slug": "trending-cart"}]},
            "productCategories": {"nodes": [{"id": "c1", "name": "Shirts", "slug": "shirts", "parentId": null}]},
            "attributes": {"nodes": [
                {"id": "a1", "name": "pa_color", "label": "Color", "options": ["blue"],
                 "terms": {"nodes": [{"id": "t1", "name": "Blue", "count": 3, "slug": "blue"}]}},
                {"id": "a2", "name": "pa_size", "label": "Size", "options": ["m", "l"],
                 "terms": {"nodes": [
                     {"id": "t2", "name": "M", "count": 1, "slug": "m"},
                     {"id": "t3", "name": "L", "count": 1, "slug": "l"}
                 ]}}
            ]}
        })
    }

    #[test]
    fn test_simple_product_converts() {
        let raw: RawProduct = serde_json::from_value(raw_shirt()).unwrap();
        let product = raw.into_product().unwrap();

        assert_eq!(product.id, ProductId::new(12));
        assert_eq!(product.price, Money::from_minor(1999));
        assert_eq!(product.colors[0].name, "Blue");
        assert_eq!(product.sizes.len(), 2);
        assert!(product.has_tag("TRENDING-CART"));
    }

    #[test]
    fn test_empty_node_is_skipped() {
        let raw: RawProduct = serde_json::from_value(json!({})).unwrap();
        assert!(raw.into_product().is_none());
    }

    #[test]
    fn test_unparsable_price_is_skipped() {
        let mut value = raw_shirt();
        value["price"] = json!("19.99, 24.99");
        let raw: RawProduct = serde_json::from_value(value).unwrap();
        assert!(raw.into_product().is_none());
    }

    #[test]
    fn test_line_item_defaults_to_first_options() {
        let raw: RawProduct = serde_json::from_value(raw_shirt()).unwrap();
        let product = raw.into_product().unwrap();

        let line = product.line_item(None, Some("L".to_string()));
        assert_eq!(line.attributes.color.as_deref(), Some("Blue"));
        assert_eq!(line.attributes.size.as_deref(), Some("L"));
        assert_eq!(line.unit_price, product.price);
    }
}
