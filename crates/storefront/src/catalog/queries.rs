//! GraphQL documents sent to the content API.

/// Top-level product categories with their children. The excluded term is
/// the store's "Uncategorized" bucket.
pub const CATEGORIES: &str = r#"query Categories {
  productCategories(
    where: {hideEmpty: false, parent: null, exclude: "dGVybToxNQ=="}
  ) {
    nodes {
      id
      name
      slug
      description
      image { mediaItemUrl }
      children { nodes { id name slug } }
    }
  }
}
"#;

macro_rules! simple_product_fields {
    () => {
        r"... on SimpleProduct {
      id
      databaseId
      name
      description(format: RAW)
      price(format: RAW)
      slug
      image { slug mediaItemUrl }
      productTags { nodes { name slug } }
      productCategories { nodes { id name slug parentId } }
      attributes {
        nodes {
          ... on GlobalProductAttribute {
            id
            name
            label
            options
            terms {
              nodes {
                ... on PaColor { id name count slug }
                ... on PaSize { id name count slug }
              }
            }
          }
        }
      }
    }"
    };
}

/// Up to 30 products. Only simple products carry fields; other product
/// types come back as empty nodes.
pub const PRODUCTS: &str = concat!(
    "query GetProductsWithCategoryAndTags {\n  products(first: 30) {\n    nodes {\n    ",
    simple_product_fields!(),
    "\n    }\n  }\n}\n"
);

/// A single product looked up by slug.
pub const PRODUCT_BY_SLUG: &str = concat!(
    "query GetProductBySlug($slug: ID!) {\n  product(id: $slug, idType: SLUG) {\n    ",
    simple_product_fields!(),
    "\n  }\n}\n"
);

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced(query: &str) -> bool {
        query.matches('{').count() == query.matches('}').count()
    }

    #[test]
    fn test_documents_are_balanced() {
        assert!(balanced(CATEGORIES));
        assert!(balanced(PRODUCTS));
        assert!(balanced(PRODUCT_BY_SLUG));
    }

    #[test]
    fn test_product_documents_request_database_id() {
        assert!(PRODUCTS.contains("databaseId"));
        assert!(PRODUCT_BY_SLUG.contains("$slug: ID!"));
        assert!(PRODUCT_BY_SLUG.contains("idType: SLUG"));
    }
}
