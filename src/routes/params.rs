use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::models::{BlogTag, CustomOrderStatus};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
}

// `serde_urlencoded` cannot deserialize numbers through `#[serde(flatten)]`;
// each query carries its own page fields.

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive match on name or description.
    pub q: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    #[param(inline)]
    pub sort_by: Option<ProductSortBy>,
    #[param(inline)]
    pub sort_order: Option<SortOrder>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomOrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[param(inline)]
    pub status: Option<CustomOrderStatus>,
}

impl CustomOrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlogListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[param(inline)]
    pub tag: Option<BlogTag>,
}

impl BlogListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LowStockQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Defaults to 1: products at or below this count are listed.
    pub threshold: Option<i32>,
}

impl LowStockQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
        assert_eq!(Pagination::new(Some(0), Some(500)).normalize(), (1, 100, 0));
        assert_eq!(Pagination::new(Some(3), Some(10)).normalize(), (3, 10, 20));
    }

    #[test]
    fn product_query_parses_from_query_string() {
        let uri: axum::http::Uri = "/api/products?page=2&category=rugs&min_price=10.50&sort_by=price"
            .parse()
            .unwrap();
        let Query(query) = Query::<ProductQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.pagination().normalize(), (2, 20, 20));
        assert_eq!(query.category.as_deref(), Some("rugs"));
        assert_eq!(query.min_price, Some(Decimal::new(1050, 2)));
        assert!(matches!(query.sort_by, Some(ProductSortBy::Price)));
    }
}
