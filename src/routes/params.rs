use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CourseSortBy {
    CreatedAt,
    Price,
    Title,
}

// Query strings are flat: pagination fields are repeated rather than
// flattened, since serde's flatten loses the numeric types of url-encoded
// values.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CourseQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub domain: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort_by: Option<CourseSortBy>,
    pub sort_order: Option<SortOrder>,
}

impl CourseQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PurchaseListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl PurchaseListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.normalize(), (3, 10, 20));
        let p = Pagination {
            page: Some(0),
            per_page: Some(1_000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));
    }

    #[test]
    fn normalize_saturates_huge_pages() {
        let p = Pagination {
            page: Some(i64::MAX),
            per_page: Some(20),
        };
        let (page, per_page, offset) = p.normalize();
        assert_eq!(page, i64::MAX);
        assert_eq!(per_page, 20);
        assert_eq!(offset, i64::MAX);
        assert!(offset >= 0);
    }

    #[test]
    fn course_query_parses_from_query_string() {
        let q: CourseQuery =
            serde_json::from_value(serde_json::json!({
                "page": 2,
                "domain": "Design",
                "sort_by": "price",
                "sort_order": "asc"
            }))
            .unwrap();
        assert_eq!(q.pagination().normalize(), (2, 20, 20));
        assert!(matches!(q.sort_by, Some(CourseSortBy::Price)));
        assert!(matches!(q.sort_order, Some(SortOrder::Asc)));
    }
}
