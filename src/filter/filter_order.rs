use super::types::{CourseOrder, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Sort keys for a listing order, over the columns of the listing subquery
    pub fn parse(order: CourseOrder) -> Vec<FilterOrderInfo> {
        match order {
            CourseOrder::Newest => vec![
                FilterOrderInfo { column: "created_at", sort: SortDirection::Desc },
                FilterOrderInfo { column: "id", sort: SortDirection::Asc },
            ],
            CourseOrder::MostEnrolled => vec![
                FilterOrderInfo { column: "enrollment_count", sort: SortDirection::Desc },
                FilterOrderInfo { column: "created_at", sort: SortDirection::Desc },
                FilterOrderInfo { column: "id", sort: SortDirection::Asc },
            ],
            CourseOrder::Random => vec![],
        }
    }

    pub fn generate(order: CourseOrder) -> String {
        if order == CourseOrder::Random {
            return "ORDER BY RANDOM()".to_string();
        }
        let parts: Vec<String> = Self::parse(order)
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
