//! Row types returned by the storage layer

use chrono::{DateTime, TimeZone, Utc};

use crate::entities::NutritionGrade;

/// A categories-table row.
#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub url: String,
}

/// A products-table row (also returned by the substitute query).
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub grade: NutritionGrade,
}

/// A brands- or stores-table row.
#[derive(Debug, Clone)]
pub struct EntityRow {
    pub id: i64,
    pub name: String,
    pub url: String,
}

/// A favorites-table row.
#[derive(Debug, Clone)]
pub struct FavoriteRow {
    pub id: i64,
    pub original_id: i64,
    pub name: String,
    pub url: String,
    pub grade: NutritionGrade,
    pub saved_at: DateTime<Utc>,
}

/// Parse a stored grade letter. The schema constrains the column to
/// 'a'..'e', so the fallback is unreachable for rows we wrote ourselves.
pub(super) fn parse_grade(s: &str) -> NutritionGrade {
    s.parse().unwrap_or(NutritionGrade::E)
}

/// Parse a stored RFC 3339 timestamp.
pub(super) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap())
}
