//! Record cleaning for raw API products
//!
//! The search endpoint returns loosely filled records; only products with
//! every required field present survive. Cleaning also repairs the most
//! common mojibake and normalizes brand/store tags to lowercase terms.

use thiserror::Error;

use super::{CleanBatch, CleanProduct, RawProduct};
use crate::entities::NutritionGrade;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CleanError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("unrecognized nutrition grade: {0}")]
    Grade(String),
}

/// Clean a whole batch, dropping records that fail. Per the ingestion
/// policy a malformed record is never fatal to the batch.
pub fn clean_all(raw: &[RawProduct]) -> CleanBatch {
    let mut batch = CleanBatch::default();
    for record in raw {
        match clean_product(record) {
            Ok(product) => batch.kept.push(product),
            Err(err) => {
                log::debug!("skipping record: {}", err);
                batch.skipped += 1;
            }
        }
    }
    batch
}

/// Clean a single record, requiring name, url, grade, brands and stores.
pub fn clean_product(raw: &RawProduct) -> Result<CleanProduct, CleanError> {
    let name = required(&raw.product_name_fr, "product_name_fr")?;
    let url = required(&raw.url, "url")?;
    let grade_raw = required(&raw.nutrition_grades, "nutrition_grades")?;
    let brands_raw = required(&raw.brands, "brands")?;
    let stores_raw = required(&raw.stores, "stores")?;

    let grade = grade_raw
        .parse::<NutritionGrade>()
        .map_err(|_| CleanError::Grade(grade_raw.trim().to_string()))?;

    let brands = split_terms(brands_raw);
    if brands.is_empty() {
        return Err(CleanError::MissingField("brands"));
    }
    let stores = split_terms(stores_raw);
    if stores.is_empty() {
        return Err(CleanError::MissingField("stores"));
    }

    Ok(CleanProduct {
        name: tidy_text(name),
        url: url.trim().to_string(),
        grade,
        brands,
        stores,
    })
}

fn required<'a>(
    field: &'a Option<String>,
    name: &'static str,
) -> Result<&'a str, CleanError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CleanError::MissingField(name)),
    }
}

/// Repair the most common latin-1-as-utf-8 artifacts and drop apostrophes,
/// which the storage collation handles poorly.
fn tidy_text(text: &str) -> String {
    text.trim()
        .replace("Ã©", "e")
        .replace("Ã¨", "e")
        .replace("Ã ", "a")
        .replace('\'', " ")
}

/// Split a comma-separated tag list into trimmed lowercase terms,
/// deduplicated in order of first appearance.
fn split_terms(tags: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in tags.split(',') {
        let term = tidy_text(term).to_lowercase();
        let term = term.trim().to_string();
        if term.is_empty() || terms.contains(&term) {
            continue;
        }
        terms.push(term);
    }
    terms
}
