//! Parsers for the load-time artifacts.
//!
//! - catalog CSV: one game per row, headered
//! - feature matrix JSON: CSR layout (`shape`, `indptr`, `indices`, `data`)
//! - neighbor index JSON: `metric` and `n_neighbors`
//!
//! The catalog dataset has been exported by different tools over time, so a
//! single field may arrive under several column names. All of that is
//! resolved here; the engine only ever sees `ItemRecord`.

use crate::error::{DataLoadError, Result};
use crate::features::{CsrMatrix, FeatureIndex, NeighborIndexSpec};
use crate::types::*;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

// Accepted column names per canonical field, in order of preference
const ID_COLUMNS: &[&str] = &["app_id", "id"];
const TITLE_COLUMNS: &[&str] = &["title"];
const TAG_COLUMNS: &[&str] = &["tags", "genres"];
const MOOD_COLUMNS: &[&str] = &["mood"];
const PRICE_COLUMNS: &[&str] = &["price", "price_final"];
const RELEASE_COLUMNS: &[&str] = &["release_date", "date_release"];
const WINDOWS_COLUMNS: &[&str] = &["win", "windows"];
const MAC_COLUMNS: &[&str] = &["mac"];
const LINUX_COLUMNS: &[&str] = &["linux"];
const RATING_COLUMNS: &[&str] = &["rating"];
const REVIEW_COLUMNS: &[&str] = &["user_reviews", "user_reviews_x"];
const DESCRIPTION_COLUMNS: &[&str] = &["description"];

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|_| DataLoadError::FileNotFound {
        path: path.display().to_string(),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// =============================================================================
// Catalog CSV
// =============================================================================

/// Header positions for every canonical field
#[derive(Debug)]
struct ColumnMap {
    id: usize,
    title: usize,
    tags: Option<usize>,
    mood: Option<usize>,
    price: Option<usize>,
    release_date: Option<usize>,
    windows: Option<usize>,
    mac: Option<usize>,
    linux: Option<usize>,
    rating: Option<usize>,
    reviews: Option<usize>,
    description: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord, file: &str) -> Result<Self> {
        let find = |candidates: &[&str]| {
            candidates.iter().find_map(|name| {
                headers
                    .iter()
                    .position(|header| header.trim().eq_ignore_ascii_case(name))
            })
        };
        let require = |candidates: &'static [&'static str]| {
            find(candidates).ok_or_else(|| DataLoadError::MissingColumn {
                file: file.to_string(),
                candidates: candidates.to_vec(),
            })
        };

        Ok(Self {
            id: require(ID_COLUMNS)?,
            title: require(TITLE_COLUMNS)?,
            tags: find(TAG_COLUMNS),
            mood: find(MOOD_COLUMNS),
            price: find(PRICE_COLUMNS),
            release_date: find(RELEASE_COLUMNS),
            windows: find(WINDOWS_COLUMNS),
            mac: find(MAC_COLUMNS),
            linux: find(LINUX_COLUMNS),
            rating: find(RATING_COLUMNS),
            reviews: find(REVIEW_COLUMNS),
            description: find(DESCRIPTION_COLUMNS),
        })
    }
}

/// Non-empty, trimmed cell value
fn cell(record: &StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|value| !value.is_empty() && !value.eq_ignore_ascii_case("nan"))
}

/// Parse the catalog CSV file
pub fn parse_catalog(path: &Path) -> Result<Vec<ItemRecord>> {
    let file = open(path)?;
    parse_catalog_reader(BufReader::new(file), &file_label(path))
}

/// Parse catalog rows from any reader (the file name is only used in errors)
pub fn parse_catalog_reader<R: Read>(reader: R, file: &str) -> Result<Vec<ItemRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::resolve(&headers, file)?;
    debug!("Resolved catalog columns for {}: {:?}", file, columns);

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        // Header is line 1
        let line = row.position().map(|p| p.line() as usize).unwrap_or(idx + 2);
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        records.push(parse_row(&row, &columns, file, line)?);
    }
    Ok(records)
}

fn parse_row(row: &StringRecord, columns: &ColumnMap, file: &str, line: usize) -> Result<ItemRecord> {
    let parse_error = |reason: String| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason,
    };

    let id_str = cell(row, Some(columns.id)).ok_or_else(|| parse_error("Missing id".to_string()))?;
    let id: ItemId = id_str
        .parse()
        .map_err(|e| parse_error(format!("Invalid id '{}': {}", id_str, e)))?;

    let title = cell(row, Some(columns.title))
        .ok_or_else(|| parse_error("Missing title".to_string()))?
        .to_string();

    let tags = cell(row, columns.tags).map(parse_tags).unwrap_or_default();

    let mood = cell(row, columns.mood).and_then(|value| match value.parse::<Mood>() {
        Ok(mood) => Some(mood),
        Err(e) => {
            warn!("{}:{}: {}, treating as no mood", file, line, e);
            None
        }
    });

    let price = match cell(row, columns.price) {
        Some(value) => Some(parse_price(value).map_err(parse_error)?),
        None => None,
    };

    let release_date = cell(row, columns.release_date).and_then(|value| {
        let date = parse_release_date(value);
        if date.is_none() {
            debug!("{}:{}: unparsable release date '{}'", file, line, value);
        }
        date
    });

    let platforms = PlatformFlags {
        windows: parse_flag(cell(row, columns.windows)).map_err(parse_error)?,
        mac: parse_flag(cell(row, columns.mac)).map_err(parse_error)?,
        linux: parse_flag(cell(row, columns.linux)).map_err(parse_error)?,
    };

    let rating_label = cell(row, columns.rating).and_then(|value| match value.parse() {
        Ok(label) => Some(label),
        Err(e) => {
            warn!("{}:{}: {}, treating as unrated", file, line, e);
            None
        }
    });

    let review_count = match cell(row, columns.reviews) {
        Some(value) => Some(parse_review_count(value).map_err(parse_error)?),
        None => None,
    };

    let description = cell(row, columns.description).unwrap_or_default().to_string();

    Ok(ItemRecord {
        id,
        title,
        tags,
        mood,
        price,
        release_date,
        platforms,
        rating_label,
        review_count,
        description,
    })
}

/// Parse a tag cell.
///
/// Accepts a list literal (`['Action', 'Indie']`) as well as plain `,` or
/// `|` separated values.
pub fn parse_tags(value: &str) -> Vec<String> {
    let inner = value
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');
    normalize_tags(
        inner
            .split([',', '|'])
            .map(|tag| tag.trim().trim_matches(|c| c == '\'' || c == '"')),
    )
}

fn parse_price(value: &str) -> std::result::Result<f64, String> {
    let price: f64 = value
        .trim_start_matches('$')
        .parse()
        .map_err(|e| format!("Invalid price '{}': {}", value, e))?;
    if !price.is_finite() || price < 0.0 {
        return Err(format!("Price must be a non-negative number, got {}", value));
    }
    Ok(price)
}

/// Release dates are read from their first ten characters as `YYYY-MM-DD`
pub fn parse_release_date(value: &str) -> Option<NaiveDate> {
    let prefix = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

fn parse_flag(value: Option<&str>) -> std::result::Result<bool, String> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" | "y" => Ok(true),
        "false" | "0" | "0.0" | "no" | "n" => Ok(false),
        _ => Err(format!("Invalid platform flag '{}'", value)),
    }
}

/// Review counts may have been written as floats (`1234.0`)
fn parse_review_count(value: &str) -> std::result::Result<u64, String> {
    if let Ok(count) = value.parse::<u64>() {
        return Ok(count);
    }
    let float: f64 = value
        .parse()
        .map_err(|e| format!("Invalid review count '{}': {}", value, e))?;
    if !float.is_finite() || float < 0.0 || float.fract() != 0.0 {
        return Err(format!("Review count must be a non-negative integer, got {}", value));
    }
    Ok(float as u64)
}

// =============================================================================
// JSON artifacts
// =============================================================================

/// Parse the CSR feature matrix artifact
pub fn parse_feature_matrix(path: &Path) -> Result<FeatureIndex> {
    let file = open(path)?;
    let matrix: CsrMatrix =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| DataLoadError::JsonError {
            file: file_label(path),
            source,
        })?;
    FeatureIndex::from_csr(matrix)
}

/// Parse the neighbor index parameters artifact
pub fn parse_neighbor_spec(path: &Path) -> Result<NeighborIndexSpec> {
    let file = open(path)?;
    let spec: NeighborIndexSpec =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| DataLoadError::JsonError {
            file: file_label(path),
            source,
        })?;
    if spec.n_neighbors == Some(0) {
        return Err(DataLoadError::InvalidValue {
            field: "n_neighbors".to_string(),
            value: "0".to_string(),
        });
    }
    Ok(spec)
}
