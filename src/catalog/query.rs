//! Sort and pagination parameters for movie listings
//!
//! Sort keys and directions are closed enums. Only the static property names
//! they map to are ever written into Cypher text; caller-provided strings go
//! through [`FromStr`] and are rejected if they are not on the list.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_LIMIT: usize = 6;
pub const DEFAULT_MAX_LIMIT: usize = 100;

/// Movie property a listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortField {
    #[default]
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "released")]
    Released,
    #[serde(rename = "imdbRating")]
    ImdbRating,
    #[serde(rename = "year")]
    Year,
    #[serde(rename = "runtime")]
    Runtime,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Title,
        SortField::Released,
        SortField::ImdbRating,
        SortField::Year,
        SortField::Runtime,
    ];

    /// Node property name on `:Movie`
    pub fn property(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Released => "released",
            SortField::ImdbRating => "imdbRating",
            SortField::Year => "year",
            SortField::Runtime => "runtime",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property())
    }
}

impl FromStr for SortField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        SortField::ALL
            .into_iter()
            .find(|field| field.property() == key)
            .ok_or_else(|| {
                let allowed: Vec<&str> = SortField::ALL.iter().map(|f| f.property()).collect();
                CatalogError::validation(
                    "sort",
                    format!("'{}' is not one of: {}", key, allowed.join(", ")),
                )
            })
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for SortOrder {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortOrder::Asc),
            "DESC" => Ok(SortOrder::Desc),
            _ => Err(CatalogError::validation(
                "order",
                format!("'{}' must be ASC or DESC", s.trim()),
            )),
        }
    }
}

/// Skip/limit window over a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub skip: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            skip: 0,
        }
    }
}

impl Pagination {
    /// Build from signed values as they arrive from callers. Negative values
    /// are rejected rather than clamped.
    pub fn new(limit: i64, skip: i64) -> Result<Self> {
        if limit < 0 {
            return Err(CatalogError::validation(
                "limit",
                format!("must be non-negative, got {}", limit),
            ));
        }
        if skip < 0 {
            return Err(CatalogError::validation(
                "skip",
                format!("must be non-negative, got {}", skip),
            ));
        }
        Ok(Self {
            limit: limit as usize,
            skip: skip as usize,
        })
    }

    /// Cap the limit at `max_limit`
    pub fn capped(self, max_limit: usize) -> Self {
        Self {
            limit: self.limit.min(max_limit),
            skip: self.skip,
        }
    }

    /// `(skip, limit)` as Bolt integers. Values above `i64::MAX` are
    /// rejected instead of wrapping negative.
    pub fn bolt_window(&self) -> Result<(i64, i64)> {
        let skip = to_bolt_int("skip", self.skip)?;
        let limit = to_bolt_int("limit", self.limit)?;
        Ok((skip, limit))
    }
}

fn to_bolt_int(field: &'static str, value: usize) -> Result<i64> {
    i64::try_from(value).map_err(|_| {
        CatalogError::validation(field, format!("must be at most {}, got {}", i64::MAX, value))
    })
}

/// Ordering and pagination for a movie listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovieListParams {
    pub sort: SortField,
    pub order: SortOrder,
    pub page: Pagination,
}

impl MovieListParams {
    pub fn new(sort: SortField, order: SortOrder, page: Pagination) -> Self {
        Self { sort, order, page }
    }

    /// Parse raw caller input. Every field is validated before anything else
    /// happens with it.
    pub fn parse(sort: &str, order: &str, limit: i64, skip: i64) -> Result<Self> {
        Ok(Self {
            sort: sort.parse()?,
            order: order.parse()?,
            page: Pagination::new(limit, skip)?,
        })
    }
}

/// Reject blank identifiers before they are bound as query parameters
pub(crate) fn require_non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::validation(field, "must not be empty"));
    }
    Ok(trimmed)
}
