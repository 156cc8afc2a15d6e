//! Sort and pagination semantics shared by every repository backend.
//!
//! Ordering is total: the requested field first, then `id` ascending
//! regardless of direction, so repeated reads with the same parameters and no
//! intervening writes return identical pages.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{AroError, Result};
use crate::model::Metric;

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Fields a metric page can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Source,
    Type,
    Value,
    Timestamp,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Source => "source",
            SortField::Type => "type",
            SortField::Value => "value",
            SortField::Timestamp => "timestamp",
        }
    }
}

impl FromStr for SortField {
    type Err = AroError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "id" => Ok(SortField::Id),
            "source" => Ok(SortField::Source),
            "type" => Ok(SortField::Type),
            "value" => Ok(SortField::Value),
            "timestamp" => Ok(SortField::Timestamp),
            other => Err(AroError::InvalidSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort criteria: one field plus a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl Default for Sort {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: SortField::Timestamp,
            direction: Direction::Desc,
        }
    }
}

impl Sort {
    pub fn new(field: SortField, direction: Direction) -> Self {
        Self { field, direction }
    }

    /// Parse the `field[,direction[,...]]` query form.
    ///
    /// The first segment is the field and the second the direction; further
    /// segments are ignored. Only `desc` (any case) selects descending order;
    /// a missing or unrecognised direction sorts ascending. An unknown field
    /// is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split(',').map(str::trim);
        let field = parts.next().unwrap_or_default();
        let dir = parts.next();
        let field: SortField = field.parse()?;
        let direction = match dir {
            Some(d) if d.eq_ignore_ascii_case("desc") => Direction::Desc,
            Some(d) if d.is_empty() || d.eq_ignore_ascii_case("asc") => Direction::Asc,
            Some(d) => {
                tracing::debug!(direction = d, "unrecognised sort direction, using asc");
                Direction::Asc
            }
            None => Direction::Asc,
        };
        Ok(Self { field, direction })
    }

    /// Total order over metrics: sort field, then id ascending.
    pub fn compare(&self, a: &Metric, b: &Metric) -> Ordering {
        let primary = match self.field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Source => a.source.cmp(&b.source),
            SortField::Type => a.metric_type.cmp(&b.metric_type),
            SortField::Value => a.value.total_cmp(&b.value),
            SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
        };
        let primary = match self.direction {
            Direction::Asc => primary,
            Direction::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        write!(f, "{},{}", self.field.as_str(), dir)
    }
}

/// Zero-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
    pub sort: Sort,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Sort::default(),
        }
    }
}

impl PageRequest {
    pub fn new(page: usize, size: usize, sort: Sort) -> Result<Self> {
        if size == 0 {
            return Err(AroError::InvalidPageRequest(
                "size must be greater than zero".into(),
            ));
        }
        Ok(Self { page, size, sort })
    }

    /// Index of the first element of this page, `None` when it overflows.
    pub fn offset(&self) -> Option<usize> {
        self.page.checked_mul(self.size)
    }
}

/// Page envelope: an ordered slice plus its position in the full order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    /// Current page index.
    pub number: usize,
    /// Requested page size.
    pub size: usize,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, req: &PageRequest, total_elements: u64) -> Self {
        let size = req.size.max(1) as u64;
        let total_pages = total_elements.div_ceil(size);
        let number_of_elements = content.len();
        Self {
            empty: content.is_empty(),
            content,
            total_elements,
            total_pages,
            number: req.page,
            size: req.size,
            number_of_elements,
            first: req.page == 0,
            last: (req.page as u64).saturating_add(1) >= total_pages,
        }
    }
}

/// Order `records` per `req.sort` and cut out the requested page.
///
/// `records` is expected in insertion (id ascending) order, which lets the
/// `id,asc` case skip sorting entirely.
pub fn paginate(records: &[Metric], req: &PageRequest) -> Page<Metric> {
    let total = records.len() as u64;
    let start = match req.offset() {
        Some(s) if s < records.len() => s,
        _ => return Page::new(Vec::new(), req, total),
    };
    let end = start.saturating_add(req.size).min(records.len());

    if req.sort == Sort::new(SortField::Id, Direction::Asc) {
        return Page::new(records[start..end].to_vec(), req, total);
    }

    let mut ordered: Vec<&Metric> = records.iter().collect();
    ordered.sort_by(|a, b| req.sort.compare(a, b));
    let content = ordered[start..end].iter().map(|m| (*m).clone()).collect();
    Page::new(content, req, total)
}
