//! Page ranges walked by the listing resolver

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// A single value substituted into a listing URL template
///
/// Sites paginate with plain numbers (`?page=3`) as well as arbitrary path
/// fragments (`/archive/2021`), so explicit index lists accept both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum PageIndex {
    Number(i64),
    Text(String),
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Errors for malformed page ranges
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("step_page must be non-zero")]
    ZeroStep,

    #[error("step_page {step} never reaches end_page {end} from start_page {start}")]
    WrongSign { start: i64, end: i64, step: i64 },
}

/// The set of page indexes for one resolution call
///
/// An explicit list is used verbatim; a span is an arithmetic sequence from
/// `start` to `end`, both inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRange {
    Span { start: i64, end: i64, step: i64 },
    Explicit(Vec<PageIndex>),
}

impl PageRange {
    /// Checks that the range is finite
    pub fn validate(&self) -> Result<(), RangeError> {
        match *self {
            Self::Explicit(_) => Ok(()),
            Self::Span { start, end, step } => {
                if step == 0 {
                    return Err(RangeError::ZeroStep);
                }
                if (end > start && step < 0) || (end < start && step > 0) {
                    return Err(RangeError::WrongSign { start, end, step });
                }
                Ok(())
            }
        }
    }

    /// Number of listing pages this range visits
    ///
    /// For a span this is `(end - start) / step + 1`.
    pub fn page_count(&self) -> Result<usize, RangeError> {
        self.validate()?;
        Ok(match *self {
            Self::Explicit(ref list) => list.len(),
            Self::Span { start, end, step } => {
                ((i128::from(end) - i128::from(start)) / i128::from(step) + 1) as usize
            }
        })
    }

    /// Iterates the page indexes in visiting order
    ///
    /// Span indexes are produced one at a time, so a huge range costs nothing
    /// until it is walked.
    pub fn indices(&self) -> Result<PageIndices<'_>, RangeError> {
        self.validate()?;
        Ok(match *self {
            Self::Explicit(ref list) => PageIndices::Explicit(list.iter()),
            Self::Span { start, end, step } => PageIndices::Span {
                next: Some(start),
                end,
                step,
            },
        })
    }
}

/// Iterator returned by [`PageRange::indices`]
#[derive(Debug, Clone)]
pub enum PageIndices<'a> {
    Span {
        next: Option<i64>,
        end: i64,
        step: i64,
    },
    Explicit(std::slice::Iter<'a, PageIndex>),
}

impl Iterator for PageIndices<'_> {
    type Item = PageIndex;

    fn next(&mut self) -> Option<PageIndex> {
        match self {
            Self::Explicit(list) => list.next().cloned(),
            Self::Span { next, end, step } => {
                let current = (*next)?;
                let in_range = if *step > 0 {
                    current <= *end
                } else {
                    current >= *end
                };
                if !in_range {
                    *next = None;
                    return None;
                }
                *next = current.checked_add(*step);
                Some(PageIndex::Number(current))
            }
        }
    }
}
