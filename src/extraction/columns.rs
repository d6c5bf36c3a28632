//! Numeric tokens and column layout detection.
//!
//! Paystubs print amounts in columns whose order varies between payroll
//! providers. A header line naming the columns (e.g. `Rate Hours This Period
//! Year to Date`) fixes the order for the lines that follow it.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use super::patterns::{
    RE_AMOUNT, RE_MARKER_HOURS, RE_MARKER_RATE, RE_MARKER_THIS_PERIOD, RE_MARKER_YTD, find_offset,
};

/// A monetary token found on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountToken {
    /// The unsigned magnitude of the amount.
    pub value: Decimal,
    /// Byte offset where the token's match begins.
    pub start: usize,
}

/// Finds every monetary token on a line, left to right.
pub fn amounts(line: &str) -> Vec<AmountToken> {
    let Some(re) = RE_AMOUNT.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let int = caps.name("int")?.as_str().replace(',', "");
            let frac = caps.name("frac")?.as_str();
            let value = Decimal::from_str(&format!("{}.{}", int, frac)).ok()?;
            Some(AmountToken {
                value: value.abs(),
                start: whole.start(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Rate,
    Hours,
    ThisPeriod,
    YearToDate,
}

/// The column order established by a header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Number of numeric columns named by the header.
    pub columns: usize,
    /// Index of the this-period column.
    pub this_period: usize,
    /// Index of the year-to-date column.
    pub year_to_date: usize,
}

impl ColumnLayout {
    /// Detects a header line naming both a this-period and a year-to-date column.
    pub fn detect(line: &str) -> Option<Self> {
        let mut markers = vec![
            (find_offset(&RE_MARKER_THIS_PERIOD, line)?, Column::ThisPeriod),
            (find_offset(&RE_MARKER_YTD, line)?, Column::YearToDate),
        ];
        if let Some(offset) = find_offset(&RE_MARKER_RATE, line) {
            markers.push((offset, Column::Rate));
        }
        if let Some(offset) = find_offset(&RE_MARKER_HOURS, line) {
            markers.push((offset, Column::Hours));
        }
        markers.sort_by_key(|(offset, _)| *offset);

        let index_of = |column: Column| markers.iter().position(|(_, c)| *c == column);
        let layout = Self {
            columns: markers.len(),
            this_period: index_of(Column::ThisPeriod)?,
            year_to_date: index_of(Column::YearToDate)?,
        };
        debug!(
            columns = layout.columns,
            this_period = layout.this_period,
            year_to_date = layout.year_to_date,
            "Detected column header"
        );
        Some(layout)
    }

    /// Maps a column index onto a line with `count` numbers, aligning the
    /// line's numbers with the rightmost header columns.
    fn resolve(&self, column: usize, count: usize) -> Option<usize> {
        let index = column as isize + count as isize - self.columns as isize;
        (0..count as isize).contains(&index).then_some(index as usize)
    }
}

/// The this-period and year-to-date values chosen from a line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnValues {
    /// The amount for the current pay period.
    pub this_period: Option<Decimal>,
    /// The year-to-date amount.
    pub year_to_date: Option<Decimal>,
}

/// Picks this-period and YTD values from a line's amounts.
///
/// The header layout is used when both of its columns resolve on the line;
/// otherwise the first amount is this period and the second is year to date.
pub fn select(layout: Option<&ColumnLayout>, tokens: &[AmountToken]) -> ColumnValues {
    let count = tokens.len();
    if let Some(layout) = layout {
        if let (Some(this_period), Some(year_to_date)) = (
            layout.resolve(layout.this_period, count),
            layout.resolve(layout.year_to_date, count),
        ) {
            return ColumnValues {
                this_period: Some(tokens[this_period].value),
                year_to_date: Some(tokens[year_to_date].value),
            };
        }
    }
    ColumnValues {
        this_period: tokens.first().map(|t| t.value),
        year_to_date: tokens.get(1).map(|t| t.value),
    }
}
