//! Dataset cleaning.

use crate::data::frame::DataFrame;

/// Drop every row containing a missing value.
///
/// The raw dataset carries nulls in several measurement columns; downstream
/// stages require complete numeric rows.
pub fn drop_incomplete_rows(frame: &DataFrame) -> DataFrame {
    let rows = frame
        .rows
        .iter()
        .filter(|row| !row.iter().any(|cell| cell.is_null()))
        .cloned()
        .collect();
    DataFrame::new(frame.columns.clone(), rows)
}
