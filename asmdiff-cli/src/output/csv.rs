//! CSV rendering of report rows.

use std::borrow::Cow;

use super::Row;

/// Header line followed by one line per row, in row order.
pub fn to_csv<R: Row>(rows: &[R]) -> String {
    let mut lines = vec![R::HEADERS.join(",")];
    for row in rows {
        let cells: Vec<String> = row.cells().iter().map(|c| escape(c).into_owned()).collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

/// Quote cells holding a separator, quote or line break. Signatures with
/// several parameters (`Run(Int32 a,Int32 b)`) always need this.
fn escape(cell: &str) -> Cow<'_, str> {
    if cell.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}
