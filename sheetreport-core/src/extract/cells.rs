//! Row-level cell extraction: run-length decoded columns

use crate::reader::Row;

/// Expand a row into its logical column values, keeping at most `width`.
///
/// A cell repeated N times contributes its content N times at its position.
/// Expansion stops at `width`, so a trailing filler cell repeated thousands of
/// times costs nothing.
pub fn extract_cells(row: &Row, width: usize, prefer_typed: bool) -> Vec<String> {
    let mut values = Vec::with_capacity(width.min(64));
    for cell in &row.cells {
        let content = cell.resolved(prefer_typed);
        for _ in 0..cell.repeated {
            if values.len() == width {
                return values;
            }
            values.push(content.to_string());
        }
    }
    values
}

/// Like [`extract_cells`], padded with empty strings to exactly `width` values
pub fn extract_cells_padded(row: &Row, width: usize, prefer_typed: bool) -> Vec<String> {
    let mut values = extract_cells(row, width, prefer_typed);
    values.resize(width, String::new());
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::RawCell;

    #[test]
    fn test_repeated_cell_expands_in_place() {
        let row = Row::new(vec![
            RawCell::text("id"),
            RawCell::text("0").repeated(4),
            RawCell::text("50"),
        ]);
        assert_eq!(
            extract_cells(&row, 34, false),
            vec!["id", "0", "0", "0", "0", "50"]
        );
    }

    #[test]
    fn test_window_truncates() {
        let row = Row::new(vec![
            RawCell::text("1"),
            RawCell::text("").repeated(1024),
        ]);
        let values = extract_cells(&row, 19, false);
        assert_eq!(values.len(), 19);
        assert_eq!(values[0], "1");
        assert!(values[1..].iter().all(|v| v.is_empty()));
    }

    #[test]
    fn test_empty_row_yields_nothing() {
        assert!(extract_cells(&Row::default(), 19, false).is_empty());
        assert_eq!(extract_cells_padded(&Row::default(), 3, false), vec!["", "", ""]);
    }

    #[test]
    fn test_padding_fills_short_rows() {
        let row = Row::new(vec![RawCell::text("A1"), RawCell::text("Ada")]);
        let values = extract_cells_padded(&row, 5, false);
        assert_eq!(values, vec!["A1", "Ada", "", "", ""]);
    }

    #[test]
    fn test_typed_values() {
        let row = Row::new(vec![RawCell::text("1 200,00 zł").with_value("1200").repeated(2)]);
        assert_eq!(extract_cells(&row, 5, true), vec!["1200", "1200"]);
        assert_eq!(
            extract_cells(&row, 5, false),
            vec!["1 200,00 zł", "1 200,00 zł"]
        );
    }
}
