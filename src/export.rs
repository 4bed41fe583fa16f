//! Export formatter: board items → CSV or XLSX bytes.
//!
//! Both paths emit the same logical header-then-data order for a given
//! input. The stored column order wins when present (with the internal
//! identifier filtered out); otherwise the first row's keys are used.
//! `checkedIn` is always forced to the first position and renders as a
//! literal "x" marker when true, empty when false — never "true"/"false".

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};

use crate::model::{Item, CHECKED_IN_FIELD, UID_FIELD};

/// Marker written for a checked-in attendee.
const CHECK_MARK: &str = "x";

const MIN_COLUMN_WIDTH: usize = 10;
const MAX_COLUMN_WIDTH: usize = 32;

#[derive(Debug, thiserror::Error)]
#[error("spreadsheet generation failed: {0}")]
pub struct ExportError(#[from] XlsxError);

/// Resolve the export column order: provided order if non-empty (minus the
/// identifier field, case-insensitively), else the first row's keys, with
/// `checkedIn` forced to the front.
fn export_columns(items: &[Item], column_order: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = if column_order.is_empty() {
        items
            .first()
            .map(|item| item.fields.keys().cloned().collect())
            .unwrap_or_default()
    } else {
        column_order.to_vec()
    };
    columns.retain(|col| {
        !col.eq_ignore_ascii_case(UID_FIELD) && !col.eq_ignore_ascii_case(CHECKED_IN_FIELD)
    });
    columns.insert(0, CHECKED_IN_FIELD.to_string());
    columns
}

fn cell_text<'a>(item: &'a Item, column: &str) -> &'a str {
    if column == CHECKED_IN_FIELD {
        if item.checked_in {
            CHECK_MARK
        } else {
            ""
        }
    } else {
        item.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Render items as CSV: unquoted header, double-quote-wrapped data cells
/// with internal quotes doubled, CRLF row separators.
pub fn export_board_as_csv(items: &[Item], column_order: &[String]) -> Vec<u8> {
    if items.is_empty() {
        return Vec::new();
    }
    let columns = export_columns(items, column_order);

    let mut lines = vec![columns.join(",")];
    for item in items {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| format!("\"{}\"", cell_text(item, col).replace('"', "\"\"")))
            .collect();
        lines.push(cells.join(","));
    }
    lines.join("\r\n").into_bytes()
}

/// Spreadsheet header label: `checkedIn` gets a friendly title, other
/// columns are capitalized.
fn header_label(column: &str) -> String {
    if column == CHECKED_IN_FIELD {
        return "Checked In".to_string();
    }
    let mut chars = column.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Render items as an XLSX workbook with the same logical order as the CSV
/// path, plus presentational styling: bounded column widths, a bold green
/// header row, alternating data-row fill and a centered check-in column.
pub fn export_board_as_xlsx(
    items: &[Item],
    column_order: &[String],
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Board")?;

    if items.is_empty() {
        return Ok(workbook.save_to_buffer()?);
    }
    let columns = export_columns(items, column_order);

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xBBF7D0))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0x34D399))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);

    let data_format = |row_index: usize, is_check_column: bool| {
        let mut format = Format::new()
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(0xB8E0D2))
            .set_background_color(if row_index % 2 == 0 {
                // First data row and every second one after it get the tint.
                Color::RGB(0xF0FDF4)
            } else {
                Color::White
            });
        if is_check_column {
            format = format
                .set_bold()
                .set_font_color(Color::RGB(0x059669))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter);
        }
        format
    };

    for (col, column) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header_label(column), &header_format)?;
    }
    for (row, item) in items.iter().enumerate() {
        for (col, column) in columns.iter().enumerate() {
            let format = data_format(row, col == 0);
            sheet.write_string_with_format(
                (row + 1) as u32,
                col as u16,
                cell_text(item, column),
                &format,
            )?;
        }
    }

    // Deterministic widths from content length, clamped.
    for (col, column) in columns.iter().enumerate() {
        let mut max_len = header_label(column).chars().count();
        for item in items {
            max_len = max_len.max(cell_text(item, column).chars().count());
        }
        let width = (max_len + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        sheet.set_column_width(col as u16, width as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn item(checked_in: bool, pairs: &[(&str, &str)]) -> Item {
        let mut item = Item::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        );
        item.checked_in = checked_in;
        item
    }

    #[test]
    fn csv_puts_checked_in_first_and_marks_with_x() {
        let items = vec![
            item(true, &[("Name", "Ana")]),
            item(false, &[("Name", "Luis")]),
        ];
        let csv = String::from_utf8(export_board_as_csv(&items, &[])).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "checkedIn,Name");
        assert_eq!(lines[1], "\"x\",\"Ana\"");
        assert_eq!(lines[2], "\"\",\"Luis\"");
    }

    #[test]
    fn csv_honors_stored_column_order_and_drops_uid() {
        let items = vec![item(false, &[("Name", "Ana"), ("ID", "1001")])];
        let order = vec![
            "ID".to_string(),
            "uid".to_string(),
            "Name".to_string(),
            "checkedIn".to_string(),
        ];
        let csv = String::from_utf8(export_board_as_csv(&items, &order)).unwrap();
        assert!(csv.starts_with("checkedIn,ID,Name"));
        assert!(!csv.to_lowercase().contains("uid"));
    }

    #[test]
    fn csv_escapes_internal_quotes() {
        let items = vec![item(false, &[("Name", "Ana \"Annie\"")])];
        let csv = String::from_utf8(export_board_as_csv(&items, &[])).unwrap();
        assert!(csv.contains("\"Ana \"\"Annie\"\"\""));
    }

    #[test]
    fn empty_items_export_no_csv_rows() {
        assert!(export_board_as_csv(&[], &[]).is_empty());
    }

    #[test]
    fn xlsx_produces_a_workbook() {
        let items = vec![
            item(true, &[("Name", "Ana")]),
            item(false, &[("Name", "Luis")]),
        ];
        let bytes = export_board_as_xlsx(&items, &[]).unwrap();
        // XLSX containers are zip files.
        assert_eq!(&bytes[..2], b"PK");
    }
}
