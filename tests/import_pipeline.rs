//! End-to-end import pipeline: raw pasted text → normalized table →
//! fresh items → exported bytes.

use std::collections::BTreeMap;

use checkin_board::boards::items_from_table;
use checkin_board::contract::{MockWorkbookReader, WorkbookReader};
use checkin_board::export::export_board_as_csv;
use checkin_board::model::Item;
use checkin_board::normalize::{normalize_flexible_input, NormalizedTable};

#[test]
fn name_pair_scenario() {
    let result = normalize_flexible_input("Alice Smith, Bob Jones");
    assert_eq!(result.columns, vec!["Check", "Name", "Lastname"]);
    assert_eq!(
        result.rows,
        vec![
            BTreeMap::from([
                ("Check".to_string(), "".to_string()),
                ("Name".to_string(), "Alice".to_string()),
                ("Lastname".to_string(), "Smith".to_string()),
            ]),
            BTreeMap::from([
                ("Check".to_string(), "".to_string()),
                ("Name".to_string(), "Bob".to_string()),
                ("Lastname".to_string(), "Jones".to_string()),
            ]),
        ]
    );
}

#[test]
fn id_list_scenario() {
    let result = normalize_flexible_input("f0012345, f0098765");
    assert_eq!(result.columns, vec!["Check", "ID"]);
    assert_eq!(result.rows[0]["ID"], "f0012345");
    assert_eq!(result.rows[1]["ID"], "f0098765");
}

#[test]
fn header_csv_scenario() {
    let result = normalize_flexible_input("Name,ID\nAna,1001\nLuis,1002");
    assert_eq!(result.columns, vec!["Name", "ID"]);
    assert_eq!(result.rows[0]["Name"], "Ana");
    assert_eq!(result.rows[0]["ID"], "1001");
    assert_eq!(result.rows[1]["Name"], "Luis");
    assert_eq!(result.rows[1]["ID"], "1002");
}

#[test]
fn normalization_is_total_over_hostile_input() {
    for input in [
        "",
        ",,,,",
        "\"unterminated, quote\nand more",
        "émile, 日本語, \t\t",
        "a,b,c\n1,2\n1,2,3,4",
    ] {
        let result = normalize_flexible_input(input);
        for row in &result.rows {
            assert_eq!(row.len(), result.columns.len(), "input: {input:?}");
        }
    }
}

#[test]
fn preview_table_becomes_items_and_exports() {
    let result = normalize_flexible_input("Alice Smith, Bob Jones");
    let table = NormalizedTable {
        columns: result.columns,
        rows: result.rows,
    };
    let items = items_from_table(&table);
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| !i.checked_in));

    let uids: Vec<&str> = items.iter().map(|i| i.uid.as_str()).collect();
    assert_ne!(uids[0], uids[1]);

    let csv = String::from_utf8(export_board_as_csv(&items, &[])).unwrap();
    let lines: Vec<&str> = csv.split("\r\n").collect();
    assert_eq!(lines[0], "checkedIn,Lastname,Name");
    assert_eq!(lines[1], "\"\",\"Smith\",\"Alice\"");
}

#[test]
fn export_scenario_without_column_order() {
    let mut ana = Item::new(BTreeMap::from([(
        "Name".to_string(),
        "Ana".to_string(),
    )]));
    ana.checked_in = true;
    let luis = Item::new(BTreeMap::from([(
        "Name".to_string(),
        "Luis".to_string(),
    )]));

    let csv = String::from_utf8(export_board_as_csv(&[ana, luis], &[])).unwrap();
    let lines: Vec<&str> = csv.split("\r\n").collect();
    assert_eq!(lines[0], "checkedIn,Name");
    assert_eq!(lines[1], "\"x\",\"Ana\"");
    assert_eq!(lines[2], "\"\",\"Luis\"");
}

#[test]
fn workbook_collaborator_feeds_the_normalizer() {
    // The spreadsheet file parser is an external collaborator; the core
    // only needs its CSV-like text output.
    let mut reader = MockWorkbookReader::new();
    reader
        .expect_read_workbook_first_sheet_as_csv()
        .returning(|_| Ok("Name,ID\nAna,1001".to_string()));

    let text = reader
        .read_workbook_first_sheet_as_csv(b"\x50\x4b fake xlsx bytes")
        .unwrap();
    let result = normalize_flexible_input(&text);
    assert_eq!(result.columns, vec!["Name", "ID"]);
    assert_eq!(result.rows.len(), 1);
}
