use impulse_insights::output::{export_csv, export_snapshot, snapshot_mime_type};
use impulse_insights::parser::{read_csv_bytes, read_xlsx_bytes, CellValue, TransactionTable};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn mixed_table() -> TransactionTable {
    let when = NaiveDate::from_ymd_opt(2024, 6, 14)
        .unwrap()
        .and_hms_opt(21, 30, 5)
        .unwrap();

    TransactionTable::new(
        vec![
            "Timestamp".into(),
            "Category".into(),
            " Amount ".into(),
            "Is_Impulse".into(),
            "Note".into(),
        ],
        vec![
            vec![
                CellValue::DateTime(when),
                CellValue::Text("Fashion".into()),
                CellValue::Number(59.99),
                CellValue::Bool(true),
                CellValue::Empty,
            ],
            vec![
                CellValue::DateTime(when),
                CellValue::Text("Groceries".into()),
                CellValue::Number(12.0),
                CellValue::Bool(false),
                CellValue::Text("weekly shop\r\nbulk buy".into()),
            ],
        ],
    )
}

#[test]
fn test_xlsx_snapshot_reads_back_identically() {
    let table = mixed_table();

    let bytes = export_snapshot(&table).unwrap();
    let decoded = read_xlsx_bytes(&bytes).unwrap();

    assert_eq!(decoded, table);
}

#[test]
fn test_xlsx_snapshot_is_deterministic() {
    let table = mixed_table();

    let first = export_snapshot(&table).unwrap();
    let second = export_snapshot(&table).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_empty_table_exports_header_only() {
    let table = TransactionTable::new(vec!["Is_Impulse".into(), "Amount".into()], vec![]);

    let decoded = read_xlsx_bytes(&export_snapshot(&table).unwrap()).unwrap();

    assert_eq!(decoded.columns(), table.columns());
    assert_eq!(decoded.row_count(), 0);
}

#[test]
fn test_snapshot_mime_type() {
    assert_eq!(
        snapshot_mime_type(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
}

#[test]
fn test_csv_snapshot_keeps_columns_and_values() {
    let table = TransactionTable::new(
        vec!["Category".into(), "Amount".into()],
        vec![
            vec![CellValue::Text("Food, drinks".into()), CellValue::Number(4.5)],
            vec![CellValue::Text("Travel".into()), CellValue::Empty],
        ],
    );

    let decoded = read_csv_bytes(&export_csv(&table).unwrap()).unwrap();

    assert_eq!(decoded, table);
}
