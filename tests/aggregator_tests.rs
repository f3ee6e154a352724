use impulse_insights::aggregator::{
    compute_kpis, compute_triggers, default_triggers, filter_by_user, group_by_ordered_key,
    latest_row_risk, summarize_by_key, value_counts, ColumnPolicy,
};
use impulse_insights::parser::{CellValue, GroupCount, TransactionTable};
use impulse_insights::utils::config::DAYS_OF_WEEK;
use impulse_insights::utils::error::AggregateError;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn n(v: f64) -> CellValue {
    CellValue::Number(v)
}

fn t(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn three_transactions() -> TransactionTable {
    TransactionTable::new(
        vec!["Is_Impulse".into(), "Amount".into(), "Is_Weekend".into()],
        vec![
            vec![n(1.0), n(40.0), n(1.0)],
            vec![n(0.0), n(100.0), n(1.0)],
            vec![n(1.0), n(20.0), n(0.0)],
        ],
    )
}

#[test]
fn test_kpis_for_three_transactions() {
    let kpis = compute_kpis(&three_transactions(), ColumnPolicy::Optional).unwrap();

    assert_eq!(kpis.total, 3);
    assert_eq!(kpis.impulse_count, Some(2));
    assert_eq!(kpis.impulse_pct, Some(66.67));
    assert_eq!(kpis.avg_amount, Some(53.33));
    assert_eq!(kpis.avg_impulse_amount, Some(30.0));
    assert_eq!(kpis.avg_impulse_score, None);
}

#[test]
fn test_weekend_trigger_counts_only_impulse_rows() {
    let summary = compute_triggers(&three_transactions(), &default_triggers(0.7)).unwrap();

    assert_eq!(summary.counts.len(), 1);
    assert_eq!(summary.get("Weekend"), Some(1));
    assert_eq!(summary.get("Post-Salary Window"), None);
}

#[test]
fn test_triggers_require_impulse_column() {
    let table = TransactionTable::new(vec!["Is_Weekend".into()], vec![vec![n(1.0)]]);

    assert_eq!(
        compute_triggers(&table, &default_triggers(0.7)).unwrap_err(),
        AggregateError::MissingColumn { column: "Is_Impulse".to_string() }
    );
}

#[test]
fn test_weekday_pattern_is_zero_filled_in_calendar_order() {
    let table = TransactionTable::new(
        vec!["Day of Week".into(), "Is_Impulse".into()],
        vec![
            vec![t("Wednesday"), n(1.0)],
            vec![t("Monday"), n(1.0)],
            vec![t("Monday"), n(0.0)],
        ],
    );

    let pattern = group_by_ordered_key(&table, "Day of Week", &DAYS_OF_WEEK, true).unwrap();

    assert_eq!(
        pattern,
        vec![
            GroupCount::new("Monday", 1),
            GroupCount::new("Tuesday", 0),
            GroupCount::new("Wednesday", 1),
            GroupCount::new("Thursday", 0),
            GroupCount::new("Friday", 0),
            GroupCount::new("Saturday", 0),
            GroupCount::new("Sunday", 0),
        ]
    );
}

#[test]
fn test_latest_row_risk_uses_most_recent_timestamp() {
    let t1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
    let t2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap().and_hms_opt(9, 0, 0).unwrap();

    let table = TransactionTable::new(
        vec!["Timestamp".into(), "Impulse_Score".into()],
        vec![
            vec![CellValue::DateTime(t2), n(0.3)],
            vec![CellValue::DateTime(t1), n(0.9)],
        ],
    );

    let latest = latest_row_risk(&table, "Impulse_Score", "Timestamp", 0.7)
        .unwrap()
        .unwrap();

    assert_eq!(latest.timestamp, t2);
    assert_eq!(latest.row, 0);
    assert_eq!(latest.score, 0.3);
    assert!(!latest.risky);
}

#[test]
fn test_latest_row_risk_threshold_is_inclusive() {
    let table = TransactionTable::new(
        vec!["Timestamp".into(), "Impulse_Score".into()],
        vec![vec![t("2024-05-01 20:15:00"), n(0.7)]],
    );

    let latest = latest_row_risk(&table, "Impulse_Score", "Timestamp", 0.7)
        .unwrap()
        .unwrap();

    assert!(latest.risky);
}

#[test]
fn test_monthly_summary_natural_order() {
    let table = TransactionTable::new(
        vec!["Month".into(), "Amount".into(), "Is_Impulse".into()],
        vec![
            vec![n(10.0), n(5.0), n(1.0)],
            vec![n(2.0), n(7.5), n(0.0)],
            vec![n(10.0), n(2.5), n(0.0)],
        ],
    );

    let summary = summarize_by_key(&table, "Month").unwrap();

    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].key, "2");
    assert_eq!(summary[1].key, "10");
    assert_eq!(summary[1].transactions, 2);
    assert_eq!(summary[1].amount_total, Some(7.5));
    assert_eq!(summary[1].impulse_count, Some(1));
}

#[test]
fn test_value_counts_descending() {
    let table = TransactionTable::new(
        vec!["Time_Of_Day_Bucket".into()],
        vec![vec![t("Evening")], vec![t("Morning")], vec![t("Evening")]],
    );

    let counts = value_counts(&table, "Time_Of_Day_Bucket").unwrap();

    assert_eq!(counts, vec![GroupCount::new("Evening", 2), GroupCount::new("Morning", 1)]);
}

#[test]
fn test_filter_by_user_then_kpis() {
    let table = TransactionTable::new(
        vec!["User_ID".into(), "Is_Impulse".into(), "Amount".into()],
        vec![
            vec![n(7.0), n(1.0), n(10.0)],
            vec![t("U2"), n(0.0), n(30.0)],
            vec![n(7.0), n(0.0), n(20.0)],
        ],
    );

    let filtered = filter_by_user(&table, "7").unwrap();
    let kpis = compute_kpis(&filtered, ColumnPolicy::Optional).unwrap();

    assert_eq!(kpis.total, 2);
    assert_eq!(kpis.impulse_pct, Some(50.0));
    assert_eq!(table.row_count(), 3);
}
