use super::*;
use chrono::NaiveDate;
use proptest::prelude::*;

const HEADERS: [&str; 11] = [
    " id",
    "NGR ",
    "Site",
    "Site Height",
    "In-Use Ae Ht",
    "In-Use ERP Total",
    "EID",
    "Date",
    "Freq.",
    "Block",
    "Serv Label1",
];

fn merged(rows: &[[&str; 11]]) -> Table {
    let mut table = Table::new(HEADERS.iter().map(|h| h.to_string()).collect());
    for row in rows {
        table.push_row(
            row.iter()
                .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
                .collect(),
        );
    }
    table
}

fn row<'a>(id: &'a str, power: &'a str, date: &'a str) -> [&'a str; 11] {
    [
        id, "TQ 339 712", "  crystal   palace ", "80", "150", power, "C18A", date, "225.648",
        "12B", "bbc  radio 1",
    ]
}

#[test]
fn test_clean_normalises_text_and_numbers() {
    let data = clean(merged(&[row("1", "1,000.5", "01/02/2010")])).unwrap();
    let record = &data.records[0];

    assert_eq!(record.id, "1");
    assert_eq!(record.ngr.as_deref(), Some("TQ339712"));
    assert_eq!(record.site.as_deref(), Some("CRYSTAL PALACE"));
    assert_eq!(record.site_height, 80);
    assert_eq!(record.aerial_height, 150);
    assert_eq!(record.power, 1000.5);
    assert_eq!(record.freq, Some(225.648));
    assert_eq!(record.eid.as_deref(), Some("C18A"));
    assert_eq!(record.service_labels.label1.as_deref(), Some("BBC RADIO 1"));
    assert!(record.extra.is_empty());
}

#[test]
fn test_freq_alias_is_renamed() {
    let mut table = merged(&[row("1", "10", "")]);
    table.trim_headers();
    assert!(table.column_index("Freq.").is_some());
    let data = clean(table).unwrap();
    assert_eq!(data.records[0].freq, Some(225.648));
}

#[test]
fn test_date_british_format_wins() {
    let data = clean(merged(&[row("1", "10", "01/02/2010")])).unwrap();
    assert_eq!(
        data.records[0].date,
        Some(NaiveDate::from_ymd_opt(2010, 2, 1).unwrap())
    );
}

#[test]
fn test_parse_date_fallback_formats() {
    let expected = NaiveDate::from_ymd_opt(2010, 2, 1);
    assert_eq!(parse_date("2010-02-01"), expected);
    assert_eq!(parse_date("01-02-2010"), expected);
    assert_eq!(parse_date("1/2/2010"), expected);
    assert_eq!(parse_date("01/02/2010 00:00:00"), expected);
    assert_eq!(parse_date("2010-02-01T00:00:00"), expected);
    assert_eq!(parse_date("SOMETIME IN 2010"), None);
    assert_eq!(parse_date(""), None);
}

#[test]
fn test_unparseable_date_is_a_warning() {
    let data = clean(merged(&[row("1", "10", "not a date"), row("2", "10", "")])).unwrap();
    assert_eq!(data.records.len(), 2);
    assert_eq!(data.records[0].date, None);
    assert_eq!(
        data.report.date_warnings,
        vec![DateWarning {
            id: "1".into(),
            value: "NOT A DATE".into()
        }]
    );
}

#[test]
fn test_duplicate_rows_removed() {
    let data = clean(merged(&[row("1", "10", ""), row("1", "10", ""), row("2", "10", "")])).unwrap();
    assert_eq!(data.report.duplicates_removed, 1);
    assert_eq!(data.records.len(), 2);
}

#[test]
fn test_missing_required_number_is_fatal() {
    let mut missing = row("9", "10", "");
    missing[3] = "";
    let err = clean(merged(&[missing])).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MissingNumeric { ref id, ref column } if id == "9" && column == "Site Height"
    ));
}

#[test]
fn test_malformed_power_is_fatal() {
    let err = clean(merged(&[row("3", "ten", "")])).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidNumeric { ref value, .. } if value == "TEN"));
}

#[test]
fn test_params_less_row_is_tolerated() {
    let mut lonely = row("4", "10", "");
    for cell in lonely.iter_mut().skip(6) {
        *cell = "";
    }
    let data = clean(merged(&[lonely])).unwrap();
    let record = &data.records[0];
    assert_eq!(record.eid, None);
    assert_eq!(record.freq, None);
    assert_eq!(record.date, None);
    assert_eq!(record.service_labels, ServiceLabels::default());
}

#[test]
fn test_normalize_text_blank_is_none() {
    assert_eq!(normalize_text(Some("   ".into())), None);
    assert_eq!(normalize_text(None), None);
    assert_eq!(normalize_text(Some("a\t b\n".into())), Some("A B".into()));
}

fn text_strategy() -> impl Strategy<Value = String> {
    "[ a-zA-Z0-9\t]{0,12}"
}

proptest! {
    #[test]
    fn prop_clean_is_idempotent(
        sites in proptest::collection::vec(text_strategy(), 1..8),
        labels in proptest::collection::vec(text_strategy(), 1..8),
        heights in proptest::collection::vec(0i64..400, 1..8),
        powers in proptest::collection::vec(0u32..100_000, 1..8),
    ) {
        let n = sites.len().min(labels.len()).min(heights.len()).min(powers.len());
        let ids: Vec<String> = (0..n).map(|i| format!("id{}", i)).collect();
        let heights: Vec<String> = heights.iter().map(|h| h.to_string()).collect();
        let powers: Vec<String> = powers.iter().map(|p| format!("{},{:03}", p / 1000, p % 1000)).collect();

        let rows: Vec<[&str; 11]> = (0..n)
            .map(|i| [
                ids[i].as_str(), "tq 1 2", sites[i].as_str(), heights[i].as_str(), "10",
                powers[i].as_str(), "c18a", "01/02/2010", "225.648", "12b", labels[i].as_str(),
            ])
            .collect();

        let once = clean(merged(&rows)).unwrap();
        let twice = clean(CleanedRecord::to_table(&once.records)).unwrap();
        prop_assert_eq!(&once.records, &twice.records);
        prop_assert_eq!(twice.report.duplicates_removed, 0);
        prop_assert!(twice.report.date_warnings.is_empty());
    }
}
