//! End-to-end scenarios for the wrangling pipeline over real CSV files.

mod support;

use chrono::NaiveDate;
use dab_rust::db::{fetch_output_records, upload_records, LocalRepository};
use dab_rust::error::{InputError, JoinSide, PipelineError};
use dab_rust::models::Multiplex;
use dab_rust::parsing::Encoding;
use dab_rust::preprocessing::{validate_input_paths, WranglingPipeline};
use dab_rust::services::{clean_and_upload, summarize, IngestError};
use dab_rust::api::StatisticsFilter;

#[test]
fn test_standard_run_report() {
    let fx = support::standard_extracts();
    let result = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap();

    let report = &result.report;
    assert_eq!(report.antenna_rows, 5);
    assert_eq!(report.params_rows, 5);
    assert_eq!(report.merged_rows, 5);
    assert_eq!(report.after_dedup, 5);
    // SE213515 is on the exclusion list; CE15 is not tracked.
    assert_eq!(report.after_exclusion, 4);
    assert_eq!(report.after_multiplex_filter, 3);
    assert_eq!(report.antenna_encoding, Encoding::Utf8);
    assert!(report.date_warnings.is_empty());

    let ids: Vec<&str> = result.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn test_params_site_column_does_not_shadow_antenna() {
    let header = "id,EID,Site,Date,Freq.,Block,Serv Label1,Serv Label2,Serv Label3,Serv Label4,Serv Label10";
    let params = format!("{header}\n1,C18A,somewhere else,01/02/2010,225.648,12B,bbc r1,,,,\n");
    let fx = support::write_extracts_bytes(&["1,TQ 339 712,crystal palace,80,150,10,"], params.into_bytes());

    let result = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap();

    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.site.as_deref(), Some("CRYSTAL PALACE"));
    assert_eq!(record.freq, Some(225.648));
    assert!(record.belongs_to(Multiplex::C18A));
}

#[test]
fn test_text_is_normalised() {
    let fx = support::standard_extracts();
    let records = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap()
        .records;

    let first = &records[0];
    assert_eq!(first.site.as_deref(), Some("CRYSTAL PALACE"));
    assert_eq!(first.ngr.as_deref(), Some("TQ339712"));
    assert_eq!(first.service_labels.label1.as_deref(), Some("BBC R1"));
    assert!(first.flags.c18a);
    // Lower-case EIDs are normalised before extraction.
    assert!(records[1].belongs_to(Multiplex::C18A));
}

#[test]
fn test_latin1_params_decode_without_loss() {
    let fx = support::write_extracts_bytes(
        &["1,TQ 339 712,crystal palace,80,150,10,"],
        support::latin1_params(&["1,C18A,01/02/2010,225.648,12B,radio {e0} la carte,,,,,"]),
    );
    let result = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap();

    assert_eq!(result.report.params_encoding, Encoding::Latin1);
    assert_eq!(result.report.antenna_encoding, Encoding::Utf8);
    assert_eq!(
        result.records[0].service_labels.label1.as_deref(),
        Some("RADIO À LA CARTE")
    );
}

#[test]
fn test_excluded_ngr_is_dropped_regardless_of_other_fields() {
    let fx = support::write_extracts(
        &[
            "1,NZ 0255 3847,pontop pike,300,200,100,",
            "2,TQ 339 712,crystal palace,80,150,10,",
        ],
        &[
            "1,C18A,01/02/2010,225.648,12B,BBC R1,,,,,",
            "2,C18A,01/02/2010,225.648,12B,BBC R1,,,,,",
        ],
    );
    let records = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap()
        .records;

    assert_eq!(records.len(), 1);
    assert!(records.iter().all(|r| r.ngr.as_deref() != Some("NZ02553847")));
}

#[test]
fn test_british_date_format_wins() {
    let fx = support::standard_extracts();
    let records = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap()
        .records;

    assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2010, 2, 1));
    assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2004, 6, 30));
    assert_eq!(records[2].date, NaiveDate::from_ymd_opt(2012, 3, 15));
}

#[test]
fn test_unparseable_date_is_a_warning() {
    let fx = support::write_extracts(
        &["1,TQ 339 712,crystal palace,80,150,10,"],
        &["1,C18A,sometime,225.648,12B,BBC R1,,,,,"],
    );
    let result = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].date, None);
    assert_eq!(result.report.date_warnings.len(), 1);
    assert_eq!(result.report.date_warnings[0].id, "1");
}

#[test]
fn test_join_never_grows_antenna_rows() {
    let fx = support::write_extracts(
        &[
            "1,TQ 339 712,a,80,150,10,",
            "2,TQ 339 713,b,80,150,10,",
        ],
        &[
            "1,C18A,01/02/2010,225.648,12B,BBC R1,,,,,",
            "9,C18A,01/02/2010,225.648,12B,BBC R1,,,,,",
        ],
    );
    let result = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap();

    assert!(result.report.merged_rows <= result.report.antenna_rows);
    // Antenna 2 has no params row, hence no EID, hence no multiplex.
    assert_eq!(result.records.len(), 1);
}

#[test]
fn test_duplicate_params_id_aborts_run() {
    let fx = support::write_extracts(
        &["1,TQ 339 712,a,80,150,10,"],
        &[
            "1,C18A,01/02/2010,225.648,12B,BBC R1,,,,,",
            "1,C18F,01/02/2010,225.648,12B,BBC R2,,,,,",
        ],
    );
    let err = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::JoinCardinality {
            side: JoinSide::Params,
            ..
        }
    ));
}

#[test]
fn test_non_numeric_power_aborts_run() {
    let fx = support::write_extracts(
        &["1,TQ 339 712,a,80,150,lots,"],
        &["1,C18A,01/02/2010,225.648,12B,BBC R1,,,,,"],
    );
    let err = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidNumeric { .. }));
}

#[test]
fn test_summary_statistics_scenario() {
    let fx = support::write_extracts(
        &[
            "1,TQ 1,a,80,10,10,",
            "2,TQ 2,b,80,10,20,",
            "3,TQ 3,c,10,10,30,",
        ],
        &[
            "1,C18A,01/02/2010,225.648,12B,X,,,,,",
            "2,C18A,01/02/2010,225.648,12B,X,,,,,",
            "3,C18A,01/02/2010,225.648,12B,X,,,,,",
        ],
    );
    let records = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap()
        .records;

    let stat = summarize(&records, Multiplex::C18A, StatisticsFilter::SiteHeightAbove75).unwrap();
    assert_eq!((stat.mean, stat.median, stat.mode), (15.0, 15.0, 10.0));
}

#[tokio::test]
async fn test_records_survive_store_round_trip() {
    let fx = support::standard_extracts();
    let records = WranglingPipeline::new()
        .process(&fx.antenna, &fx.params)
        .unwrap()
        .records;

    let repo = LocalRepository::new();
    upload_records(&repo, &records).await.unwrap();
    let fetched = fetch_output_records(&repo).await.unwrap();
    assert_eq!(fetched, records);
}

#[tokio::test]
async fn test_swapped_files_are_rejected_before_store() {
    let fx = support::standard_extracts();
    assert!(validate_input_paths(&fx.params, &fx.antenna).is_err());

    let repo = LocalRepository::new();
    let err = clean_and_upload(&repo, &fx.params, &fx.antenna)
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Input(InputError::WrongFile { .. })));
    assert_eq!(repo.last_upload(), None);
}
