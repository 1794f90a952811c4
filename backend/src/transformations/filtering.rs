//! Record exclusion and multiplex extraction.

use log::debug;

use crate::models::{CleanedRecord, MultiplexFlags, MultiplexRecord};

/// NGRs known to be wrong in the source extracts.
pub const INVALID_NGRS: [&str; 4] = ["NZ02553847", "SE213515", "NT05399374", "NT25265908"];

pub fn is_invalid_ngr(ngr: Option<&str>) -> bool {
    ngr.is_some_and(|n| INVALID_NGRS.contains(&n))
}

/// Drop records whose NGR is on the exclusion list.
pub fn exclude_invalid_ngrs(records: Vec<CleanedRecord>) -> Vec<CleanedRecord> {
    let before = records.len();
    let kept: Vec<CleanedRecord> = records
        .into_iter()
        .filter(|r| !is_invalid_ngr(r.ngr.as_deref()))
        .collect();
    debug!("Excluded {} records with invalid NGRs", before - kept.len());
    kept
}

/// Tag each record with its multiplex flags and keep only tracked multiplexes.
pub fn extract_multiplexes(records: Vec<CleanedRecord>) -> Vec<MultiplexRecord> {
    let before = records.len();
    let kept: Vec<MultiplexRecord> = records
        .into_iter()
        .filter_map(|record| {
            let flags = MultiplexFlags::from_eid(record.eid.as_deref());
            flags.any().then_some(MultiplexRecord { record, flags })
        })
        .collect();
    debug!(
        "Kept {} of {} records in tracked multiplexes",
        kept.len(),
        before
    );
    kept
}
