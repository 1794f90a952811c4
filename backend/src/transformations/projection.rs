//! Projection onto the client-facing output contract.

use crate::models::{MultiplexRecord, OutputRecord};

/// Rename and select the output columns. `In-Use Ae Ht` becomes
/// `Aerial height(m)` and `In-Use ERP Total` becomes `Power(kW)`; the column
/// order is [`crate::models::columns::OUTPUT`].
pub fn project(records: Vec<MultiplexRecord>) -> Vec<OutputRecord> {
    records.into_iter().map(project_one).collect()
}

fn project_one(MultiplexRecord { record, flags }: MultiplexRecord) -> OutputRecord {
    OutputRecord {
        id: record.id,
        ngr: record.ngr,
        flags,
        site: record.site,
        site_height: record.site_height,
        aerial_height: record.aerial_height,
        power: record.power,
        date: record.date,
        freq: record.freq,
        block: record.block,
        service_labels: record.service_labels,
    }
}
