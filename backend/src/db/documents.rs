//! Nested document format exchanged with the store.
//!
//! ```json
//! {
//!   "id": "1", "Date": "2010-02-01", "C18A": true, "C18F": false, "C188": false,
//!   "Site Info": {"NGR": "TQ339712", "Site": "CRYSTAL PALACE", "Site Height": 80},
//!   "Aerial height(m)": 150, "Power(kW)": 10.0, "Freq": 225.648, "Block": "12B",
//!   "Service Labels": {"Serv Label1": "BBC R1", "Serv Label2": null, ...}
//! }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{MultiplexFlags, OutputRecord, ServiceLabels};

pub const SITE_INFO: &str = "Site Info";
pub const SERVICE_LABELS: &str = "Service Labels";

/// Fields a store may add to a document that are not part of the record.
pub const STORE_METADATA_FIELDS: [&str; 1] = ["_id"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    #[serde(rename = "NGR")]
    pub ngr: Option<String>,
    #[serde(rename = "Site")]
    pub site: Option<String>,
    #[serde(rename = "Site Height")]
    pub site_height: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DabDocument {
    pub id: String,
    #[serde(rename = "Date")]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub flags: MultiplexFlags,
    #[serde(rename = "Site Info")]
    pub site_info: SiteInfo,
    #[serde(rename = "Aerial height(m)")]
    pub aerial_height: i64,
    #[serde(rename = "Power(kW)")]
    pub power: f64,
    #[serde(rename = "Freq")]
    pub freq: Option<f64>,
    #[serde(rename = "Block")]
    pub block: Option<String>,
    #[serde(rename = "Service Labels")]
    pub service_labels: ServiceLabels,
}

/// Empty strings are a CSV artefact; they are stored as null.
fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

impl From<&OutputRecord> for DabDocument {
    fn from(r: &OutputRecord) -> Self {
        Self {
            id: r.id.clone(),
            date: r.date,
            flags: r.flags,
            site_info: SiteInfo {
                ngr: non_empty(&r.ngr),
                site: non_empty(&r.site),
                site_height: r.site_height,
            },
            aerial_height: r.aerial_height,
            power: r.power,
            freq: r.freq,
            block: non_empty(&r.block),
            service_labels: ServiceLabels {
                label1: non_empty(&r.service_labels.label1),
                label2: non_empty(&r.service_labels.label2),
                label3: non_empty(&r.service_labels.label3),
                label4: non_empty(&r.service_labels.label4),
                label10: non_empty(&r.service_labels.label10),
            },
        }
    }
}

/// Serialise output records into store documents.
pub fn serialize_records(records: &[OutputRecord]) -> Result<Vec<Value>, serde_json::Error> {
    records
        .iter()
        .map(|r| serde_json::to_value(DabDocument::from(r)))
        .collect()
}

/// Flatten nested objects into dotted keys, then strip the two group prefixes
/// so the result uses the flat output column names.
pub fn flatten_document(document: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(&mut flat, None, document);

    let prefixes = [format!("{}.", SITE_INFO), format!("{}.", SERVICE_LABELS)];
    flat.into_iter()
        .map(|(key, value)| {
            let key = prefixes
                .iter()
                .find_map(|p| key.strip_prefix(p.as_str()))
                .map(str::to_string)
                .unwrap_or(key);
            (key, value)
        })
        .collect()
}

fn flatten_into(out: &mut Map<String, Value>, prefix: Option<&str>, object: &Map<String, Value>) {
    for (key, value) in object {
        let name = match prefix {
            Some(p) => format!("{}.{}", p, key),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten_into(out, Some(&name), inner),
            other => {
                out.insert(name, other.clone());
            }
        }
    }
}
