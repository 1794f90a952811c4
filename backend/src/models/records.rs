//! Typed records produced by the cleaning, extraction and projection stages.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::multiplex::{Multiplex, MultiplexFlags};
use super::table::{Cell, Table};

/// Source and output column names.
pub mod columns {
    pub const ID: &str = "id";
    pub const NGR: &str = "NGR";
    pub const SITE: &str = "Site";
    pub const SITE_HEIGHT: &str = "Site Height";
    pub const AERIAL_HEIGHT: &str = "In-Use Ae Ht";
    pub const ERP_TOTAL: &str = "In-Use ERP Total";
    pub const EID: &str = "EID";
    pub const DATE: &str = "Date";
    pub const FREQ: &str = "Freq";
    /// Historical spelling found in older params extracts.
    pub const FREQ_ALIAS: &str = "Freq.";
    pub const BLOCK: &str = "Block";
    pub const SERV_LABEL1: &str = "Serv Label1";
    pub const SERV_LABEL2: &str = "Serv Label2";
    pub const SERV_LABEL3: &str = "Serv Label3";
    pub const SERV_LABEL4: &str = "Serv Label4";
    pub const SERV_LABEL10: &str = "Serv Label10";
    pub const AERIAL_HEIGHT_OUT: &str = "Aerial height(m)";
    pub const POWER_OUT: &str = "Power(kW)";

    pub const SERVICE_LABELS: [&str; 5] = [
        SERV_LABEL1,
        SERV_LABEL2,
        SERV_LABEL3,
        SERV_LABEL4,
        SERV_LABEL10,
    ];

    /// Columns read from the antenna extract.
    pub const ANTENNA: [&str; 6] = [ID, NGR, SITE, SITE_HEIGHT, AERIAL_HEIGHT, ERP_TOTAL];

    /// The client-facing flat column contract, in order.
    pub const OUTPUT: [&str; 17] = [
        ID,
        NGR,
        "C18A",
        "C18F",
        "C188",
        SITE,
        SITE_HEIGHT,
        AERIAL_HEIGHT_OUT,
        POWER_OUT,
        DATE,
        FREQ,
        BLOCK,
        SERV_LABEL1,
        SERV_LABEL2,
        SERV_LABEL3,
        SERV_LABEL4,
        SERV_LABEL10,
    ];
}

/// The five service-label fields of a params record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceLabels {
    #[serde(rename = "Serv Label1")]
    pub label1: Option<String>,
    #[serde(rename = "Serv Label2")]
    pub label2: Option<String>,
    #[serde(rename = "Serv Label3")]
    pub label3: Option<String>,
    #[serde(rename = "Serv Label4")]
    pub label4: Option<String>,
    #[serde(rename = "Serv Label10")]
    pub label10: Option<String>,
}

impl ServiceLabels {
    pub fn get(&self, column: &str) -> Option<&str> {
        match column {
            columns::SERV_LABEL1 => self.label1.as_deref(),
            columns::SERV_LABEL2 => self.label2.as_deref(),
            columns::SERV_LABEL3 => self.label3.as_deref(),
            columns::SERV_LABEL4 => self.label4.as_deref(),
            columns::SERV_LABEL10 => self.label10.as_deref(),
            _ => None,
        }
    }

    pub fn slot_mut(&mut self, column: &str) -> Option<&mut Option<String>> {
        match column {
            columns::SERV_LABEL1 => Some(&mut self.label1),
            columns::SERV_LABEL2 => Some(&mut self.label2),
            columns::SERV_LABEL3 => Some(&mut self.label3),
            columns::SERV_LABEL4 => Some(&mut self.label4),
            columns::SERV_LABEL10 => Some(&mut self.label10),
            _ => None,
        }
    }

    /// `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        columns::SERVICE_LABELS
            .into_iter()
            .map(move |c| (c, self.get(c)))
    }
}

/// A merged antenna/params row after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub id: String,
    pub ngr: Option<String>,
    pub site: Option<String>,
    pub site_height: i64,
    pub aerial_height: i64,
    pub power: f64,
    pub eid: Option<String>,
    pub date: Option<NaiveDate>,
    pub freq: Option<f64>,
    pub block: Option<String>,
    pub service_labels: ServiceLabels,
    /// Remaining params columns, normalised but otherwise untouched.
    pub extra: BTreeMap<String, Cell>,
}

impl CleanedRecord {
    /// Render records back to text form, the inverse of cleaning.
    pub fn to_table(records: &[CleanedRecord]) -> Table {
        let mut headers: Vec<String> = columns::ANTENNA.iter().map(|c| c.to_string()).collect();
        headers.extend(
            [columns::EID, columns::DATE, columns::FREQ, columns::BLOCK]
                .iter()
                .chain(columns::SERVICE_LABELS.iter())
                .map(|c| c.to_string()),
        );
        let extra_columns: Vec<String> = records
            .first()
            .map(|r| r.extra.keys().cloned().collect())
            .unwrap_or_default();
        headers.extend(extra_columns.iter().cloned());

        let mut table = Table::new(headers);
        for r in records {
            let mut row: Vec<Cell> = vec![
                Some(r.id.clone()),
                r.ngr.clone(),
                r.site.clone(),
                Some(r.site_height.to_string()),
                Some(r.aerial_height.to_string()),
                Some(format_number(r.power)),
                r.eid.clone(),
                r.date.map(|d| d.format("%d/%m/%Y").to_string()),
                r.freq.map(format_number),
                r.block.clone(),
            ];
            row.extend(r.service_labels.iter().map(|(_, v)| v.map(str::to_string)));
            row.extend(
                extra_columns
                    .iter()
                    .map(|c| r.extra.get(c).cloned().flatten()),
            );
            table.push_row(row);
        }
        table
    }
}

/// A cleaned record tagged with its multiplex membership.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplexRecord {
    pub record: CleanedRecord,
    pub flags: MultiplexFlags,
}

/// The client-facing record: persisted to the store and read back for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub id: String,
    pub ngr: Option<String>,
    pub flags: MultiplexFlags,
    pub site: Option<String>,
    pub site_height: i64,
    pub aerial_height: i64,
    pub power: f64,
    pub date: Option<NaiveDate>,
    pub freq: Option<f64>,
    pub block: Option<String>,
    pub service_labels: ServiceLabels,
}

impl OutputRecord {
    pub fn belongs_to(&self, multiplex: Multiplex) -> bool {
        self.flags.get(multiplex)
    }

    /// Text value of a flat output column, used by the categorical analyses.
    pub fn categorical_value(&self, column: &str) -> Option<String> {
        match column {
            columns::ID => Some(self.id.clone()),
            columns::NGR => self.ngr.clone(),
            columns::SITE => self.site.clone(),
            columns::SITE_HEIGHT => Some(self.site_height.to_string()),
            columns::AERIAL_HEIGHT_OUT => Some(self.aerial_height.to_string()),
            columns::POWER_OUT => Some(format_number(self.power)),
            columns::DATE => self.date.map(|d| d.to_string()),
            columns::FREQ => self.freq.map(format_number),
            columns::BLOCK => self.block.clone(),
            other => match Multiplex::from_eid(other) {
                Some(m) => Some(self.flags.get(m).to_string()),
                None => self.service_labels.get(other).map(str::to_string),
            },
        }
    }
}

/// Shortest text form of a number; integral values print without a fraction.
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}
