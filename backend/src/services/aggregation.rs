//! One-hot expansion of service labels and grouped counts per selection.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::error::{AggregationError, InputError};
use crate::models::{format_number, Multiplex, OutputRecord};
use crate::routes::grouped_counts::{
    ChartPanel, GroupedCount, GroupedCountsData, MultiPanelChart, PanelSeries, SiteCount,
};

/// Indicator columns named `<label column>_<value>`, one row per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHot {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<u8>>,
}

impl OneHot {
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = u8> + '_> {
        let i = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(move |row| row[i]))
    }
}

pub fn indicator_name(label_column: &str, value: &str) -> String {
    format!("{}_{}", label_column, value)
}

/// Records belonging to any of `multiplexes`.
pub fn select_records<'a>(
    records: &'a [OutputRecord],
    multiplexes: &[Multiplex],
) -> Result<Vec<&'a OutputRecord>, AggregationError> {
    if multiplexes.is_empty() {
        return Err(InputError::NoMultiplexSelected.into());
    }
    let selected: Vec<&OutputRecord> = records
        .iter()
        .filter(|r| multiplexes.iter().any(|m| r.belongs_to(*m)))
        .collect();
    if selected.is_empty() {
        return Err(AggregationError::EmptySelection);
    }
    debug!(
        "Selected {} of {} records for {:?}",
        selected.len(),
        records.len(),
        multiplexes
    );
    Ok(selected)
}

/// Expand the given service-label columns into 0/1 indicators. Absent labels
/// produce no indicator; values are ordered alphabetically within a column.
pub fn one_hot_encode(records: &[&OutputRecord], label_columns: &[&str]) -> OneHot {
    let mut columns: Vec<(String, String)> = Vec::new();
    for label in label_columns {
        let values: BTreeSet<&str> = records
            .iter()
            .filter_map(|r| r.service_labels.get(label))
            .collect();
        columns.extend(
            values
                .into_iter()
                .map(|v| (label.to_string(), v.to_string())),
        );
    }

    let rows = records
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|(label, value)| u8::from(r.service_labels.get(label) == Some(value.as_str())))
                .collect()
        })
        .collect();

    OneHot {
        columns: columns
            .iter()
            .map(|(label, value)| indicator_name(label, value))
            .collect(),
        rows,
    }
}

fn sum_rows<'a>(width: usize, rows: impl Iterator<Item = &'a Vec<u8>>) -> Vec<u64> {
    let mut totals = vec![0u64; width];
    for row in rows {
        for (total, v) in totals.iter_mut().zip(row) {
            *total += u64::from(*v);
        }
    }
    totals
}

fn labelled(columns: &[String], totals: Vec<u64>) -> Vec<(String, u64)> {
    columns.iter().cloned().zip(totals).collect()
}

/// Grouped sums of the one-hot label indicators by frequency and by multiplex,
/// plus distinct sites per multiplex.
pub fn grouped_counts(
    records: &[OutputRecord],
    multiplexes: &[Multiplex],
    label_columns: &[&str],
) -> Result<GroupedCountsData, AggregationError> {
    let selected = select_records(records, multiplexes)?;
    let encoded = one_hot_encode(&selected, label_columns);
    let width = encoded.columns.len();

    // Records without a frequency do not form a group.
    let mut freq_groups: BTreeMap<u64, (f64, Vec<usize>)> = BTreeMap::new();
    for (i, r) in selected.iter().enumerate() {
        if let Some(freq) = r.freq {
            freq_groups
                .entry(freq.to_bits())
                .or_insert_with(|| (freq, Vec::new()))
                .1
                .push(i);
        }
    }
    let mut freq_groups: Vec<(f64, Vec<usize>)> = freq_groups.into_values().collect();
    freq_groups.sort_by(|a, b| a.0.total_cmp(&b.0));

    let by_frequency: Vec<GroupedCount> = freq_groups
        .iter()
        .map(|(freq, members)| GroupedCount {
            group: format_number(*freq),
            counts: labelled(
                &encoded.columns,
                sum_rows(width, members.iter().map(|&i| &encoded.rows[i])),
            ),
        })
        .collect();

    let chosen: Vec<Multiplex> = Multiplex::ALL
        .into_iter()
        .filter(|m| multiplexes.contains(m))
        .collect();

    let by_multiplex: Vec<GroupedCount> = chosen
        .iter()
        .map(|m| GroupedCount {
            group: m.code().to_string(),
            counts: labelled(
                &encoded.columns,
                sum_rows(
                    width,
                    selected
                        .iter()
                        .zip(&encoded.rows)
                        .filter(|(r, _)| r.belongs_to(*m))
                        .map(|(_, row)| row),
                ),
            ),
        })
        .collect();

    let distinct_sites: Vec<SiteCount> = chosen
        .iter()
        .map(|m| SiteCount {
            multiplex: *m,
            distinct_sites: selected
                .iter()
                .filter(|r| r.belongs_to(*m))
                .filter_map(|r| r.site.as_deref())
                .collect::<BTreeSet<_>>()
                .len(),
        })
        .collect();

    let chart = build_chart(&encoded.columns, &by_frequency, &by_multiplex, &distinct_sites);

    Ok(GroupedCountsData {
        indicator_columns: encoded.columns,
        by_frequency,
        by_multiplex,
        distinct_sites,
        chart,
    })
}

const SITES_SERIES: &str = "Distinct sites";

fn build_chart(
    indicators: &[String],
    by_frequency: &[GroupedCount],
    by_multiplex: &[GroupedCount],
    sites: &[SiteCount],
) -> MultiPanelChart {
    let panel = |title: &str, groups: &[GroupedCount]| ChartPanel {
        title: title.to_string(),
        categories: groups.iter().map(|g| g.group.clone()).collect(),
        series: indicators
            .iter()
            .enumerate()
            .map(|(i, name)| PanelSeries {
                name: name.clone(),
                values: groups.iter().map(|g| g.counts[i].1 as f64).collect(),
            })
            .collect(),
    };

    let sites_panel = ChartPanel {
        title: "Sites by multiplex".to_string(),
        categories: sites.iter().map(|s| s.multiplex.code().to_string()).collect(),
        series: vec![PanelSeries {
            name: SITES_SERIES.to_string(),
            values: sites.iter().map(|s| s.distinct_sites as f64).collect(),
        }],
    };

    let mut legend = indicators.to_vec();
    legend.push(SITES_SERIES.to_string());

    MultiPanelChart {
        panels: vec![
            panel("Services by frequency", by_frequency),
            panel("Services by multiplex", by_multiplex),
            sites_panel,
        ],
        legend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{columns, MultiplexFlags, ServiceLabels};

    fn record(id: &str, eid: &str, site: &str, freq: Option<f64>, label1: &str, label2: Option<&str>) -> OutputRecord {
        OutputRecord {
            id: id.into(),
            ngr: None,
            flags: MultiplexFlags::from_eid(Some(eid)),
            site: Some(site.into()),
            site_height: 100,
            aerial_height: 20,
            power: 1.0,
            date: None,
            freq,
            block: None,
            service_labels: ServiceLabels {
                label1: Some(label1.into()),
                label2: label2.map(Into::into),
                ..Default::default()
            },
        }
    }

    fn sample() -> Vec<OutputRecord> {
        vec![
            record("1", "C18A", "A", Some(225.648), "BBC", Some("HEART")),
            record("2", "C18A", "B", Some(225.648), "BBC", None),
            record("3", "C188", "A", Some(222.064), "LBC", None),
            record("4", "C18F", "C", None, "BBC", None),
        ]
    }

    #[test]
    fn test_one_hot_names_and_values() {
        let records = sample();
        let refs: Vec<&OutputRecord> = records.iter().collect();
        let encoded = one_hot_encode(&refs, &[columns::SERV_LABEL1, columns::SERV_LABEL2]);
        assert_eq!(
            encoded.columns,
            vec!["Serv Label1_BBC", "Serv Label1_LBC", "Serv Label2_HEART"]
        );
        assert_eq!(encoded.rows[0], vec![1, 0, 1]);
        assert_eq!(encoded.rows[2], vec![0, 1, 0]);
        let heart: Vec<u8> = encoded.column("Serv Label2_HEART").unwrap().collect();
        assert_eq!(heart, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_grouped_counts_respect_selection() {
        let records = sample();
        let data = grouped_counts(
            &records,
            &[Multiplex::C18A, Multiplex::C188],
            &[columns::SERV_LABEL1],
        )
        .unwrap();

        assert_eq!(data.indicator_columns, vec!["Serv Label1_BBC", "Serv Label1_LBC"]);

        let groups: Vec<&str> = data.by_frequency.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(groups, vec!["222.064", "225.648"]);
        assert_eq!(data.by_frequency[1].counts[0], ("Serv Label1_BBC".to_string(), 2));

        assert_eq!(data.by_multiplex.len(), 2);
        assert_eq!(data.by_multiplex[0].group, "C18A");
        assert_eq!(data.by_multiplex[1].counts[1].1, 1);

        assert_eq!(data.distinct_sites[0].distinct_sites, 2);
        assert_eq!(data.distinct_sites[1].distinct_sites, 1);

        assert_eq!(data.chart.panels.len(), 3);
        assert_eq!(data.chart.legend.last().map(String::as_str), Some("Distinct sites"));
    }

    #[test]
    fn test_empty_selection() {
        let records = vec![record("1", "C18F", "A", None, "BBC", None)];
        assert_eq!(
            grouped_counts(&records, &[Multiplex::C188], &[columns::SERV_LABEL1]).unwrap_err(),
            AggregationError::EmptySelection
        );
        assert_eq!(
            select_records(&records, &[]).unwrap_err(),
            AggregationError::Input(InputError::NoMultiplexSelected)
        );
    }
}
