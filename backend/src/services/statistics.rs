//! Conditional central-tendency measures of power per multiplex.

use chrono::Datelike;
use log::debug;

use crate::error::StatisticsError;
use crate::models::{Multiplex, OutputRecord};
use crate::routes::summary::{
    BarSeries, GroupedBarChart, StatisticsFilter, SummaryStatistic, SummaryStatisticsData,
};

impl StatisticsFilter {
    /// Records with no date never pass the year filter.
    pub fn matches(&self, record: &OutputRecord) -> bool {
        match self {
            StatisticsFilter::SiteHeightAbove75 => record.site_height > 75,
            StatisticsFilter::YearFrom2001 => record.date.is_some_and(|d| d.year() >= 2001),
        }
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle value; the mean of the two middle values for an even count.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 0 {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    } else {
        Some(sorted[n / 2])
    }
}

/// Most frequent value. Ties go to the smallest value.
pub fn first_mode(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let run = sorted[i..].iter().take_while(|v| **v == value).count();
        if best.map_or(true, |(_, count)| run > count) {
            best = Some((value, run));
        }
        i += run;
    }
    best.map(|(value, _)| value)
}

/// Statistics for one multiplex under one filter.
pub fn summarize(
    records: &[OutputRecord],
    multiplex: Multiplex,
    filter: StatisticsFilter,
) -> Result<SummaryStatistic, StatisticsError> {
    let power: Vec<f64> = records
        .iter()
        .filter(|r| r.belongs_to(multiplex) && filter.matches(r))
        .map(|r| r.power)
        .collect();

    let insufficient = || StatisticsError::InsufficientData {
        multiplex,
        filter: filter.label().to_string(),
    };
    Ok(SummaryStatistic {
        multiplex,
        filter,
        count: power.len(),
        mean: mean(&power).ok_or_else(insufficient)?,
        median: median(&power).ok_or_else(insufficient)?,
        mode: first_mode(&power).ok_or_else(insufficient)?,
    })
}

/// Statistics for every selected multiplex under both filters, with one grouped
/// bar chart per filter. Any empty multiplex/filter combination fails the whole
/// request.
pub fn summary_statistics(
    records: &[OutputRecord],
    multiplexes: &[Multiplex],
) -> Result<SummaryStatisticsData, StatisticsError> {
    let mut statistics = Vec::with_capacity(multiplexes.len() * StatisticsFilter::ALL.len());
    let mut charts = Vec::with_capacity(StatisticsFilter::ALL.len());

    for filter in StatisticsFilter::ALL {
        let group = multiplexes
            .iter()
            .map(|m| summarize(records, *m, filter))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Computed {} summaries under '{}'", group.len(), filter);

        charts.push(chart_for(filter, &group));
        statistics.extend(group);
    }

    Ok(SummaryStatisticsData { statistics, charts })
}

fn chart_for(filter: StatisticsFilter, group: &[SummaryStatistic]) -> GroupedBarChart {
    let series = |name: &str, pick: fn(&SummaryStatistic) -> f64| BarSeries {
        name: name.to_string(),
        values: group.iter().map(pick).collect(),
    };
    GroupedBarChart {
        title: format!("Power(kW) where {}", filter),
        categories: group.iter().map(|s| s.multiplex.code().to_string()).collect(),
        series: vec![
            series("Mean", |s| s.mean),
            series("Median", |s| s.median),
            series("Mode", |s| s.mode),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MultiplexFlags, ServiceLabels};
    use chrono::NaiveDate;

    fn record(eid: &str, power: f64, site_height: i64, year: Option<i32>) -> OutputRecord {
        OutputRecord {
            id: format!("{eid}-{power}-{site_height}"),
            ngr: None,
            flags: MultiplexFlags::from_eid(Some(eid)),
            site: None,
            site_height,
            aerial_height: 0,
            power,
            date: year.and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)),
            freq: None,
            block: None,
            service_labels: ServiceLabels::default(),
        }
    }

    #[test]
    fn test_site_height_scenario() {
        let records = vec![
            record("C18A", 10.0, 80, None),
            record("C18A", 20.0, 80, None),
            record("C18A", 30.0, 10, None),
        ];
        let stat = summarize(&records, Multiplex::C18A, StatisticsFilter::SiteHeightAbove75).unwrap();
        assert_eq!(stat.count, 2);
        assert_eq!(stat.mean, 15.0);
        assert_eq!(stat.median, 15.0);
        assert_eq!(stat.mode, 10.0);
    }

    #[test]
    fn test_mode_prefers_highest_count_then_smallest() {
        assert_eq!(first_mode(&[5.0, 3.0, 5.0, 3.0, 9.0]), Some(3.0));
        assert_eq!(first_mode(&[7.0, 2.0, 7.0]), Some(7.0));
        assert_eq!(first_mode(&[]), None);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_year_filter_skips_undated_records() {
        let records = vec![
            record("C18F", 1.0, 10, Some(2000)),
            record("C18F", 2.0, 10, Some(2001)),
            record("C18F", 4.0, 10, None),
        ];
        let stat = summarize(&records, Multiplex::C18F, StatisticsFilter::YearFrom2001).unwrap();
        assert_eq!(stat.count, 1);
        assert_eq!(stat.mean, 2.0);
    }

    #[test]
    fn test_empty_combination_is_insufficient_data() {
        let records = vec![record("C18A", 10.0, 10, Some(2010))];
        let err = summarize(&records, Multiplex::C18A, StatisticsFilter::SiteHeightAbove75).unwrap_err();
        assert_eq!(
            err,
            StatisticsError::InsufficientData {
                multiplex: Multiplex::C18A,
                filter: "Site Height > 75".into()
            }
        );
        assert!(summary_statistics(&records, &[Multiplex::C18A]).is_err());
    }

    #[test]
    fn test_summary_statistics_builds_one_chart_per_filter() {
        let records = vec![
            record("C18A", 10.0, 80, Some(2005)),
            record("C188", 4.0, 90, Some(2012)),
            record("C188", 6.0, 90, Some(2012)),
        ];
        let data = summary_statistics(&records, &[Multiplex::C18A, Multiplex::C188]).unwrap();
        assert_eq!(data.statistics.len(), 4);
        assert_eq!(data.charts.len(), 2);

        let chart = &data.charts[0];
        assert_eq!(chart.categories, vec!["C18A", "C188"]);
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Mean", "Median", "Mode"]);
        assert_eq!(chart.series[0].values, vec![10.0, 5.0]);
        assert_eq!(chart.series[2].values, vec![10.0, 4.0]);
    }
}
