//! Descriptive aggregations over the accident records.
//!
//! Pure group-by style computations feeding the bar and stacked-bar charts:
//! counts against temporal and categorical attributes, average daily
//! accidents per weather condition, and injury totals per crash type.
//! Records missing the attribute under aggregation are skipped by that
//! aggregation only.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{NaiveDate, Timelike};

use crate::core::loaders::AccidentRecord;

/// Accident counts by hour of day, indexed 0-23.
///
/// Records without a parseable `crash_date` are ignored.
pub fn hourly_counts(records: &[AccidentRecord]) -> [u64; 24] {
    let mut counts = [0u64; 24];
    for record in records {
        if let Some(date) = record.crash_date {
            counts[date.hour() as usize] += 1;
        }
    }
    counts
}

/// Accident counts per category value, sorted by count descending.
///
/// The accessor selects the categorical attribute; `top` caps the number of
/// returned categories (`None` keeps all). Equal counts sort by category
/// name so output order is stable.
pub fn counts_by_category<F>(
    records: &[AccidentRecord],
    accessor: F,
    top: Option<usize>,
) -> Vec<(String, u64)>
where
    F: Fn(&AccidentRecord) -> Option<&str>,
{
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for record in records {
        if let Some(value) = accessor(record) {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let mut sorted: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    if let Some(limit) = top {
        sorted.truncate(limit);
    }
    sorted
}

/// Average number of accidents per calendar day for each weather condition,
/// sorted descending.
///
/// Per condition: total accident count divided by the number of distinct
/// dates on which that condition appears. Records lacking either the date
/// or the weather condition are skipped.
pub fn average_daily_by_weather(records: &[AccidentRecord]) -> Vec<(String, f64)> {
    let mut totals: HashMap<&str, u64> = HashMap::new();
    let mut days: HashMap<&str, HashSet<NaiveDate>> = HashMap::new();

    for record in records {
        let (Some(date), Some(weather)) = (record.crash_date, record.weather_condition.as_deref())
        else {
            continue;
        };
        *totals.entry(weather).or_insert(0) += 1;
        days.entry(weather).or_default().insert(date.date());
    }

    let mut averages: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(weather, total)| {
            let day_count = days.get(weather).map_or(1, HashSet::len);
            (weather.to_string(), total as f64 / day_count as f64)
        })
        .collect();
    averages.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    averages
}

/// Stacked-bar input: per trafficway type, accident counts per first crash
/// type. Outer and inner entries are sorted by name for stable output.
pub fn crash_type_by_trafficway(records: &[AccidentRecord]) -> Vec<(String, Vec<(String, u64)>)> {
    let mut groups: BTreeMap<&str, BTreeMap<&str, u64>> = BTreeMap::new();

    for record in records {
        let (Some(trafficway), Some(crash_type)) = (
            record.trafficway_type.as_deref(),
            record.first_crash_type.as_deref(),
        ) else {
            continue;
        };
        *groups
            .entry(trafficway)
            .or_default()
            .entry(crash_type)
            .or_insert(0) += 1;
    }

    groups
        .into_iter()
        .map(|(trafficway, inner)| {
            let segments = inner
                .into_iter()
                .map(|(crash_type, count)| (crash_type.to_string(), count))
                .collect();
            (trafficway.to_string(), segments)
        })
        .collect()
}

/// Summed `injuries_total` per first crash type, sorted descending.
pub fn injuries_by_crash_type(records: &[AccidentRecord]) -> Vec<(String, f64)> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    for record in records {
        let (Some(crash_type), Some(injuries)) =
            (record.first_crash_type.as_deref(), record.injuries_total)
        else {
            continue;
        };
        *sums.entry(crash_type).or_insert(0.0) += injuries;
    }

    let mut sorted: Vec<(String, f64)> = sums
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Accident counts per posted speed limit, sorted by speed limit ascending.
pub fn counts_by_speed_limit(records: &[AccidentRecord]) -> Vec<(i32, u64)> {
    let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
    for record in records {
        if let Some(speed) = record.speed_limit {
            *counts.entry(speed).or_insert(0) += 1;
        }
    }
    counts.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(date: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S").ok()
    }

    fn record() -> AccidentRecord {
        AccidentRecord::default()
    }

    #[test]
    fn test_hourly_counts() {
        let records = vec![
            AccidentRecord {
                crash_date: at("2023-04-01 17:30:00"),
                ..record()
            },
            AccidentRecord {
                crash_date: at("2023-04-02 17:05:00"),
                ..record()
            },
            AccidentRecord {
                crash_date: at("2023-04-02 08:00:00"),
                ..record()
            },
            AccidentRecord {
                crash_date: None,
                ..record()
            },
        ];

        let counts = hourly_counts(&records);
        assert_eq!(counts[17], 2);
        assert_eq!(counts[8], 1);
        assert_eq!(counts.iter().sum::<u64>(), 3);
    }

    #[test]
    fn test_counts_by_category_sorted_desc() {
        let records = vec![
            AccidentRecord {
                lighting_condition: Some("DARKNESS".into()),
                ..record()
            },
            AccidentRecord {
                lighting_condition: Some("DAYLIGHT".into()),
                ..record()
            },
            AccidentRecord {
                lighting_condition: Some("DARKNESS".into()),
                ..record()
            },
            AccidentRecord {
                lighting_condition: None,
                ..record()
            },
        ];

        let counts = counts_by_category(&records, |r| r.lighting_condition.as_deref(), None);
        assert_eq!(counts[0], ("DARKNESS".to_string(), 2));
        assert_eq!(counts[1], ("DAYLIGHT".to_string(), 1));
    }

    #[test]
    fn test_counts_by_category_top_cap() {
        let records: Vec<AccidentRecord> = (0..5)
            .map(|i| AccidentRecord {
                prim_contributory_cause: Some(format!("CAUSE_{}", i)),
                ..record()
            })
            .collect();

        let counts = counts_by_category(&records, |r| r.prim_contributory_cause.as_deref(), Some(3));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_average_daily_by_weather() {
        // CLEAR: 3 accidents over 2 distinct days -> 1.5/day
        // RAIN: 1 accident over 1 day -> 1.0/day
        let mk = |date: &str, weather: &str| AccidentRecord {
            crash_date: at(date),
            weather_condition: Some(weather.into()),
            ..record()
        };
        let records = vec![
            mk("2023-04-01 10:00:00", "CLEAR"),
            mk("2023-04-01 12:00:00", "CLEAR"),
            mk("2023-04-02 09:00:00", "CLEAR"),
            mk("2023-04-02 09:30:00", "RAIN"),
        ];

        let averages = average_daily_by_weather(&records);
        assert_eq!(averages[0].0, "CLEAR");
        assert!((averages[0].1 - 1.5).abs() < 1e-12);
        assert_eq!(averages[1].0, "RAIN");
        assert!((averages[1].1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_crash_type_by_trafficway() {
        let mk = |trafficway: &str, crash_type: &str| AccidentRecord {
            trafficway_type: Some(trafficway.into()),
            first_crash_type: Some(crash_type.into()),
            ..record()
        };
        let records = vec![
            mk("DIVIDED", "REAR END"),
            mk("DIVIDED", "REAR END"),
            mk("DIVIDED", "TURNING"),
            mk("ONE-WAY", "ANGLE"),
        ];

        let groups = crash_type_by_trafficway(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "DIVIDED");
        assert_eq!(
            groups[0].1,
            vec![("REAR END".to_string(), 2), ("TURNING".to_string(), 1)]
        );
        assert_eq!(groups[1].0, "ONE-WAY");
    }

    #[test]
    fn test_injuries_by_crash_type() {
        let mk = |crash_type: &str, injuries: f64| AccidentRecord {
            first_crash_type: Some(crash_type.into()),
            injuries_total: Some(injuries),
            ..record()
        };
        let records = vec![
            mk("REAR END", 2.0),
            mk("REAR END", 1.0),
            mk("ANGLE", 1.0),
        ];

        let sums = injuries_by_crash_type(&records);
        assert_eq!(sums[0], ("REAR END".to_string(), 3.0));
        assert_eq!(sums[1], ("ANGLE".to_string(), 1.0));
    }

    #[test]
    fn test_counts_by_speed_limit_ascending() {
        let mk = |speed: i32| AccidentRecord {
            speed_limit: Some(speed),
            ..record()
        };
        let records = vec![mk(30), mk(25), mk(30), mk(45)];

        let counts = counts_by_speed_limit(&records);
        assert_eq!(counts, vec![(25, 1), (30, 2), (45, 1)]);
    }
}
