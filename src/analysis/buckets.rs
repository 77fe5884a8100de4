use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::analysis::aggregate;
use crate::models::record::TimesheetRecord;
use crate::models::registry::{MappingRegistry, ServisMapping};
use crate::models::report::{Granularity, PeriodBucket, ReportType};

/// Bucket key for a date at the given granularity. Keys are zero-padded so
/// lexicographic order equals chronological order.
pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => date.format("%Y-%m-%d").to_string(),
        Granularity::Weekly => {
            let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
            monday.format("%Y-%m-%d").to_string()
        }
        Granularity::Monthly => date.format("%Y-%m").to_string(),
        Granularity::Quarterly => {
            let quarter = (date.month0() / 3) + 1;
            format!("{}-Q{quarter}", date.year())
        }
    }
}

/// Display label for a period key. Weekly keys (the Monday date) are shown
/// as ISO week numbers; monthly keys as `Mon YYYY`.
pub fn period_label(key: &str, granularity: Granularity) -> String {
    match granularity {
        Granularity::Weekly => match NaiveDate::parse_from_str(key, "%Y-%m-%d") {
            Ok(date) => {
                let iso = date.iso_week();
                format!("Week {}, {}", iso.week(), iso.year())
            }
            Err(_) => key.to_string(),
        },
        Granularity::Monthly => match NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d") {
            Ok(date) => date.format("%b %Y").to_string(),
            Err(_) => key.to_string(),
        },
        _ => key.to_string(),
    }
}

/// Split the filtered records into calendar buckets and break each bucket
/// down by the same classification rule the ranked report uses. Records
/// without a parseable work date are skipped. Periods come back sorted
/// ascending by key.
pub fn bucket(
    records: &[&TimesheetRecord],
    granularity: Granularity,
    report_type: ReportType,
    registry: &MappingRegistry,
    servis: &ServisMapping,
) -> Vec<PeriodBucket> {
    let mut periods: BTreeMap<String, PeriodBucket> = BTreeMap::new();

    for record in records {
        let day = record.work_date_day();
        let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") else {
            continue;
        };

        let key = bucket_key(date, granularity);
        let category = aggregate::classify(record, report_type, registry, servis);
        let hours = record.parsed_hours();

        let entry = periods.entry(key.clone()).or_insert_with(|| PeriodBucket {
            key,
            total: 0.0,
            breakdown: BTreeMap::new(),
        });
        entry.total += hours;
        *entry.breakdown.entry(category).or_insert(0.0) += hours;
    }

    periods.into_values().collect()
}
