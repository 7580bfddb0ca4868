use std::collections::BTreeMap;

use crate::error::Error;
use crate::models::{AggregatedRow, DimensionScore, StandardizedRecord, DIMENSIONS};

/// IEEE half-to-even rounding at a fixed number of decimal places.
pub fn round_half_even(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rolls standardized submissions up into one row per (course title, lecturer
/// name). Per dimension: each record's items are averaged, then the
/// per-record means are averaged across the group and rounded to 2 decimals.
/// PTA items arrive on a 1-100 scale and are rescaled to 0-5 before rounding.
/// The evaluation score is the mean of the five rounded dimension scores.
///
/// Groups where a dimension has no numeric responses at all are reported as
/// data-quality failures instead of producing NaN rows; the remaining groups
/// still aggregate.
pub fn aggregate(records: &[StandardizedRecord]) -> (Vec<AggregatedRow>, Vec<Error>) {
    let mut groups: BTreeMap<(String, String), Vec<&StandardizedRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.course_title.clone(), record.lecturer_name.clone()))
            .or_default()
            .push(record);
    }

    let mut rows = Vec::with_capacity(groups.len());
    let mut failures = Vec::new();

    'groups: for ((course_title, lecturer_name), members) in groups {
        let mut dimensions = [DimensionScore {
            raw: 0.0,
            percent: 0.0,
        }; 5];

        for (slot, dimension) in dimensions.iter_mut().zip(DIMENSIONS.iter()) {
            let mut per_record = Vec::with_capacity(members.len());
            for member in &members {
                let values: Vec<f64> = member
                    .dimension_items(dimension)
                    .iter()
                    .flatten()
                    .copied()
                    .collect();
                if !values.is_empty() {
                    per_record.push(mean(&values));
                }
            }

            if per_record.is_empty() {
                failures.push(Error::DataQuality(format!(
                    "no numeric {} responses for course '{course_title}', lecturer '{lecturer_name}'",
                    dimension.key
                )));
                continue 'groups;
            }

            let mut raw = mean(&per_record);
            if dimension.hundred_scale {
                raw = raw / 100.0 * 5.0;
            }
            let raw = round_half_even(raw, 2);
            *slot = DimensionScore {
                raw,
                percent: round_half_even(raw / 5.0 * 100.0, 1),
            };
        }

        let combined = dimensions.iter().map(|score| score.raw).sum::<f64>() / 5.0;
        let evaluation = DimensionScore {
            raw: round_half_even(combined, 2),
            percent: round_half_even(combined / 5.0 * 100.0, 1),
        };

        let first = members[0];
        rows.push(AggregatedRow {
            course_title,
            lecturer_name,
            department: first.department.clone(),
            school: first.school.clone(),
            dimensions,
            evaluation,
            respondents: members.len(),
        });
    }

    (rows, failures)
}
