use serde::Serialize;

use crate::models::{Gender, PersonRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: &'static str,
    pub value: usize,
    pub percentage: f64,
    pub color: &'static str,
}

/// Gender, age and gender-by-age breakdowns of the full person list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    pub total: usize,
    pub gender: [ChartBar; 2],
    pub age: [ChartBar; 2],
    pub combined: [ChartBar; 4],
}

#[derive(Debug, Default)]
struct Counts {
    male: usize,
    female: usize,
    minors: usize,
    adults: usize,
    male_minors: usize,
    male_adults: usize,
    female_minors: usize,
    female_adults: usize,
}

impl ChartSummary {
    pub fn from_records(records: &[PersonRecord]) -> Self {
        let mut counts = Counts::default();

        for record in records {
            let minor = record.is_minor();
            match (record.gender, minor) {
                (Gender::Male, true) => counts.male_minors += 1,
                (Gender::Male, false) => counts.male_adults += 1,
                (Gender::Female, true) => counts.female_minors += 1,
                (Gender::Female, false) => counts.female_adults += 1,
            }
            match record.gender {
                Gender::Male => counts.male += 1,
                Gender::Female => counts.female += 1,
            }
            if minor {
                counts.minors += 1;
            } else {
                counts.adults += 1;
            }
        }

        let total = records.len();
        let bar = |label, value, color| ChartBar {
            label,
            value,
            percentage: percentage(value, total),
            color,
        };

        Self {
            total,
            gender: [
                bar("Men", counts.male, "#3498db"),
                bar("Women", counts.female, "#e74c3c"),
            ],
            age: [
                bar("Under 18", counts.minors, "#f39c12"),
                bar("18 and over", counts.adults, "#27ae60"),
            ],
            combined: [
                bar("Male minors", counts.male_minors, "#3498db"),
                bar("Male adults", counts.male_adults, "#2980b9"),
                bar("Female minors", counts.female_minors, "#e74c3c"),
                bar("Female adults", counts.female_adults, "#c0392b"),
            ],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Share of `total` in percent; 0 when there is nothing to divide by.
pub fn percentage(value: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        value as f64 / total as f64 * 100.0
    }
}
