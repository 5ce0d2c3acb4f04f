//! Pure aggregation over submission entries: categorical distributions, the
//! statistics summary and the tabular exports consumed by the spreadsheet
//! writer.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::models::domain::{
    submission::format_number, ActiveQuestion, AnswerValue, Category, SubmissionEntry,
};

/// Fields tallied by [`compute_distributions`]. `hours` and `bedtime` belong to
/// the first version of the questionnaire and still appear in older entries.
pub const DISTRIBUTION_FIELDS: [&str; 11] = [
    "hours",
    "bedtime",
    "bed_entry_time",
    "eye_close_decision",
    "pre_sleep_activity",
    "time_to_fall_asleep",
    "wakeups_count",
    "awake_duration_total",
    "wake_up_time",
    "wake_up_method",
    "total_sleep_estimate",
];

const QUALITY_FIELD: &str = "quality";

pub type Distribution = BTreeMap<String, u64>;

fn bucket_keys(value: &AnswerValue) -> Vec<String> {
    match value {
        AnswerValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                vec![]
            } else {
                vec![text.to_string()]
            }
        }
        AnswerValue::Number(n) => vec![format_number(*n)],
        AnswerValue::Choices(choices) => choices
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Tallies every distribution field. Each element of a multi-select answer
/// counts once in its own bucket; blank or absent answers count nowhere.
pub fn compute_distributions(entries: &[SubmissionEntry]) -> BTreeMap<String, Distribution> {
    let mut distributions: BTreeMap<String, Distribution> = DISTRIBUTION_FIELDS
        .iter()
        .map(|f| (f.to_string(), Distribution::new()))
        .collect();

    for entry in entries {
        for field in DISTRIBUTION_FIELDS {
            let Some(value) = entry.answer(field) else {
                continue;
            };
            let buckets = distributions.entry(field.to_string()).or_default();
            for key in bucket_keys(value) {
                *buckets.entry(key).or_insert(0) += 1;
            }
        }
    }

    distributions
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct NumericAccumulator {
    sum: f64,
    count: u64,
}

impl NumericAccumulator {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepStats {
    pub total_entries: usize,
    /// Mean numeric `quality`, two decimals.
    pub avg_quality: Option<String>,
    pub distributions: BTreeMap<String, Distribution>,
}

pub fn compute_stats(entries: &[SubmissionEntry]) -> SleepStats {
    let mut quality = NumericAccumulator::default();
    for value in entries.iter().filter_map(|e| e.answer(QUALITY_FIELD)) {
        if let Some(n) = value.as_number() {
            quality.add(n);
        }
    }

    SleepStats {
        total_entries: entries.len(),
        avg_quality: quality.mean().map(|m| format!("{:.2}", m)),
        distributions: compute_distributions(entries),
    }
}

/// Header plus rows, ready for a spreadsheet writer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Report {
    /// No matching questions, nothing to export.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }
}

pub const IDENTITY_COLUMNS: [&str; 4] = ["User ID", "Date", "Class ID", "Experiment ID"];

fn cell(entry: &SubmissionEntry, key: &str) -> String {
    entry.answer(key).map(AnswerValue::to_cell).unwrap_or_default()
}

fn in_creation_order<'a>(questions: impl Iterator<Item = &'a ActiveQuestion>) -> Vec<&'a ActiveQuestion> {
    let mut questions: Vec<_> = questions.collect();
    questions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    questions
}

/// One column per active question of `category`, one row per entry. Empty when
/// no active question carries the category.
pub fn build_category_report(
    category: Category,
    entries: &[SubmissionEntry],
    active_global: &[ActiveQuestion],
) -> Report {
    let questions = in_creation_order(active_global.iter().filter(|q| q.category == category));
    if questions.is_empty() {
        return Report::default();
    }

    let header = IDENTITY_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(questions.iter().map(|q| q.text.clone()))
        .collect();

    let rows = entries
        .iter()
        .map(|entry| {
            [
                entry.student_id.clone(),
                entry.date.clone(),
                entry.class_id.clone(),
                entry.experiment_id.clone(),
            ]
            .into_iter()
            .chain(questions.iter().map(|q| cell(entry, &q.answer_key())))
            .collect()
        })
        .collect();

    Report { header, rows }
}

const CLASS_BASELINE_COLUMNS: [(&str, &str); 12] = [
    ("grade", "שכבה"),
    ("gender", "מגדר"),
    ("bed_entry_time", "זמן כניסה למיטה"),
    ("eye_close_decision", "זמן החלטה לעצום עיניים"),
    ("pre_sleep_activity", "פעילות לפני שינה"),
    ("time_to_fall_asleep", "זמן עד הירדמות"),
    ("wakeups_count", "מספר יקיצות"),
    ("awake_duration_total", "משך ערות בלילה"),
    ("wake_up_time", "זמן יקיצה"),
    ("wake_up_method", "אופן יקיצה"),
    ("total_sleep_estimate", "שעות שינה מוערכות"),
    ("notes", "הערות"),
];

fn gender_label(raw: String) -> String {
    match raw.as_str() {
        "male" => "בן".to_string(),
        "female" => "בת".to_string(),
        _ => raw,
    }
}

/// Class export: students replaced by 1-based codes in student id order,
/// baseline columns, then one `[category] text` column per class question.
pub fn build_class_report(entries: &[SubmissionEntry], class_active: &[ActiveQuestion]) -> Report {
    let codes: BTreeMap<&str, usize> = entries
        .iter()
        .map(|e| e.student_id.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(i, id)| (id, i + 1))
        .collect();
    let questions = in_creation_order(class_active.iter());

    let header = ["User Code", "תאריך"]
        .into_iter()
        .map(str::to_string)
        .chain(CLASS_BASELINE_COLUMNS.iter().map(|(_, label)| label.to_string()))
        .chain(
            questions
                .iter()
                .map(|q| format!("[{}] {}", q.category, q.text)),
        )
        .collect();

    let mut sorted: Vec<&SubmissionEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        a.student_id
            .cmp(&b.student_id)
            .then_with(|| a.date.cmp(&b.date))
    });

    let rows = sorted
        .into_iter()
        .map(|entry| {
            let code = codes
                .get(entry.student_id.as_str())
                .map(|c| c.to_string())
                .unwrap_or_default();
            let mut row = vec![code, entry.date.clone()];
            for (key, _) in CLASS_BASELINE_COLUMNS {
                let value = cell(entry, key);
                row.push(if key == "gender" { gender_label(value) } else { value });
            }
            row.extend(questions.iter().map(|q| cell(entry, &q.answer_key())));
            row
        })
        .collect();

    Report { header, rows }
}
