use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StepOption {
    pub value: String,
    pub label: String,
}

impl StepOption {
    pub fn new(value: &str, label: &str) -> Self {
        StepOption {
            value: value.to_string(),
            label: label.to_string(),
        }
    }

    /// Option whose stored value is the label itself.
    pub fn same(raw: &str) -> Self {
        StepOption::new(raw, raw)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepInput {
    Text,
    Select { options: Vec<StepOption> },
    Multi { options: Vec<StepOption> },
}

/// One screen of the student questionnaire wizard.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Step {
    pub key: String,
    pub title: String,
    #[serde(flatten)]
    pub input: StepInput,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl Step {
    pub fn text(key: &str, title: &str) -> Self {
        Step {
            key: key.to_string(),
            title: title.to_string(),
            input: StepInput::Text,
            optional: false,
            placeholder: None,
        }
    }

    pub fn select(key: &str, title: &str, options: Vec<StepOption>) -> Self {
        Step {
            input: StepInput::Select { options },
            ..Step::text(key, title)
        }
    }

    pub fn multi(key: &str, title: &str, options: Vec<StepOption>) -> Self {
        Step {
            input: StepInput::Multi { options },
            ..Step::text(key, title)
        }
    }
}

pub const NOTES_KEY: &str = "notes";

fn opts(pairs: &[(&str, &str)]) -> Vec<StepOption> {
    pairs.iter().map(|(v, l)| StepOption::new(v, l)).collect()
}

/// Baseline questionnaire shared by every class. The notes step is last and
/// the only optional one.
pub fn static_steps() -> Vec<Step> {
    let wakeups = ["0", "1", "2", "3", "4", "5", "6", "7", "8 ויותר"]
        .iter()
        .map(|v| StepOption::same(v))
        .collect();

    vec![
        Step::select(
            "grade",
            "אני בכיתה",
            opts(&[
                ("z", "ז"),
                ("h", "ח"),
                ("t", "ט"),
                ("y", "י"),
                ("ya", "י\"א"),
                ("yb", "י\"ב"),
            ]),
        ),
        Step::select(
            "gender",
            "מגדר",
            opts(&[("male", "בן"), ("female", "בת")]),
        ),
        Step::select(
            "bed_entry_time",
            "נכנסתי למיטה בין השעות",
            opts(&[
                ("before_21", "לפני השעה 21:00"),
                ("21_24", "בין 21:00- לחצות"),
                ("after_24", "אחרי חצות"),
            ]),
        ),
        Step::select(
            "eye_close_decision",
            "הזמן בערך בו החלטתי לעצום עיניים אחרי שנכנסתי למיטה",
            opts(&[
                ("immediate", "מיד כשנכנסתי למיטה לישון"),
                ("up_to_1h", "עד שעה אחת אחרי שנכנסתי"),
                ("2h", "שעתיים אחרי שנכנסתי"),
                ("3h_plus", "כ-3 שעות או יותר"),
            ]),
        ),
        Step::multi(
            "pre_sleep_activity",
            "במה הייתי עסוק/ה לפני שנרדמתי",
            opts(&[
                ("phone", "טלפון"),
                ("computer", "מחשב"),
                ("tablet", "טאבלט"),
                ("book", "ספר"),
                ("music", "מוזיקה"),
                ("other", "אחר"),
            ]),
        ),
        Step::select(
            "time_to_fall_asleep",
            "הזמן (בדקות) שלקח לי להירדם מהרגע שהחלטתי לעצום עיניים",
            opts(&[
                ("under_5", "פחות מ-5 דקות"),
                ("15_or_less", "רבע שעה או פחות"),
                ("15_30", "בין רבע שעה לחצי שעה"),
                ("30_60", "בין חצי שעה לשעה"),
                ("over_60", "מעל שעה"),
            ]),
        ),
        Step::select("wakeups_count", "מספר היקיצות שלך בלילה", wakeups),
        Step::select(
            "awake_duration_total",
            "סך כל הדקות שבהן היית ער/ה מהיקיצות בלילה",
            opts(&[
                ("under_5", "פחות מ-5 דקות"),
                ("5_15", "5 עד 15 דקות"),
                ("15_30", "15 עד 30 דקות"),
                ("30_60", "חצי שעה עד שעה"),
                ("over_60", "מעל שעה"),
            ]),
        ),
        Step::select(
            "wake_up_time",
            "בבוקר התעוררתי בין השעות",
            opts(&[
                ("5_6", "5-6"),
                ("6_7", "6-7"),
                ("7_8", "7-8"),
                ("8_9", "8-9"),
                ("after_9", "אחרי 9 בבוקר"),
            ]),
        ),
        Step::select(
            "wake_up_method",
            "כיצד התעוררת?",
            opts(&[
                ("alarm", "שעון מעורר"),
                ("others", "העירו אותי"),
                ("natural", "לבד"),
                ("noise_light", "רעש/אור"),
            ]),
        ),
        Step::select(
            "total_sleep_estimate",
            "כמה שעות להערתך ישנת אתמול בלילה",
            opts(&[
                ("under_5", "פחות מ-5"),
                ("5_6", "5-6"),
                ("6_7", "6-7"),
                ("7_8", "7-8"),
                ("8_9", "8-9"),
                ("over_9", "מעל 9"),
            ]),
        ),
        Step {
            optional: true,
            placeholder: Some("זו שאלת בחירה...".to_string()),
            ..Step::text(NOTES_KEY, "יש לך הערה שחשוב שנדע?")
        },
    ]
}
