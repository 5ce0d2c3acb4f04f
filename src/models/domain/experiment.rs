use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level research cohort. Created implicitly the first time a class is
/// provisioned under it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Experiment {
    pub id: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Class {
    /// Derived from `(school_name, grade, class_num)`, see `services::identity`.
    pub id: String,
    pub experiment_id: String,
    pub school_name: String,
    pub grade: String,
    pub class_num: String,
    pub created_at: DateTime<Utc>,
}

impl Class {
    pub fn new(
        id: &str,
        experiment_id: &str,
        school_name: &str,
        grade: &str,
        class_num: &str,
    ) -> Self {
        Class {
            id: id.to_string(),
            experiment_id: experiment_id.to_string(),
            school_name: school_name.to_string(),
            grade: grade.to_string(),
            class_num: class_num.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Short display name, e.g. "ז3".
    pub fn display_name(&self) -> String {
        format!("{}{}", self.grade, self.class_num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_display_name_joins_grade_and_number() {
        let class = Class::new("Ort-High_ז_3", "exp1", "Ort High", "ז", "3");
        assert_eq!(class.display_name(), "ז3");
        assert_eq!(class.experiment_id, "exp1");
    }
}
