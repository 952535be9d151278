use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::resource::{check_max_len, check_required};
use crate::model::{timestamp, Id, Parent, Relation, Resource, Rollup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: Id,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: MinimumSkill,
    #[serde(default)]
    pub scholarship_available: bool,
    pub bootcamp: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Id>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

pub(crate) const BOOTCAMP_PARENT: Parent = Parent {
    field: "bootcamp",
    collection: "bootcamps",
    label: "Bootcamp",
};

impl Resource for Course {
    const COLLECTION: &'static str = "courses";
    const LABEL: &'static str = "Course";
    const ALLOW_LIST: &'static [&'static str] = &[
        "select",
        "sort",
        "page",
        "limit",
        "title",
        "weeks",
        "tuition",
        "minimumSkill",
        "scholarshipAvailable",
        "bootcamp",
        "user",
    ];
    const PARENT: Option<Parent> = Some(BOOTCAMP_PARENT);

    fn relations() -> Vec<Relation> {
        vec![Relation::reference("bootcamp", "bootcamps", &["name", "description"])]
    }

    fn rollup() -> Option<Rollup> {
        Some(Rollup {
            source_field: "tuition",
            target_field: "averageCost",
            round_up_to: Some(10.0),
        })
    }

    fn prepare(&mut self) {
        self.title = self.title.trim().to_string();
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_required(&mut errors, "course title", &self.title);
        check_required(&mut errors, "description", &self.description);
        check_required(&mut errors, "number of weeks", &self.weeks);
        if !self.tuition.is_finite() || self.tuition < 0.0 {
            errors.push("Tuition cost must be a positive number".to_string());
        }
        check_max_len(&mut errors, "Title", &self.title, 100);
        errors
    }
}
