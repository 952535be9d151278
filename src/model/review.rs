use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::course::BOOTCAMP_PARENT;
use crate::model::resource::{check_max_len, check_required};
use crate::model::{timestamp, Id, Parent, Relation, Resource, Rollup};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: Id,
    pub title: String,
    pub text: String,
    pub rating: u8,
    pub bootcamp: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Id>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Resource for Review {
    const COLLECTION: &'static str = "reviews";
    const LABEL: &'static str = "Review";
    const ALLOW_LIST: &'static [&'static str] = &[
        "select", "sort", "page", "limit", "title", "rating", "bootcamp", "user",
    ];
    const PARENT: Option<Parent> = Some(BOOTCAMP_PARENT);

    fn relations() -> Vec<Relation> {
        vec![Relation::reference("bootcamp", "bootcamps", &["name", "description"])]
    }

    fn rollup() -> Option<Rollup> {
        Some(Rollup {
            source_field: "rating",
            target_field: "averageRating",
            round_up_to: None,
        })
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_required(&mut errors, "title for the review", &self.title);
        check_max_len(&mut errors, "Title", &self.title, 100);
        check_required(&mut errors, "some text", &self.text);
        if !(1..=10).contains(&self.rating) {
            errors.push("Please add a rating between 1 and 10".to_string());
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rating_bounds() {
        let mut review: Review = serde_json::from_value(json!({
            "_id": "e0e0e0e0-0000-4000-8000-000000000001",
            "title": "Learned a ton",
            "text": "Great instructors",
            "rating": 8,
            "bootcamp": "a0a0a0a0-0000-4000-8000-000000000001",
            "createdAt": "2024-01-01T00:00:00.000000Z"
        }))
        .unwrap();
        assert!(review.validate().is_empty());

        review.rating = 0;
        assert_eq!(review.validate(), vec!["Please add a rating between 1 and 10"]);
    }
}
