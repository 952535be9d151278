use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::resource::{check_max_len, check_required, looks_like_email, looks_like_url};
use crate::model::{timestamp, Cascade, Id, Location, Relation, Resource};

pub const CAREERS: &[&str] = &[
    "Web Development",
    "Mobile Development",
    "UI/UX",
    "Data Science",
    "Business",
    "Other",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Filled by the geocoder from `address`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub careers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    #[serde(default = "default_photo")]
    pub photo: String,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Id>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

fn default_photo() -> String {
    "no-photo.jpg".to_string()
}

/// Lowercase, ASCII-alphanumeric words joined by `-`.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

impl Resource for Bootcamp {
    const COLLECTION: &'static str = "bootcamps";
    const LABEL: &'static str = "Bootcamp";
    const ALLOW_LIST: &'static [&'static str] = &[
        "select",
        "sort",
        "page",
        "user",
        "phone",
        "website",
        "name",
        "limit",
        "averageCost",
        "averageRating",
        "careers",
        "housing",
        "jobAssistance",
        "jobGuarantee",
        "acceptGi",
    ];
    const UNIQUE_FIELDS: &'static [&'static str] = &["name"];

    fn relations() -> Vec<Relation> {
        vec![Relation::virtual_many("courses", "courses", "bootcamp")]
    }

    fn cascade() -> &'static [Cascade] {
        &[
            Cascade { collection: "courses", field: "bootcamp" },
            Cascade { collection: "reviews", field: "bootcamp" },
        ]
    }

    fn address(&self) -> Option<&str> {
        self.address.as_deref().filter(|address| !address.trim().is_empty())
    }

    fn set_location(&mut self, location: Option<Location>) {
        self.location = location;
    }

    fn prepare(&mut self) {
        self.name = self.name.trim().to_string();
        self.slug = slugify(&self.name);
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_required(&mut errors, "name", &self.name);
        check_max_len(&mut errors, "Name", &self.name, 50);
        check_required(&mut errors, "description", &self.description);
        check_max_len(&mut errors, "Description", &self.description, 500);

        if let Some(website) = &self.website {
            if !looks_like_url(website) {
                errors.push("Please use a valid URL with HTTP or HTTPS".to_string());
            }
        }
        if let Some(phone) = &self.phone {
            check_max_len(&mut errors, "Phone number", phone, 20);
        }
        if let Some(email) = &self.email {
            if !looks_like_email(email) {
                errors.push("Please add a valid email".to_string());
            }
        }

        if self.careers.is_empty() {
            errors.push("Please add at least one career".to_string());
        }
        for career in &self.careers {
            if !CAREERS.contains(&career.as_str()) {
                errors.push(format!("`{career}` is not a valid career"));
            }
        }

        if let Some(rating) = self.average_rating {
            if !(1.0..=10.0).contains(&rating) {
                errors.push("Average rating must be between 1 and 10".to_string());
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bootcamp() -> Bootcamp {
        serde_json::from_value(json!({
            "_id": "a0a0a0a0-0000-4000-8000-000000000001",
            "name": "Devworks Bootcamp",
            "description": "Full stack web development",
            "website": "https://devworks.com",
            "careers": ["Web Development", "UI/UX"],
            "createdAt": "2024-01-01T00:00:00.000000Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let bootcamp = bootcamp();
        assert_eq!(bootcamp.photo, "no-photo.jpg");
        assert!(!bootcamp.housing);
        assert_eq!(bootcamp.average_cost, None);
        assert!(bootcamp.validate().is_empty());
    }

    #[test]
    fn test_prepare_sets_slug() {
        let mut bootcamp = bootcamp();
        bootcamp.name = "  ModernTech  Bootcamp! ".to_string();
        bootcamp.prepare();

        assert_eq!(bootcamp.name, "ModernTech  Bootcamp!");
        assert_eq!(bootcamp.slug, "moderntech-bootcamp");
    }

    #[test]
    fn test_validation_messages() {
        let mut bootcamp = bootcamp();
        bootcamp.name = "x".repeat(51);
        bootcamp.careers = vec!["Juggling".to_string()];
        bootcamp.website = Some("devworks".to_string());

        let errors = bootcamp.validate();
        assert!(errors.contains(&"Name can not be more than 50 characters".to_string()));
        assert!(errors.contains(&"`Juggling` is not a valid career".to_string()));
        assert!(errors.contains(&"Please use a valid URL with HTTP or HTTPS".to_string()));
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(bootcamp()).unwrap();
        assert_eq!(value["_id"], "a0a0a0a0-0000-4000-8000-000000000001");
        assert_eq!(value["jobAssistance"], false);
        assert_eq!(value["createdAt"], "2024-01-01T00:00:00.000000Z");
        assert!(value.get("averageCost").is_none());
        assert!(value.get("location").is_none());
    }

    #[test]
    fn test_address_hook() {
        let mut bootcamp = bootcamp();
        assert_eq!(bootcamp.address(), None);
        bootcamp.address = Some("  ".to_string());
        assert_eq!(bootcamp.address(), None);
        bootcamp.address = Some("Boston MA 02215".to_string());
        assert_eq!(bootcamp.address(), Some("Boston MA 02215"));

        bootcamp.set_location(Some(Location::point(-71.1, 42.35)));
        let value = serde_json::to_value(&bootcamp).unwrap();
        assert_eq!(value["location"]["coordinates"], json!([-71.1, 42.35]));
    }
}
