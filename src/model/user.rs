use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::resource::{check_required, looks_like_email};
use crate::model::{timestamp, Id, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Publisher,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Resource for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";
    const ALLOW_LIST: &'static [&'static str] =
        &["select", "sort", "page", "limit", "name", "email", "role"];
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn prepare(&mut self) {
        self.email = self.email.trim().to_ascii_lowercase();
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_required(&mut errors, "name", &self.name);
        if !looks_like_email(&self.email) {
            errors.push("Please add a valid email".to_string());
        }
        errors
    }
}
