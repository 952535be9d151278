use serde::{de::DeserializeOwned, Serialize};

use crate::model::{Location, Relation};

/// Link from a child resource to the document that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent {
    pub field: &'static str,
    pub collection: &'static str,
    pub label: &'static str,
}

/// Parent field recomputed from the children after every child write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rollup {
    pub source_field: &'static str,
    pub target_field: &'static str,
    /// Round the mean up to a multiple of this step.
    pub round_up_to: Option<f64>,
}

/// Children removed together with their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cascade {
    pub collection: &'static str,
    pub field: &'static str,
}

/// A collection exposed over the REST API.
///
/// Entities are stored as documents. The typed form is only used to
/// validate and normalise writes; reads return documents so that field
/// selection and relation expansion can reshape them.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Singular display name used in error messages.
    const LABEL: &'static str;
    /// Query parameters accepted by the list endpoint.
    const ALLOW_LIST: &'static [&'static str];
    const UNIQUE_FIELDS: &'static [&'static str] = &[];
    const PARENT: Option<Parent> = None;

    fn relations() -> Vec<Relation> {
        Vec::new()
    }

    fn rollup() -> Option<Rollup> {
        None
    }

    fn cascade() -> &'static [Cascade] {
        &[]
    }

    /// Text the geocoder resolves into a location, for resources that have one.
    fn address(&self) -> Option<&str> {
        None
    }

    fn set_location(&mut self, _location: Option<Location>) {}

    /// Derive computed fields before validation and storage.
    fn prepare(&mut self) {}

    /// Field-level problems, empty when the entity is valid.
    fn validate(&self) -> Vec<String>;
}

pub(crate) fn check_max_len(errors: &mut Vec<String>, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(format!("{field} can not be more than {max} characters"));
    }
}

pub(crate) fn check_required(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(format!("Please add a {field}"));
    }
}

pub(crate) fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

pub(crate) fn looks_like_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(host) => {
            let host = host.split('/').next().unwrap_or_default();
            host.contains('.') && !host.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
