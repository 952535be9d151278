//! Translation of list-endpoint query strings into store queries.
//!
//! A request passes the allow-list gate or is rejected as a whole. An
//! accepted request becomes a [`QueryPlan`]: a filter built from the
//! non-meta parameters, a projection from `select`, sort keys from `sort`
//! and a page window from `page`/`limit`. Running the plan issues the count
//! and the page fetch concurrently and wraps both in a [`ResultEnvelope`].

use anyhow::Result;
use itertools::Itertools;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::logic::pagination::{PageWindow, PaginationDefaults};
use crate::logic::populate::find_populated;
use crate::model::{
    CompareOp, Condition, FindQuery, Filter, PageEnvelope, Projection, QueryRequest, QueryValue,
    Relation, ResultEnvelope, SortKey, CREATED_AT_FIELD,
};
use crate::store::DocumentStore;

/// Parameters that shape the query rather than filter it.
pub const META_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

/// Parameter searched by case-insensitive prefix instead of equality.
pub const NAME_KEY: &str = "name";

/// Exact, case-sensitive set of accepted parameter names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    keys: BTreeSet<String>,
}

impl AllowList {
    pub fn new<I, T>(keys: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn permits(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Keys of the request that are not permitted, sorted by name.
    pub fn rejected<'a>(&self, request: &'a QueryRequest) -> Vec<&'a str> {
        request.keys().filter(|key| !self.permits(key)).collect()
    }
}

/// Remove the meta keys. Applying it twice changes nothing.
pub fn strip_meta(request: &QueryRequest) -> QueryRequest {
    request.without(&META_KEYS)
}

/// Turn the filter parameters into a structured predicate.
///
/// Inside a field's nested map, keys that are exactly `gt`, `gte`, `lt`,
/// `lte` or `in` become comparisons. A nested map with any other key is
/// compared as a whole embedded document. Values are never rewritten. A text
/// `name` becomes a lowercased prefix match.
pub fn build_filter(filter_params: &QueryRequest) -> Filter {
    let mut filter = Filter::new();
    for (key, value) in filter_params.iter() {
        let condition = match (key, value) {
            (NAME_KEY, QueryValue::Text(name)) => Condition::Prefix(name.to_lowercase()),
            (_, QueryValue::Map(entries)) => {
                let ops: Option<Vec<(CompareOp, Value)>> = entries
                    .iter()
                    .map(|(token, operand)| {
                        CompareOp::from_token(token).map(|op| (op, operand.to_json()))
                    })
                    .collect();
                match ops {
                    Some(ops) if !ops.is_empty() => Condition::Compare(ops),
                    _ => Condition::Equals(value.to_json()),
                }
            }
            (_, other) => Condition::Equals(other.to_json()),
        };
        filter = filter.with(key, condition);
    }
    filter
}

/// An accepted request, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub query: FindQuery,
    pub window: PageWindow,
}

/// The list-endpoint query adapter for one resource.
#[derive(Debug, Clone)]
pub struct AdvancedResults {
    allow_list: AllowList,
    defaults: PaginationDefaults,
    populate: Vec<Relation>,
    scope: Option<(String, Value)>,
}

impl AdvancedResults {
    pub fn new(allow_list: AllowList, defaults: PaginationDefaults) -> Self {
        Self {
            allow_list,
            defaults,
            populate: Vec::new(),
            scope: None,
        }
    }

    #[must_use]
    pub fn with_populate(self, populate: Vec<Relation>) -> Self {
        Self { populate, ..self }
    }

    /// Restrict every query to documents whose `field` equals `value`.
    /// The scope is applied after validation and overrides a request
    /// parameter of the same name.
    #[must_use]
    pub fn with_scope(self, field: impl Into<String>, value: Value) -> Self {
        Self {
            scope: Some((field.into(), value)),
            ..self
        }
    }

    /// `None` when any parameter falls outside the allow-list.
    pub fn plan(&self, request: &QueryRequest) -> Option<QueryPlan> {
        let rejected = self.allow_list.rejected(request);
        if !rejected.is_empty() {
            log::warn!("Rejected query parameters: {}", rejected.iter().join(", "));
            return None;
        }

        let mut filter = build_filter(&strip_meta(request));
        if let Some((field, value)) = &self.scope {
            filter = filter.with(field.clone(), Condition::Equals(value.clone()));
        }

        let sort = request
            .text("sort")
            .map(SortKey::parse_list)
            .filter(|keys| !keys.is_empty())
            .unwrap_or_else(|| vec![SortKey::desc(CREATED_AT_FIELD)]);

        let window = PageWindow::resolve(request.text("page"), request.text("limit"), &self.defaults);

        let query = FindQuery::new(filter)
            .select(request.text("select").and_then(Projection::parse))
            .sort(sort)
            .skip(window.start_index())
            .limit(window.limit)
            .populate(self.populate.clone());

        Some(QueryPlan { query, window })
    }

    /// Validate, query and wrap. A rejected request never reaches the store.
    pub async fn run<S: DocumentStore + ?Sized>(
        &self,
        store: &S,
        collection: &str,
        request: &QueryRequest,
    ) -> Result<ResultEnvelope> {
        let Some(plan) = self.plan(request) else {
            return Ok(ResultEnvelope::rejected());
        };

        log::debug!(
            "{} query: filter={} sort={} skip={} limit={}",
            collection,
            plan.query.filter,
            plan.query.sort.iter().join(","),
            plan.query.skip,
            plan.window.limit
        );

        let (total, data) = tokio::try_join!(
            store.count_documents(collection, &plan.query.filter),
            find_populated(store, collection, &plan.query),
        )?;

        Ok(ResultEnvelope::Page(PageEnvelope {
            success: true,
            count: data.len(),
            total_count: total,
            pagination: plan.window.links(total),
            data,
        }))
    }
}
