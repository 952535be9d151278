use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::Document;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

/// Successful list response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope {
    pub success: bool,
    pub count: usize,
    pub total_count: u64,
    pub pagination: Pagination,
    pub data: Vec<Document>,
}

/// Returned when a request carries a parameter outside the allow-list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedEnvelope {
    pub success: bool,
    pub data: Map<String, Value>,
}

impl Default for RejectedEnvelope {
    fn default() -> Self {
        Self {
            success: false,
            data: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultEnvelope {
    Page(PageEnvelope),
    Rejected(RejectedEnvelope),
}

impl ResultEnvelope {
    pub fn rejected() -> Self {
        ResultEnvelope::Rejected(RejectedEnvelope::default())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultEnvelope::Page(page) if page.success)
    }

    pub fn page(&self) -> Option<&PageEnvelope> {
        match self {
            ResultEnvelope::Page(page) => Some(page),
            ResultEnvelope::Rejected(_) => None,
        }
    }
}

/// Unpaged list response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEnvelope {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Document>,
}

impl ListEnvelope {
    pub fn new(data: Vec<Document>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Single-entity response body.
#[derive(Debug, Clone, Serialize)]
pub struct DataEnvelope<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejected_shape() {
        let value = serde_json::to_value(ResultEnvelope::rejected()).unwrap();
        assert_eq!(value, json!({"success": false, "data": {}}));
    }

    #[test]
    fn test_list_counts_data() {
        let document = json!({"_id": "1"}).as_object().cloned().unwrap();
        let value = serde_json::to_value(ListEnvelope::new(vec![document])).unwrap();
        assert_eq!(value, json!({"success": true, "count": 1, "data": [{"_id": "1"}]}));
    }

    #[test]
    fn test_page_shape_omits_missing_links() {
        let envelope = ResultEnvelope::Page(PageEnvelope {
            success: true,
            count: 0,
            total_count: 3,
            pagination: Pagination {
                next: Some(PageRef { page: 2, limit: 1 }),
                prev: None,
            },
            data: Vec::new(),
        });

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "count": 0,
                "totalCount": 3,
                "pagination": {"next": {"page": 2, "limit": 1}},
                "data": []
            })
        );
        assert!(envelope.is_success());
    }
}
