use crate::model::{PageRef, Pagination};

/// Page and limit used when the request gives none or an unusable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationDefaults {
    pub page: u64,
    pub limit: u64,
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self { page: 1, limit: 25 }
    }
}

/// The slice of the result set a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
}

impl PageWindow {
    pub fn resolve(page: Option<&str>, limit: Option<&str>, defaults: &PaginationDefaults) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(defaults.page.max(1)),
            limit: parse_positive(limit).unwrap_or(defaults.limit.max(1)),
        }
    }

    pub fn start_index(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn end_index(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }

    /// Neighbouring pages given the number of matching documents.
    pub fn links(&self, total: u64) -> Pagination {
        Pagination {
            next: (self.end_index() < total).then(|| PageRef {
                page: self.page + 1,
                limit: self.limit,
            }),
            prev: (self.start_index() > 0).then(|| PageRef {
                page: self.page - 1,
                limit: self.limit,
            }),
        }
    }
}

/// Leading-integer read: `"2.5"` is 2 and `"10abc"` is 10. Signed,
/// empty or zero input yields `None`.
fn parse_positive(raw: Option<&str>) -> Option<u64> {
    let text = raw?.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let digits = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    if digits == 0 {
        return None;
    }
    // Overlong digit runs saturate rather than fall back.
    let value = text[..digits].parse::<u64>().unwrap_or(u64::MAX);
    (value > 0).then_some(value)
}
