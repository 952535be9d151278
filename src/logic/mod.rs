pub mod advanced_results;
pub mod document_filter;
pub mod pagination;
pub mod populate;
pub mod rollup;

pub use advanced_results::{build_filter, strip_meta, AdvancedResults, AllowList, QueryPlan};
pub use document_filter::DocumentFilterEvaluator;
pub use pagination::{PageWindow, PaginationDefaults};
pub use populate::find_populated;
pub use rollup::refresh_rollup;
