use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

/// Page of results plus the number of rows matching the filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationResult<T> {
    pub objects: Vec<T>,
    pub count: i64,
}

/// Filter / sort / paginate input of `query_all`.
///
/// `sorting` entries are column names, prefixed with `-` for descending order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryAll {
    #[serde(default)]
    pub filters: BTreeMap<String, Value>,
    #[serde(default)]
    pub sorting: Vec<String>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl QueryAll {
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>) -> Self {
        self.sorting.push(field.into());
        self
    }

    pub fn paginate(mut self, limit: i64, offset: i64) -> Self {
        self.pagination = Some(Pagination { limit, offset });
        self
    }
}
