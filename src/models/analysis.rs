use serde::Serialize;

/// Result of an aggregate computed over zero or more usable records.
///
/// `NoData` means there was nothing to aggregate (no timestamps, no cycle
/// times, no throughput). It is a normal outcome, not an error; callers
/// decide whether it is fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Analysis<T> {
    NoData,
    Ready(T),
}

impl<T> Analysis<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, Analysis::NoData)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Analysis::Ready(value) => Some(value),
            Analysis::NoData => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Analysis<U> {
        match self {
            Analysis::Ready(value) => Analysis::Ready(f(value)),
            Analysis::NoData => Analysis::NoData,
        }
    }
}

impl<T> From<Option<T>> for Analysis<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Analysis::Ready(v),
            None => Analysis::NoData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_is_distinct_from_empty_ready() {
        let empty: Analysis<Vec<u32>> = Analysis::Ready(Vec::new());
        let none: Analysis<Vec<u32>> = Analysis::NoData;
        assert_eq!(empty.clone().into_option(), Some(Vec::new()));
        assert!(none.is_no_data());
        assert_ne!(empty, none);
    }

    #[test]
    fn test_serialize_tagged() {
        let ready = Analysis::Ready(3);
        assert_eq!(
            serde_json::to_string(&ready).unwrap(),
            r#"{"state":"ready","data":3}"#
        );
        let none: Analysis<i32> = Analysis::NoData;
        assert_eq!(serde_json::to_string(&none).unwrap(), r#"{"state":"no_data"}"#);
    }
}
