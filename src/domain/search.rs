use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Search request body. Keys map to arbitrarily nested JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(pub Map<String, Value>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// `{"query": {"match_all": {}}}`
    pub fn match_all() -> Self {
        let mut body = Map::new();
        body.insert("query".into(), serde_json::json!({ "match_all": {} }));
        Self(body)
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Builds a query from a JSON value. Only objects are accepted.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(body) => Some(Self(body)),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for Query {
    fn from(body: Map<String, Value>) -> Self {
        Self(body)
    }
}

/// Decoded body of a successful search response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub result: Map<String, Value>,
}

impl SearchResult {
    pub fn new(result: Map<String, Value>) -> Self {
        Self { result }
    }

    /// JSON pointer lookup into the body, e.g. `/hits/total/value`.
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let (first, rest) = split_pointer(pointer)?;
        let value = self.result.get(first.as_str())?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.pointer(rest)
        }
    }

    pub fn total_hits(&self) -> Option<u64> {
        total_hits(&self.result)
    }

    pub fn took(&self) -> Option<u64> {
        took(&self.result)
    }

    /// `_source` of every returned hit, in response order.
    pub fn sources(&self) -> Vec<&Value> {
        self.pointer("/hits/hits")
            .and_then(Value::as_array)
            .map(|hits| hits.iter().filter_map(|hit| hit.get("_source")).collect())
            .unwrap_or_default()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.result
    }
}

fn split_pointer(pointer: &str) -> Option<(String, &str)> {
    let pointer = pointer.strip_prefix('/')?;
    let (first, rest) = match pointer.find('/') {
        Some(idx) => (&pointer[..idx], &pointer[idx..]),
        None => (pointer, ""),
    };
    Some((first.replace("~1", "/").replace("~0", "~"), rest))
}

/// Total hit count from `hits.total.value`. Older servers report
/// `hits.total` as a bare number, which is accepted as well.
pub fn total_hits(body: &Map<String, Value>) -> Option<u64> {
    let total = body.get("hits")?.get("total")?;
    match total {
        Value::Object(total) => total.get("value").and_then(as_count),
        other => as_count(other),
    }
}

/// Server-reported request duration in milliseconds.
pub fn took(body: &Map<String, Value>) -> Option<u64> {
    body.get("took").and_then(as_count)
}

fn as_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_match_all_shape() {
        let query = serde_json::to_value(Query::match_all()).unwrap();
        assert_eq!(query, json!({"query": {"match_all": {}}}));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Query::from_value(json!([1, 2])).is_none());
        assert!(Query::from_value(json!("match_all")).is_none());
        assert!(Query::from_value(json!({"size": 0})).is_some());
    }

    #[test]
    fn test_total_hits_modern_and_legacy() {
        assert_eq!(total_hits(&body(json!({"hits": {"total": {"value": 3}}}))), Some(3));
        assert_eq!(total_hits(&body(json!({"hits": {"total": 7}}))), Some(7));
        assert_eq!(total_hits(&body(json!({"hits": {"total": {"value": 3.0}}}))), Some(3));
    }

    #[test]
    fn test_total_hits_tolerates_unexpected_shapes() {
        assert_eq!(total_hits(&body(json!({}))), None);
        assert_eq!(total_hits(&body(json!({"hits": []}))), None);
        assert_eq!(total_hits(&body(json!({"hits": {"total": "three"}}))), None);
        assert_eq!(total_hits(&body(json!({"hits": {"total": {"value": -1}}}))), None);
    }

    #[test]
    fn test_took() {
        assert_eq!(took(&body(json!({"took": 12}))), Some(12));
        assert_eq!(took(&body(json!({"took": "12ms"}))), None);
    }

    #[test]
    fn test_search_result_accessors() {
        let result = SearchResult::new(body(json!({
            "took": 4,
            "hits": {
                "total": {"value": 2, "relation": "eq"},
                "hits": [
                    {"_id": "1", "_source": {"metricset": "cpu"}},
                    {"_id": "2", "_source": {"metricset": "memory"}}
                ]
            }
        })));

        assert_eq!(result.total_hits(), Some(2));
        assert_eq!(result.took(), Some(4));
        assert_eq!(result.pointer("/hits/total/relation"), Some(&json!("eq")));
        assert_eq!(result.pointer("/took"), Some(&json!(4)));
        assert_eq!(result.pointer("took"), None);
        assert_eq!(
            result.sources(),
            vec![&json!({"metricset": "cpu"}), &json!({"metricset": "memory"})]
        );
    }
}
