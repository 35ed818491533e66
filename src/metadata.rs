//! Request metadata: the caller's parameter values, flattened to strings and
//! placed into the request according to the operation's declared parameters.
//!
//! Values are not validated here; the server is the judge of what it accepts.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::operations::{Operation, ParameterLocation};

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("failed to serialize parameters: {0}")]
    Json(#[from] serde_json::Error),
    #[error("parameters must serialize to an object, got {0}")]
    NotAnObject(&'static str),
    #[error("parameter `{0}` is not a scalar or a list of scalars")]
    NestedValue(String),
    #[error("path parameter `{0}` has no value")]
    MissingPathParameter(String),
    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("server URL `{0}` cannot be used as a base URL")]
    NotABase(String),
}

/// Parameter name → value pairs for one request, in serialization order.
///
/// A list value expands into one pair per element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten any serializable parameter value. `()` and `None` give empty metadata;
    /// `null` fields are skipped.
    pub fn from_params<P: Serialize + ?Sized>(params: &P) -> Result<Self, MetadataError> {
        let map = match serde_json::to_value(params)? {
            Value::Null => return Ok(Self::new()),
            Value::Object(map) => map,
            other => return Err(MetadataError::NotAnObject(kind(&other))),
        };

        let mut metadata = Self::new();
        for (name, value) in map {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        let item = scalar(&item)
                            .ok_or_else(|| MetadataError::NestedValue(name.clone()))?;
                        metadata.insert(name.clone(), item);
                    }
                }
                value => {
                    let value = scalar(&value)
                        .ok_or_else(|| MetadataError::NestedValue(name.clone()))?;
                    metadata.insert(name, value);
                }
            }
        }

        Ok(metadata)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort every entry into the location `operation` declares for it.
    /// Names the operation does not declare go to the query string.
    pub fn place(self, operation: &Operation) -> Placement {
        let mut placement = Placement::default();
        for (name, value) in self.entries {
            let location = operation
                .parameter(&name)
                .map_or(ParameterLocation::Query, |p| p.location);
            let bucket = match location {
                ParameterLocation::Query => &mut placement.query,
                ParameterLocation::Path => &mut placement.path,
                ParameterLocation::Header => &mut placement.headers,
                ParameterLocation::Cookie => &mut placement.cookies,
            };
            bucket.push((name, value));
        }
        placement
    }
}

/// Metadata split by where it travels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub path: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
}

impl Placement {
    /// `server` joined with the operation path, path placeholders filled and
    /// percent-encoded, query pairs appended.
    pub fn url(&self, server: &str, operation: &Operation) -> Result<Url, MetadataError> {
        let mut url = Url::parse(server)?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| MetadataError::NotABase(server.to_string()))?;
            segments.pop_if_empty();
            for segment in operation.path.split('/').filter(|s| !s.is_empty()) {
                match segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                {
                    Some(name) => {
                        let value = self
                            .path
                            .iter()
                            .find(|(n, _)| n == name)
                            .map(|(_, v)| v.as_str())
                            .ok_or_else(|| MetadataError::MissingPathParameter(name.to_string()))?;
                        segments.push(value);
                    }
                    None => {
                        segments.push(segment);
                    }
                }
            }
        }

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }

        Ok(url)
    }

    /// The `Cookie` header value, if any cookie parameters were placed.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{self, HttpMethod, Parameter};
    use crate::types::{GetTransactionsParams, LookupBlockParams};

    const ACCOUNT: &str = "EQCD39VS5jcptHL8vMjEXrzGaRcCVYto7HUn4bpAOg8xqB2N";

    const WITH_PATH: Operation = Operation {
        id: "getAccount",
        path: "/accounts/{account}/state",
        method: HttpMethod::Get,
        summary: "Get Account",
        parameters: &[
            Parameter {
                name: "account",
                location: ParameterLocation::Path,
                required: true,
            },
            Parameter {
                name: "x-trace",
                location: ParameterLocation::Header,
                required: false,
            },
            Parameter {
                name: "session",
                location: ParameterLocation::Cookie,
                required: false,
            },
        ],
    };

    #[test]
    fn unset_optionals_are_skipped() {
        let params = GetTransactionsParams {
            address: ACCOUNT.to_string(),
            limit: Some(10),
            lt: None,
            hash: None,
            to_lt: None,
            archival: Some(true),
        };
        let metadata = Metadata::from_params(&params).unwrap();

        assert_eq!(metadata.len(), 3);
        assert_eq!(metadata.get("address"), Some(ACCOUNT));
        assert_eq!(metadata.get("limit"), Some("10"));
        assert_eq!(metadata.get("archival"), Some("true"));
        assert_eq!(metadata.get("lt"), None);
    }

    #[test]
    fn unit_and_json_objects_are_accepted() {
        assert!(Metadata::from_params(&()).unwrap().is_empty());

        let metadata =
            Metadata::from_params(&serde_json::json!({ "seqno": 42, "ids": [1, 2] })).unwrap();
        let mut pairs: Vec<_> = metadata.iter().collect();
        pairs.sort();
        assert_eq!(pairs, [("ids", "1"), ("ids", "2"), ("seqno", "42")]);
    }

    #[test]
    fn non_flat_parameters_are_rejected() {
        let err = Metadata::from_params(&"address").unwrap_err();
        assert!(matches!(err, MetadataError::NotAnObject("a string")));

        let err = Metadata::from_params(&serde_json::json!({ "block": { "seqno": 1 } }))
            .unwrap_err();
        assert!(matches!(err, MetadataError::NestedValue(name) if name == "block"));
    }

    #[test]
    fn query_parameters_land_in_the_query_string() {
        let params = LookupBlockParams {
            workchain: -1,
            shard: i64::MIN,
            seqno: Some(1000),
            lt: None,
            unixtime: None,
        };
        let placement = Metadata::from_params(&params)
            .unwrap()
            .place(&operations::LOOKUP_BLOCK);
        assert!(placement.path.is_empty());
        assert!(placement.headers.is_empty());

        let url = placement
            .url("https://ton-mainnet.s.chainbase.online/v1", &operations::LOOKUP_BLOCK)
            .unwrap();
        assert_eq!(url.path(), "/v1/lookupBlock");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("workchain".into(), "-1".into())));
        assert!(query.contains(&("shard".into(), "-9223372036854775808".into())));
        assert!(query.contains(&("seqno".into(), "1000".into())));
        assert_eq!(query.len(), 3);
    }

    #[test]
    fn server_root_with_trailing_slash() {
        let url = Placement::default()
            .url("http://127.0.0.1:8080/", &operations::GET_MASTERCHAIN_INFO)
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/getMasterchainInfo");
    }

    #[test]
    fn path_header_and_cookie_parameters_are_placed() {
        let mut metadata = Metadata::new();
        metadata.insert("account", "0:abc/def");
        metadata.insert("x-trace", "1");
        metadata.insert("session", "s1");
        metadata.insert("extra", "yes");

        let placement = metadata.place(&WITH_PATH);
        assert_eq!(placement.headers, [("x-trace".to_string(), "1".to_string())]);
        assert_eq!(placement.cookie_header().as_deref(), Some("session=s1"));

        let url = placement.url("https://api.example.com/v2", &WITH_PATH).unwrap();
        assert_eq!(url.path(), "/v2/accounts/0:abc%2Fdef/state");
        assert_eq!(url.query(), Some("extra=yes"));
    }

    #[test]
    fn non_base_server_is_rejected() {
        let err = Placement::default()
            .url("mailto:ops@example.com", &operations::GET_MASTERCHAIN_INFO)
            .unwrap_err();
        assert!(matches!(
            err,
            MetadataError::NotABase(server) if server == "mailto:ops@example.com"
        ));
    }

    #[test]
    fn missing_path_parameter_fails() {
        let err = Placement::default()
            .url("https://api.example.com", &WITH_PATH)
            .unwrap_err();
        assert!(matches!(err, MetadataError::MissingPathParameter(name) if name == "account"));
    }
}
