//! Request descriptors and responses exchanged with a transport.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use common::{AppError, AppResult};
use domain::bearer_value;

pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// HTTP verb
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::str::FromStr for Method {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            other => Err(AppError::validation(format!("Unsupported method '{}'", other))),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied request options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::Post,
            body: Some(body),
            ..Default::default()
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Fully resolved request handed to a transport.
///
/// Header names are stored lowercase, so a caller header replaces a default
/// header regardless of spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Build from options: JSON content type, optional bearer, then caller
    /// headers on top, and the query appended to the URL.
    pub fn build(url: Url, options: RequestOptions, access_token: Option<&str>) -> Self {
        let mut url = url;
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(options.query.iter());
        }

        let mut request = Self::new(options.method, url).with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON);
        if let Some(token) = access_token {
            request = request.with_bearer(token);
        }
        for (name, value) in options.headers {
            request = request.with_header(&name, value);
        }
        request.body = options.body;
        request
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self.with_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON)
    }

    /// Replace the `Authorization` header with a bearer token.
    pub fn with_bearer(self, access_token: &str) -> Self {
        self.with_header(HEADER_AUTHORIZATION, bearer_value(access_token))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn authorization(&self) -> Option<&str> {
        self.header(HEADER_AUTHORIZATION)
    }
}

/// Response returned by a transport. Non-JSON bodies are kept as a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Canned answer of the simulated transport.
    pub fn simulated_success() -> Self {
        Self::new(200, json!({ "success": true }))
    }

    /// Decode raw body bytes.
    pub fn from_bytes(status: u16, bytes: &[u8]) -> Self {
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
        };
        Self::new(status, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Decode the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> AppResult<T> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Convert an error status into an application error, keeping the server message.
    pub fn error_for_status(self) -> AppResult<Self> {
        if self.is_success() {
            return Ok(self);
        }
        if self.is_unauthorized() {
            return Err(AppError::Unauthorized);
        }
        Err(AppError::api(self.status, self.server_message()))
    }

    /// Best-effort message from a DRF-style error body.
    pub fn server_message(&self) -> String {
        match &self.body {
            Value::String(text) if !text.is_empty() => text.clone(),
            Value::Object(map) => ["detail", "error", "message"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::to_string)
                .or_else(|| first_field_error(map))
                .unwrap_or_else(|| format!("Request failed with status {}", self.status)),
            _ => format!("Request failed with status {}", self.status),
        }
    }
}

// DRF validation errors look like {"field": ["message", ...]}
fn first_field_error(map: &serde_json::Map<String, Value>) -> Option<String> {
    map.iter().find_map(|(field, value)| {
        value
            .as_array()
            .and_then(|messages| messages.first())
            .and_then(Value::as_str)
            .map(|message| format!("{}: {}", field, message))
    })
}
