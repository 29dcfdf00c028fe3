//! Document store client
//!
//! The backend is a generic REST resource API keyed by entity (doctype)
//! names. `DocumentStore` is the seam the rest of the crate talks to; the
//! HTTP implementation lives here and tests use an in-memory fake.

use crate::model::field::FieldDef;
use crate::model::report::FilterCondition;
use crate::model::row::Row;
use crate::services::error::{parse_error_envelope, ApiError};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// A single backend document
pub type Document = Map<String, Value>;

/// HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Backend operations used by the export pipeline and record editing
pub trait DocumentStore: Send + Sync {
    /// All rows of `entity` matching `filters`, restricted to `fields`
    fn list(
        &self,
        entity: &str,
        fields: &[String],
        filters: &[FilterCondition],
    ) -> Result<Vec<Row>, ApiError>;

    /// Ordered field definitions of `entity`
    fn meta(&self, entity: &str) -> Result<Vec<FieldDef>, ApiError>;

    fn insert(&self, entity: &str, doc: &Document) -> Result<Document, ApiError>;

    fn update(&self, entity: &str, name: &str, doc: &Document) -> Result<Document, ApiError>;

    fn delete(&self, entity: &str, name: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct DocTypeMeta {
    #[serde(default)]
    fields: Vec<FieldDef>,
}

/// Credentials sent as `Authorization: token <key>:<secret>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub key: String,
    pub secret: String,
}

/// `DocumentStore` over the backend's `/api/resource` endpoints
pub struct HttpDocumentStore {
    client: Client,
    base_url: Url,
    credentials: Option<ApiCredentials>,
}

impl HttpDocumentStore {
    pub fn new(base_url: &str, credentials: Option<ApiCredentials>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::Network(format!("invalid server URL '{}': {}", base_url, e)))?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// `<base>/api/resource/<segments...>` with every segment percent-encoded
    fn resource_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Network(format!("'{}' cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "resource"])
            .extend(segments);
        Ok(url)
    }

    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(ACCEPT, "application/json")
            .header(
                USER_AGENT,
                format!("report-export-tui/{}", env!("CARGO_PKG_VERSION")),
            );
        match &self.credentials {
            Some(creds) => request.header(
                AUTHORIZATION,
                format!("token {}:{}", creds.key, creds.secret),
            ),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, ApiError> {
        let response = self.with_headers(request).send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        warn!(status = status.as_u16(), what, "backend request failed");
        Err(error_from_status(status.as_u16(), &body, what))
    }
}

/// Map a failed response onto `ApiError`
///
/// 404 is `NotFound`; a JSON error envelope becomes `Server`; anything else
/// keeps the status code.
pub fn error_from_status(status: u16, body: &str, what: &str) -> ApiError {
    if status == 404 {
        return ApiError::NotFound(what.to_string());
    }
    let has_envelope = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.as_object().cloned())
        .is_some_and(|map| {
            ["_server_messages", "message", "exception"]
                .iter()
                .any(|k| map.contains_key(*k))
        });
    if has_envelope {
        ApiError::Server(parse_error_envelope(body))
    } else {
        ApiError::Http {
            status,
            message: parse_error_envelope(body),
        }
    }
}

/// Server-side filter list: `[[entity, field, op, value], ...]`
pub fn filters_param(entity: &str, filters: &[FilterCondition]) -> String {
    let list: Vec<Value> = filters
        .iter()
        .map(|f| {
            Value::Array(vec![
                Value::String(entity.to_string()),
                Value::String(f.field.clone()),
                Value::String(f.op.operator().to_string()),
                Value::String(f.wire_value()),
            ])
        })
        .collect();
    Value::Array(list).to_string()
}

impl DocumentStore for HttpDocumentStore {
    fn list(
        &self,
        entity: &str,
        fields: &[String],
        filters: &[FilterCondition],
    ) -> Result<Vec<Row>, ApiError> {
        let url = self.resource_url(&[entity])?;
        let fields_json = serde_json::to_string(fields)?;
        let mut query = vec![
            ("fields", fields_json),
            ("limit_page_length", "None".to_string()),
        ];
        if !filters.is_empty() {
            query.push(("filters", filters_param(entity, filters)));
        }
        debug!(%url, entity, field_count = fields.len(), filter_count = filters.len(), "GET list");

        let response = self.send(self.client.get(url).query(&query), entity)?;
        let envelope: DataEnvelope<Vec<Value>> = response.json()?;
        let rows = envelope
            .data
            .iter()
            .filter_map(|v| v.as_object().map(Row::from_json_map))
            .collect();
        Ok(rows)
    }

    fn meta(&self, entity: &str) -> Result<Vec<FieldDef>, ApiError> {
        let url = self.resource_url(&["DocType", entity])?;
        debug!(%url, entity, "GET metadata");
        let response = self.send(self.client.get(url), entity)?;
        let envelope: DataEnvelope<DocTypeMeta> = response.json()?;
        Ok(envelope.data.fields)
    }

    fn insert(&self, entity: &str, doc: &Document) -> Result<Document, ApiError> {
        let url = self.resource_url(&[entity])?;
        debug!(%url, entity, "POST document");
        let response = self.send(self.client.post(url).json(doc), entity)?;
        let envelope: DataEnvelope<Document> = response.json()?;
        Ok(envelope.data)
    }

    fn update(&self, entity: &str, name: &str, doc: &Document) -> Result<Document, ApiError> {
        let url = self.resource_url(&[entity, name])?;
        debug!(%url, entity, "PUT document");
        let what = format!("{} {}", entity, name);
        let response = self.send(self.client.put(url).json(doc), &what)?;
        let envelope: DataEnvelope<Document> = response.json()?;
        Ok(envelope.data)
    }

    fn delete(&self, entity: &str, name: &str) -> Result<(), ApiError> {
        let url = self.resource_url(&[entity, name])?;
        debug!(%url, entity, "DELETE document");
        let what = format!("{} {}", entity, name);
        self.send(self.client.delete(url), &what)?;
        Ok(())
    }
}

/// Stand-in used until a server has been configured
pub struct UnconfiguredStore;

impl UnconfiguredStore {
    fn refuse<T>() -> Result<T, ApiError> {
        Err(ApiError::Network("no server configured".to_string()))
    }
}

impl DocumentStore for UnconfiguredStore {
    fn list(&self, _: &str, _: &[String], _: &[FilterCondition]) -> Result<Vec<Row>, ApiError> {
        Self::refuse()
    }

    fn meta(&self, _: &str) -> Result<Vec<FieldDef>, ApiError> {
        Self::refuse()
    }

    fn insert(&self, _: &str, _: &Document) -> Result<Document, ApiError> {
        Self::refuse()
    }

    fn update(&self, _: &str, _: &str, _: &Document) -> Result<Document, ApiError> {
        Self::refuse()
    }

    fn delete(&self, _: &str, _: &str) -> Result<(), ApiError> {
        Self::refuse()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::report::FilterOp;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answers one request on a loopback port and hands back the raw request
    fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            let head_end = loop {
                let n = stream.read(&mut buf).unwrap();
                request.extend_from_slice(&buf[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                if n == 0 {
                    break request.len();
                }
            };
            let head = String::from_utf8_lossy(&request[..head_end]).to_string();
            let length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while request.len() < head_end + length {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (base, handle)
    }

    fn server_messages_body(message: &str) -> String {
        let inner = json!({ "message": message }).to_string();
        let list = json!([inner]).to_string();
        json!({ "_server_messages": list, "exc_type": "ValidationError" }).to_string()
    }

    fn credentials() -> Option<ApiCredentials> {
        Some(ApiCredentials {
            key: "k".to_string(),
            secret: "s".to_string(),
        })
    }

    #[test]
    fn test_resource_url_encodes_entity() {
        let store = HttpDocumentStore::new("https://hr.example.com/", None).unwrap();
        let url = store.resource_url(&["Salary Slip"]).unwrap();
        assert_eq!(url.as_str(), "https://hr.example.com/api/resource/Salary%20Slip");

        let url = store.resource_url(&["DocType", "Employee"]).unwrap();
        assert_eq!(url.as_str(), "https://hr.example.com/api/resource/DocType/Employee");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpDocumentStore::new("not a url", None),
            Err(ApiError::Network(_))
        ));
    }

    #[test]
    fn test_filters_param() {
        let filters = vec![
            FilterCondition::equals("company", "Acme"),
            FilterCondition {
                field: "employee_name".to_string(),
                op: FilterOp::Like,
                value: "ann".to_string(),
            },
        ];
        assert_eq!(
            filters_param("Employee", &filters),
            r#"[["Employee","company","=","Acme"],["Employee","employee_name","like","%ann%"]]"#
        );
    }

    #[test]
    fn test_insert_surfaces_server_messages() {
        let (base, server) = serve_once(
            "417 Expectation Failed",
            server_messages_body("<b>Employee</b> is mandatory"),
        );
        let store = HttpDocumentStore::new(&base, credentials()).unwrap();
        let mut doc = Document::new();
        doc.insert("employee_name".to_string(), json!("Ann"));

        let err = store.insert("Salary Slip", &doc).unwrap_err();
        assert!(matches!(&err, ApiError::Server(m) if m == "Employee is mandatory"));
        assert!(err.is_server_message());

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /api/resource/Salary%20Slip HTTP/1.1"));
        assert!(request.to_lowercase().contains("authorization: token k:s"));
        assert!(request.contains(r#""employee_name":"Ann""#));
    }

    #[test]
    fn test_update_returns_saved_document() {
        let body = json!({ "data": { "name": "HR-EMP-0001", "status": "Left" } }).to_string();
        let (base, server) = serve_once("200 OK", body);
        let store = HttpDocumentStore::new(&base, None).unwrap();
        let mut doc = Document::new();
        doc.insert("status".to_string(), json!("Left"));

        let saved = store.update("Employee", "HR-EMP-0001", &doc).unwrap();
        assert_eq!(saved.get("status"), Some(&json!("Left")));

        let request = server.join().unwrap();
        assert!(request.starts_with("PUT /api/resource/Employee/HR-EMP-0001 HTTP/1.1"));
        assert!(request.contains(r#""status":"Left""#));
    }

    #[test]
    fn test_update_surfaces_server_messages() {
        let (base, server) = serve_once(
            "417 Expectation Failed",
            server_messages_body("Relieving Date is required"),
        );
        let store = HttpDocumentStore::new(&base, None).unwrap();

        let err = store
            .update("Employee", "HR-EMP-0001", &Document::new())
            .unwrap_err();
        assert!(matches!(&err, ApiError::Server(m) if m == "Relieving Date is required"));
        assert!(server.join().unwrap().starts_with("PUT "));
    }

    #[test]
    fn test_delete_surfaces_server_messages() {
        let (base, server) = serve_once(
            "417 Expectation Failed",
            server_messages_body("Cannot delete HR-EMP-0001 because it is linked"),
        );
        let store = HttpDocumentStore::new(&base, None).unwrap();

        let err = store.delete("Employee", "HR-EMP-0001").unwrap_err();
        assert!(matches!(
            &err,
            ApiError::Server(m) if m == "Cannot delete HR-EMP-0001 because it is linked"
        ));
        assert!(err.is_server_message());

        let request = server.join().unwrap();
        assert!(request.starts_with("DELETE /api/resource/Employee/HR-EMP-0001 HTTP/1.1"));
    }

    #[test]
    fn test_delete_not_found() {
        let (base, server) = serve_once("404 Not Found", String::new());
        let store = HttpDocumentStore::new(&base, None).unwrap();

        let err = store.delete("Employee", "HR-EMP-9999").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(what) if what == "Employee HR-EMP-9999"));
        server.join().unwrap();
    }

    #[test]
    fn test_error_from_status() {
        assert!(matches!(
            error_from_status(404, "", "Employee"),
            ApiError::NotFound(e) if e == "Employee"
        ));
        assert!(matches!(
            error_from_status(417, r#"{"exception": "ValidationError: bad"}"#, "Employee"),
            ApiError::Server(m) if m == "ValidationError: bad"
        ));
        assert!(matches!(
            error_from_status(502, "Bad Gateway", "Employee"),
            ApiError::Http { status: 502, .. }
        ));
    }
}
