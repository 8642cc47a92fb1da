// SRDFA Reporter - Daily replication throughput collector
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Unisphere REST client
//!
//! The three calls a collection run needs: list arrays, list an array's
//! storage groups, fetch one storage group's metric series. Each call
//! decodes to a [`Reply`]: either the expected payload or the advisory
//! `message` Unisphere sends instead (unlicensed array, remote array, no
//! arrays found, ...). What an advisory means is decided by the pipeline.

use crate::config::ReporterConfig;
use crate::error::{ReporterError, Result};
use crate::window::TimeWindow;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Metric collected by every run.
pub const SRDFA_MB_SENT: &str = "SRDFA_MBSent";

/// One performance sample as returned by Unisphere.
pub type Sample = serde_json::Map<String, Value>;

/// Outcome of a call that reached Unisphere and decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// Expected payload
    Data(T),
    /// Advisory message returned in place of data
    Advisory(String),
}

impl<T> Reply<T> {
    /// Map the payload, keeping advisories as-is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Data(data) => Reply::Data(f(data)),
            Reply::Advisory(message) => Reply::Advisory(message),
        }
    }
}

/// Request body of the storage group metrics call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricQuery {
    pub start_date: String,
    pub end_date: String,
    pub symmetrix_id: String,
    pub storage_group_id: String,
    pub metrics: Vec<String>,
}

impl MetricQuery {
    /// Query for [`SRDFA_MB_SENT`] over `window`.
    pub fn new(window: &TimeWindow, array_id: &str, storage_group_id: &str) -> Self {
        Self {
            start_date: window.start_millis().to_string(),
            end_date: window.end_millis().to_string(),
            symmetrix_id: array_id.to_string(),
            storage_group_id: storage_group_id.to_string(),
            metrics: vec![SRDFA_MB_SENT.to_string()],
        }
    }
}

/// Remote calls made by a collection run.
pub trait MetricsApi {
    /// List the arrays managed by this Unisphere instance.
    fn list_arrays(&self) -> Result<Reply<Vec<String>>>;

    /// List the storage groups of one array.
    fn list_storage_groups(&self, array_id: &str) -> Result<Reply<Vec<String>>>;

    /// Fetch the [`SRDFA_MB_SENT`] series of one storage group.
    fn fetch_metric(
        &self,
        window: &TimeWindow,
        array_id: &str,
        storage_group_id: &str,
    ) -> Result<Reply<Vec<Sample>>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Advisory { message: String },
    Data(T),
}

#[derive(Deserialize)]
struct SymmetrixList {
    #[serde(rename = "symmetrixId")]
    symmetrix_id: Vec<String>,
}

#[derive(Deserialize)]
struct StorageGroupList {
    #[serde(rename = "storageGroupId")]
    storage_group_id: Vec<String>,
}

#[derive(Deserialize)]
struct MetricResult {
    #[serde(rename = "resultList")]
    result_list: ResultList,
}

#[derive(Deserialize)]
struct ResultList {
    result: Vec<Sample>,
}

/// Blocking Unisphere client.
///
/// Certificate verification is off: Unisphere ships with self-signed
/// certificates. Every request is attempted exactly once.
pub struct UnisphereClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl UnisphereClient {
    /// Create a client from the run configuration
    pub fn new(config: &ReporterConfig) -> Result<Self> {
        let http = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// REST API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, url: &str) -> Result<(StatusCode, Vec<u8>)> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        Ok((status, response.bytes()?.to_vec()))
    }

    fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<(StatusCode, Vec<u8>)> {
        debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(body)
            .send()?;

        let status = response.status();
        Ok((status, response.bytes()?.to_vec()))
    }
}

impl MetricsApi for UnisphereClient {
    /// A body that is not JSON at all is reported as a login failure: this
    /// is the first call of a run and Unisphere answers bad credentials with
    /// an HTML page.
    fn list_arrays(&self) -> Result<Reply<Vec<String>>> {
        let url = self.url("/provisioning/symmetrix");
        let (status, body) = self.get(&url)?;

        let value: Value = serde_json::from_slice(&body).map_err(|_| ReporterError::LoginFailed {
            status: status.as_u16(),
        })?;
        let reply: Reply<SymmetrixList> = decode(&url, value)?;
        Ok(reply.map(|list| list.symmetrix_id))
    }

    fn list_storage_groups(&self, array_id: &str) -> Result<Reply<Vec<String>>> {
        let url = self.url(&format!("/provisioning/symmetrix/{array_id}/storagegroup"));
        let (_, body) = self.get(&url)?;

        let reply: Reply<StorageGroupList> = decode(&url, parse_json(&url, &body)?)?;
        Ok(reply.map(|list| list.storage_group_id))
    }

    fn fetch_metric(
        &self,
        window: &TimeWindow,
        array_id: &str,
        storage_group_id: &str,
    ) -> Result<Reply<Vec<Sample>>> {
        let url = self.url("/performance/StorageGroup/metrics");
        let query = MetricQuery::new(window, array_id, storage_group_id);
        let (_, body) = self.post(&url, &query)?;

        let reply: Reply<MetricResult> = decode(&url, parse_json(&url, &body)?)?;
        Ok(reply.map(|metrics| metrics.result_list.result))
    }
}

/// Parse a response body as JSON, whatever the status.
///
/// Unisphere reports most failures as a JSON `message` with a 4xx status,
/// so the status code is not checked.
fn parse_json(url: &str, body: &[u8]) -> Result<Value> {
    serde_json::from_slice(body).map_err(|source| ReporterError::MalformedResponse {
        endpoint: url.to_string(),
        source,
    })
}

/// Split a JSON body into payload or advisory.
fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<Reply<T>> {
    let envelope: Envelope<T> =
        serde_json::from_value(value).map_err(|source| ReporterError::MalformedResponse {
            endpoint: url.to_string(),
            source,
        })?;

    Ok(match envelope {
        Envelope::Advisory { message } => Reply::Advisory(message),
        Envelope::Data(data) => Reply::Data(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use httpmock::{
        Method::{GET, POST},
        MockServer,
    };
    use serde_json::json;

    fn client_for(server: &MockServer) -> UnisphereClient {
        let config = ReporterConfig::with_base_url(server.url("/univmax/restapi"), "smc", "smc");
        UnisphereClient::new(&config).unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow::compute(&Utc.with_ymd_and_hms(2024, 3, 15, 6, 0, 0).unwrap())
    }

    #[test]
    fn test_list_arrays() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/univmax/restapi/provisioning/symmetrix")
                .header("authorization", "Basic c21jOnNtYw==");
            then.status(200)
                .json_body(json!({ "symmetrixId": ["000197900123", "000197900456"] }));
        });

        let arrays = client_for(&server).list_arrays().unwrap();
        assert_eq!(
            arrays,
            Reply::Data(vec!["000197900123".to_string(), "000197900456".to_string()])
        );
        mock.assert();
    }

    #[test]
    fn test_list_arrays_advisory() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/univmax/restapi/provisioning/symmetrix");
            then.status(200)
                .json_body(json!({ "message": "No Symmetrix's found" }));
        });

        let arrays = client_for(&server).list_arrays().unwrap();
        assert_eq!(arrays, Reply::Advisory("No Symmetrix's found".to_string()));
    }

    #[test]
    fn test_advisory_on_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/univmax/restapi/provisioning/symmetrix/000197900123/storagegroup");
            then.status(404)
                .json_body(json!({ "message": "Symmetrix 000197900123 is not local" }));
        });

        let groups = client_for(&server)
            .list_storage_groups("000197900123")
            .unwrap();
        assert_eq!(
            groups,
            Reply::Advisory("Symmetrix 000197900123 is not local".to_string())
        );
    }

    #[test]
    fn test_login_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/univmax/restapi/provisioning/symmetrix");
            then.status(401).body("<html>Unauthorized</html>");
        });

        let result = client_for(&server).list_arrays();
        assert!(matches!(
            result,
            Err(ReporterError::LoginFailed { status: 401 })
        ));
    }

    #[test]
    fn test_non_json_array_listing_is_login_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/univmax/restapi/provisioning/symmetrix");
            then.status(200).body("<html>Sign in</html>");
        });

        let result = client_for(&server).list_arrays();
        assert!(matches!(
            result,
            Err(ReporterError::LoginFailed { status: 200 })
        ));
    }

    #[test]
    fn test_non_json_group_listing_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/univmax/restapi/provisioning/symmetrix/000197900123/storagegroup");
            then.status(401).body("<html>Unauthorized</html>");
        });

        let result = client_for(&server).list_storage_groups("000197900123");
        assert!(matches!(
            result,
            Err(ReporterError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_metric_server_error_is_malformed() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/univmax/restapi/performance/StorageGroup/metrics");
            then.status(500).body("<html>Internal Server Error</html>");
        });

        let result = client_for(&server).fetch_metric(&window(), "000197900123", "SG_PROD");
        mock.assert();
        match result {
            Err(ReporterError::MalformedResponse { endpoint, .. }) => {
                assert!(endpoint.ends_with("/performance/StorageGroup/metrics"));
            }
            other => panic!("expected a malformed response, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/univmax/restapi/provisioning/symmetrix");
            then.status(200).json_body(json!({ "symmetrix": [] }));
        });

        let result = client_for(&server).list_arrays();
        assert!(matches!(
            result,
            Err(ReporterError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_unreachable_host() {
        let config = ReporterConfig::with_base_url("http://127.0.0.1:1/univmax/restapi", "u", "p");
        let client = UnisphereClient::new(&config).unwrap();
        assert!(matches!(
            client.list_arrays(),
            Err(ReporterError::Transport(_))
        ));
    }

    #[test]
    fn test_fetch_metric_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/univmax/restapi/performance/StorageGroup/metrics")
                .header("content-type", "application/json")
                .header("accept", "application/json")
                .json_body(json!({
                    "startDate": "1710374400000",
                    "endDate": "1710460800000",
                    "symmetrixId": "000197900123",
                    "storageGroupId": "SG_PROD",
                    "metrics": ["SRDFA_MBSent"]
                }));
            then.status(200).json_body(json!({
                "resultList": {
                    "result": [
                        { "SRDFA_MBSent": 12.5, "timestamp": 1710374700000u64 },
                        { "SRDFA_MBSent": 7.5, "timestamp": 1710375000000u64 }
                    ]
                }
            }));
        });

        let reply = client_for(&server)
            .fetch_metric(&window(), "000197900123", "SG_PROD")
            .unwrap();
        mock.assert();

        match reply {
            Reply::Data(samples) => {
                assert_eq!(samples.len(), 2);
                assert_eq!(samples[0][SRDFA_MB_SENT], json!(12.5));
            }
            Reply::Advisory(message) => panic!("unexpected advisory: {message}"),
        }
    }

    #[test]
    fn test_metric_query_serialization() {
        let query = MetricQuery::new(&window(), "A1", "SG1");
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            json!({
                "startDate": "1710374400000",
                "endDate": "1710460800000",
                "symmetrixId": "A1",
                "storageGroupId": "SG1",
                "metrics": ["SRDFA_MBSent"]
            })
        );
    }

    #[test]
    fn test_reply_map() {
        let reply: Reply<u32> = Reply::Data(2);
        assert_eq!(reply.map(|v| v * 2), Reply::Data(4));

        let advisory: Reply<u32> = Reply::Advisory("nope".into());
        assert_eq!(advisory.map(|v| v * 2), Reply::Advisory("nope".into()));
    }
}
