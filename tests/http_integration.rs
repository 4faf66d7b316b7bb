//! Integration tests for discovery against mocked GCP endpoints
//!
//! These tests drive the real GcpClient through wiremock, covering
//! pagination, expected absence, and the degrade-to-empty error policy.

use serde_json::json;
use sinkscout::discovery::Discovery;
use sinkscout::gcp::auth::GcpCredentials;
use sinkscout::gcp::client::{GcpClient, GcpEndpoints};
use wiremock::matchers::{bearer_token, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORG_ID: &str = "123456789012";
const SINKS_PATH: &str = "/v2/organizations/123456789012/sinks";

fn client_for(server: &MockServer) -> GcpClient {
    GcpClient::with_parts(
        GcpCredentials::from_static_token("test-token"),
        GcpEndpoints::single(&server.uri()),
        None,
    )
    .expect("client should build")
}

fn audit_sink_json() -> serde_json::Value {
    json!({
        "name": "org-audit",
        "destination": "bigquery.googleapis.com/projects/acme/datasets/audit_logs",
        "filter": "protoPayload.serviceName=cloudaudit.googleapis.com",
        "includeChildren": true,
        "writerIdentity": "serviceAccount:o123@gcp-sa-logging.iam.gserviceaccount.com"
    })
}

fn error_body(code: u16, message: &str) -> serde_json::Value {
    json!({"error": {"code": code, "message": message}})
}

mod organization_tests {
    use super::*;

    /// Organization search follows nextPageToken and extracts numeric ids
    #[tokio::test]
    async fn test_search_organizations_paginates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/organizations:search"))
            .and(query_param("pageToken", "page-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organizations": [
                    {"name": "organizations/222", "displayName": "beta.example", "state": "ACTIVE"}
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v3/organizations:search"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organizations": [
                    {"name": "organizations/111", "displayName": "acme.example", "state": "ACTIVE"}
                ],
                "nextPageToken": "page-2"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let orgs = Discovery::new(client_for(&server)).organizations().await;

        let ids: Vec<&str> = orgs.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["111", "222"]);
        assert_eq!(orgs[1].display_name, "beta.example");
    }

    /// Missing permission degrades to an empty list
    #[tokio::test]
    async fn test_search_organizations_forbidden_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/organizations:search"))
            .respond_with(ResponseTemplate::new(403).set_body_json(error_body(403, "Permission denied")))
            .mount(&server)
            .await;

        assert!(Discovery::new(client_for(&server)).organizations().await.is_empty());
    }
}

mod sink_tests {
    use super::*;

    /// Pages are concatenated in listing order
    #[tokio::test]
    async fn test_org_sinks_concatenates_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SINKS_PATH))
            .and(query_param("pageToken", "next"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sinks": [{
                    "name": "_Default",
                    "destination": "logging.googleapis.com/projects/acme/locations/global/buckets/_Default"
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(SINKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sinks": [audit_sink_json()],
                "nextPageToken": "next"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let sinks = Discovery::new(client_for(&server)).org_sinks(ORG_ID).await;

        assert_eq!(sinks.len(), 2);
        assert_eq!(sinks[0].name, "org-audit");
        assert_eq!(sinks[0].bq_project_id.as_deref(), Some("acme"));
        assert_eq!(sinks[0].bq_dataset_id.as_deref(), Some("audit_logs"));
        assert_eq!(sinks[1].name, "_Default");
        assert_eq!(sinks[1].bq_project_id, None);
    }

    /// An organization without sinks returns an empty list, not an error
    #[tokio::test]
    async fn test_org_without_sinks_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SINKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        assert!(Discovery::new(client_for(&server)).org_sinks(ORG_ID).await.is_empty());
    }

    /// Listing failure degrades to an empty list
    #[tokio::test]
    async fn test_org_sinks_forbidden_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SINKS_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(error_body(403, "Permission denied")))
            .mount(&server)
            .await;

        assert!(Discovery::new(client_for(&server)).org_sinks(ORG_ID).await.is_empty());
    }

    /// Audit sinks are enriched with the dataset's metadata
    #[tokio::test]
    async fn test_audit_sinks_enriched_with_dataset() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SINKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sinks": [
                    audit_sink_json(),
                    {
                        "name": "gce-to-pubsub",
                        "destination": "pubsub.googleapis.com/projects/acme/topics/x",
                        "filter": "logName:cloudaudit"
                    }
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/bigquery/v2/projects/acme/datasets/audit_logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "acme:audit_logs",
                "location": "europe-west1",
                "creationTime": "1700000000000"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sinks = Discovery::new(client_for(&server)).audit_sinks(ORG_ID).await;

        assert_eq!(sinks.len(), 1);
        let info = sinks[0].dataset_metadata.as_ref().expect("metadata attached");
        assert_eq!(info.location.as_deref(), Some("europe-west1"));
        assert_eq!(info.project_id, "acme");
        assert_eq!(info.dataset_id, "audit_logs");
    }
}

mod dataset_tests {
    use super::*;

    /// An existing dataset echoes the requested ids
    #[tokio::test]
    async fn test_dataset_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/bigquery/v2/projects/acme/datasets/audit_logs"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "acme:audit_logs",
                "location": "US",
                "labels": {"env": "prod"}
            })))
            .mount(&server)
            .await;

        let info = Discovery::new(client_for(&server))
            .dataset_info("acme", "audit_logs")
            .await
            .expect("dataset should be found");

        assert_eq!(info.project_id, "acme");
        assert_eq!(info.dataset_id, "audit_logs");
        assert_eq!(info.location.as_deref(), Some("US"));
        assert_eq!(info.labels.get("env").map(String::as_str), Some("prod"));
    }

    /// 404 is expected absence
    #[tokio::test]
    async fn test_dataset_not_found_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/bigquery/v2/projects/acme/datasets/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(error_body(404, "Not found: Dataset acme:missing")),
            )
            .mount(&server)
            .await;

        assert!(Discovery::new(client_for(&server))
            .dataset_info("acme", "missing")
            .await
            .is_none());
    }

    /// Any other failure is also absent
    #[tokio::test]
    async fn test_dataset_server_error_is_absent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/bigquery/v2/projects/acme/datasets/audit_logs"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
            .expect(1)
            .mount(&server)
            .await;

        assert!(Discovery::new(client_for(&server))
            .dataset_info("acme", "audit_logs")
            .await
            .is_none());
    }

    /// The quota project header is sent when configured
    #[tokio::test]
    async fn test_quota_project_header() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/bigquery/v2/projects/acme/datasets/audit_logs"))
            .and(header("x-goog-user-project", "billing-project"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"location": "US"})))
            .mount(&server)
            .await;

        let client = GcpClient::with_parts(
            GcpCredentials::from_static_token("test-token"),
            GcpEndpoints::single(&server.uri()),
            Some("billing-project".to_string()),
        )
        .unwrap();

        assert!(Discovery::new(client)
            .dataset_info("acme", "audit_logs")
            .await
            .is_some());
    }
}

mod quota_project_tests {
    use super::*;

    /// Without a configured quota project no billing header is sent
    #[tokio::test]
    async fn test_no_quota_project_header_by_default() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/bigquery/v2/projects/acme/datasets/audit_logs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"location": "US"})))
            .expect(1)
            .mount(&server)
            .await;

        assert!(Discovery::new(client_for(&server))
            .dataset_info("acme", "audit_logs")
            .await
            .is_some());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("x-goog-user-project").is_none());
    }
}

mod command_tests {
    use super::*;
    use clap::Parser;
    use sinkscout::cli::{execute, Cli};
    use sinkscout::config::Config;
    use std::io::{self, Cursor};

    /// `sinks --audit-only` with one sink prints the tree and the tfvars snippet
    #[tokio::test]
    async fn test_audit_sinks_command_prints_tfvars() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(SINKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sinks": [audit_sink_json()]})))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/bigquery/v2/projects/acme/datasets/audit_logs"))
            .respond_with(ResponseTemplate::new(404).set_body_json(error_body(404, "Not found")))
            .mount(&server)
            .await;

        let cli = Cli::try_parse_from(["sinkscout", "sinks", "--org-id", ORG_ID, "--audit-only"]).unwrap();
        let discovery = Discovery::new(client_for(&server));
        let mut config = Config::default();
        let mut out = Vec::new();

        let code = execute(&cli, &discovery, &mut config, Cursor::new(""), &mut out, io::sink())
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(code, 0);
        assert!(out.contains("org-audit"));
        assert!(out.contains("dataset_name = \"audit_logs\""));
        assert!(out.contains("location     = \"us-east4\""));
        assert!(out.contains("UNVERIFIED"));
        assert_eq!(config.org_id.as_deref(), Some(ORG_ID));
    }

    /// `--output json` emits the raw records
    #[tokio::test]
    async fn test_orgs_command_json_output() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/organizations:search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organizations": [
                    {"name": "organizations/111", "displayName": "acme.example", "state": "ACTIVE"}
                ]
            })))
            .mount(&server)
            .await;

        let cli = Cli::try_parse_from(["sinkscout", "orgs", "--output", "json"]).unwrap();
        let discovery = Discovery::new(client_for(&server));
        let mut config = Config::default();
        let mut out = Vec::new();

        execute(&cli, &discovery, &mut config, Cursor::new(""), &mut out, io::sink())
            .await
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["id"], "111");
        assert_eq!(parsed[0]["state"], "ACTIVE");
        assert_eq!(parsed[0]["full_name"], "organizations/111");
    }

    /// `sinks` without any org id fails with a usage code on the error stream
    #[tokio::test]
    async fn test_sinks_without_org_id() {
        let server = MockServer::start().await;

        let cli = Cli::try_parse_from(["sinkscout", "sinks"]).unwrap();
        let discovery = Discovery::new(client_for(&server));
        let mut config = Config::default();
        let mut out = Vec::new();
        let mut err = Vec::new();

        let code = execute(&cli, &discovery, &mut config, Cursor::new(""), &mut out, &mut err)
            .await
            .unwrap();

        assert_eq!(code, 2);
        assert!(out.is_empty());
        assert!(String::from_utf8(err).unwrap().contains("--org-id is required"));
    }
}
