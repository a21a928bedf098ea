// KW Planner
// Copyright (C) 2025 KW Planner contributors

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! End-to-end tests driving a real server with a scripted engine.

use anyhow::{Result, bail};
use kwplanner_api::config::Config;
use kwplanner_api::server::ApiServer;
use kwplanner_core::{Engine, EngineFactory, Session};
use serde_json::{Value, json};
use std::fmt::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy)]
enum Behavior {
    /// Read two answers and echo them into the output.
    EchoAnswers,
    /// Produce partial output and one export, then fail.
    FailMidway,
    /// Block past the configured invocation timeout.
    Hang,
}

struct ScriptedEngine {
    behavior: Behavior,
}

impl ScriptedEngine {
    fn run(&mut self, session: &mut Session) -> Result<()> {
        writeln!(session, "engine started")?;
        match self.behavior {
            Behavior::EchoAnswers => {
                let first = session.read_answer("first? ");
                let second = session.read_answer("second? ");
                writeln!(session, "first answer: '{first}'")?;
                writeln!(session, "second answer: '{second}'")?;
                Ok(())
            }
            Behavior::FailMidway => {
                writeln!(session, "partial progress")?;
                session.record_export("partial_export", vec![json!({"row": 1})]);
                bail!("engine exploded")
            }
            Behavior::Hang => {
                std::thread::sleep(std::time::Duration::from_secs(10));
                Ok(())
            }
        }
    }
}

macro_rules! delegate {
    ($($method:ident),+) => {
        $(fn $method(&mut self, session: &mut Session) -> Result<()> {
            self.run(session)
        })+
    };
}

impl Engine for ScriptedEngine {
    delegate!(
        run_site_analysis,
        run_niche_analysis,
        run_url_analysis,
        run_keyword_variations,
        run_theme_analysis,
        run_content_pruning,
        show_learning_dashboard,
        export_learning_data
    );
}

/// Factory whose engine can never be constructed.
struct BrokenFactory;

impl EngineFactory for BrokenFactory {
    fn create(&self) -> Result<Box<dyn Engine + Send>> {
        bail!("analysis engine is not installed")
    }
}

struct ScriptedFactory {
    behavior: Behavior,
    created: AtomicUsize,
}

impl ScriptedFactory {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            created: AtomicUsize::new(0),
        })
    }
}

impl EngineFactory for ScriptedFactory {
    fn create(&self) -> Result<Box<dyn Engine + Send>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedEngine { behavior: self.behavior }))
    }
}

async fn start_server(factory: Arc<dyn EngineFactory>) -> (SocketAddr, tempfile::TempDir) {
    start_server_with(factory, 5, vec!["*".to_string()]).await
}

async fn start_server_with_timeout(
    factory: Arc<dyn EngineFactory>,
    analysis_timeout_secs: u64,
) -> (SocketAddr, tempfile::TempDir) {
    start_server_with(factory, analysis_timeout_secs, vec!["*".to_string()]).await
}

async fn start_server_with(
    factory: Arc<dyn EngineFactory>,
    analysis_timeout_secs: u64,
    cors_origins: Vec<String>,
) -> (SocketAddr, tempfile::TempDir) {
    let data_dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        bind_address: "127.0.0.1:0".to_string(),
        data_dir: data_dir.path().to_path_buf(),
        analysis_timeout_secs,
        max_body_bytes: 1024,
        cors_enabled: true,
        cors_origins,
    };
    let server = ApiServer::new(config, factory).await.expect("server");
    let addr = server.bind_address();
    tokio::spawn(server.run());
    (addr, data_dir)
}

async fn post_analyze(addr: SocketAddr, body: Value) -> (u16, Value) {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("http://{addr}/api/v1/analyze"))
        .json(&body)
        .send()
        .await
        .expect("request");
    let status = response.status().as_u16();
    let body: Value = response.json().await.expect("json body");
    (status, body)
}

#[tokio::test]
async fn health_probe_answers_with_cors_headers() {
    let factory = ScriptedFactory::new(Behavior::EchoAnswers);
    let (addr, _dir) = start_server(factory).await;

    let response = reqwest::get(format!("http://{addr}/api/v1/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "KW Planner API");
}

#[tokio::test]
async fn analyze_returns_captured_output() {
    let factory = ScriptedFactory::new(Behavior::EchoAnswers);
    let (addr, _dir) = start_server(factory.clone()).await;

    let (status, body) = post_analyze(
        addr,
        json!({"option": 1, "params": {"domain_url": "example.com", "include_subdomains": true}}),
    )
    .await;

    assert_eq!(status, 200);
    assert!(body["output"].as_str().unwrap().contains("first answer: 'https://example.com'"));
    assert!(body["output"].as_str().unwrap().contains("second answer: 's'"));
    assert!(body["error"].is_null());
    assert_eq!(factory.created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_parameter_is_rejected_before_any_invocation() {
    let factory = ScriptedFactory::new(Behavior::EchoAnswers);
    let (addr, _dir) = start_server(factory.clone()).await;

    let (status, body) = post_analyze(addr, json!({"option": 2, "params": {}})).await;

    assert_eq!(status, 400);
    assert!(body["detail"].as_str().unwrap().contains("niche is required"));
    assert_eq!(factory.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn out_of_range_selector_is_rejected() {
    let factory = ScriptedFactory::new(Behavior::EchoAnswers);
    let (addr, _dir) = start_server(factory.clone()).await;

    let (status, body) = post_analyze(addr, json!({"option": 9})).await;

    assert_eq!(status, 400);
    assert!(body["detail"].as_str().unwrap().contains("between 1 and 8"));
    assert_eq!(factory.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn engine_failure_keeps_partial_output_and_exports() {
    let factory = ScriptedFactory::new(Behavior::FailMidway);
    let (addr, _dir) = start_server(factory).await;

    let (status, body) = post_analyze(addr, json!({"option": 7})).await;

    // Invocation-level errors are reported with HTTP success so the
    // caller can still read what was produced.
    assert_eq!(status, 200);
    assert!(body["output"].as_str().unwrap().contains("partial progress"));
    assert_eq!(body["exports"].as_array().unwrap().len(), 1);
    assert_eq!(body["exports"][0]["name"], "partial_export");
    assert_eq!(body["error"], "engine exploded");
}

#[tokio::test]
async fn short_answer_queue_defaults_to_empty_answers() {
    let factory = ScriptedFactory::new(Behavior::EchoAnswers);
    let (addr, _dir) = start_server(factory).await;

    // Operation 2 queues a single answer; the engine reads two.
    let (status, body) = post_analyze(addr, json!({"option": 2, "params": {"niche": "fitness"}})).await;

    assert_eq!(status, 200);
    assert!(body["output"].as_str().unwrap().contains("first answer: 'fitness'"));
    assert!(body["output"].as_str().unwrap().contains("second answer: ''"));
}

#[tokio::test]
async fn sequential_requests_are_isolated() {
    let factory = ScriptedFactory::new(Behavior::EchoAnswers);
    let (addr, _dir) = start_server(factory.clone()).await;

    let (_, first) = post_analyze(addr, json!({"option": 4, "params": {"keyword": "espresso"}})).await;
    let (_, second) = post_analyze(addr, json!({"option": 7})).await;

    assert!(first["output"].as_str().unwrap().contains("espresso"));
    // The second invocation must not observe the first one's answers
    // or output.
    assert!(!second["output"].as_str().unwrap().contains("espresso"));
    assert!(second["output"].as_str().unwrap().contains("second answer: ''"));
    assert_eq!(factory.created.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn timed_out_invocation_is_an_invocation_error() {
    let factory = ScriptedFactory::new(Behavior::Hang);
    let (addr, _dir) = start_server_with_timeout(factory, 1).await;

    let (status, body) = post_analyze(addr, json!({"option": 7})).await;

    assert_eq!(status, 200);
    assert_eq!(body["error"], "analysis timed out after 1s");
    assert!(body["exports"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn engine_construction_failure_is_a_server_fault() {
    let (addr, _dir) = start_server(Arc::new(BrokenFactory)).await;

    let (status, body) = post_analyze(addr, json!({"option": 7})).await;

    assert_eq!(status, 500);
    assert_eq!(body["title"], "Internal Server Error");
    assert!(body["detail"].as_str().unwrap().contains("failed to load analysis engine"));
    assert!(body["type"].as_str().unwrap().ends_with("internal_server_error"));
}

#[tokio::test]
async fn oversized_body_is_rejected_before_parsing() {
    let factory = ScriptedFactory::new(Behavior::EchoAnswers);
    let (addr, _dir) = start_server(factory.clone()).await;

    // Valid JSON, but well past the 1 KiB cap the server was given.
    let padding = "x".repeat(4 * 1024);
    let (status, body) = post_analyze(addr, json!({"option": 2, "params": {"niche": padding}})).await;

    assert_eq!(status, 413);
    assert_eq!(body["title"], "Payload Too Large");
    assert!(body["detail"].as_str().unwrap().contains("1024 byte limit"));
    assert_eq!(factory.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cors_echoes_only_listed_origins() {
    let factory = ScriptedFactory::new(Behavior::EchoAnswers);
    let (addr, _dir) = start_server_with(
        factory,
        5,
        vec!["https://app.example.com".to_string(), "https://admin.example.com".to_string()],
    )
    .await;

    let client = reqwest::Client::new();
    let allowed = client
        .get(format!("http://{addr}/api/v1/health"))
        .header("origin", "https://admin.example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        allowed.headers().get("access-control-allow-origin").unwrap(),
        "https://admin.example.com"
    );

    let denied = client
        .get(format!("http://{addr}/api/v1/health"))
        .header("origin", "https://evil.example.net")
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), 200);
    assert!(denied.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn malformed_json_is_a_client_fault() {
    let factory = ScriptedFactory::new(Behavior::EchoAnswers);
    let (addr, _dir) = start_server(factory.clone()).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/api/v1/analyze"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert_eq!(factory.created.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let factory = ScriptedFactory::new(Behavior::EchoAnswers);
    let (addr, _dir) = start_server(factory).await;

    let response = reqwest::get(format!("http://{addr}/api/v1/nope")).await.unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Not Found");
}
