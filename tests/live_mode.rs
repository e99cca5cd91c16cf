mod common;

use common::{TestEnv, SNAPSHOT_REL};
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

struct Reply {
    status: u16,
    content_range: Option<String>,
    body: String,
}

impl Reply {
    fn ok(body: Value) -> Self {
        Self {
            status: 200,
            content_range: None,
            body: body.to_string(),
        }
    }

    fn status(status: u16) -> Self {
        Self {
            status,
            content_range: None,
            body: "{\"message\":\"boom\"}".to_string(),
        }
    }
}

/// Minimal PostgREST stand-in. `handler` gets the request target (path and query);
/// requests whose headers lack the service key get a 401.
fn serve_registry<F>(requests: usize, handler: F) -> String
where
    F: Fn(&str) -> Reply + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub registry");
    let addr = listener.local_addr().expect("stub addr");
    thread::spawn(move || {
        for stream in listener.incoming().take(requests) {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap_or_default();
            let mut authorized = false;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                let lower = line.to_ascii_lowercase();
                if lower.starts_with("apikey:") && line.contains("service-key") {
                    authorized = true;
                }
            }
            let target = request_line.split_whitespace().nth(1).unwrap_or_default();
            let reply = if authorized {
                handler(target)
            } else {
                Reply::status(401)
            };
            let range = reply
                .content_range
                .map(|r| format!("Content-Range: {r}\r\n"))
                .unwrap_or_default();
            let _ = write!(
                stream,
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\n{range}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                reply.status,
                reply.body.len(),
                reply.body
            );
        }
    });
    format!("http://{addr}")
}

fn query_param(target: &str, name: &str) -> Option<usize> {
    let query = target.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == name)
        .and_then(|(_, v)| v.parse().ok())
}

fn healthy(target: &str) -> Reply {
    if target.starts_with("/rest/v1/kernel_concept_registry?") {
        Reply::ok(json!([
            {"concept_id": "CONCEPT_INVOICE", "is_active": true},
            {"concept_id": "CONCEPT_VENDOR", "is_active": true}
        ]))
    } else if target.starts_with("/rest/v1/kernel_value_set_registry?") {
        Reply::ok(json!([{"value_set_id": "VALUESET_GLOBAL_CURRENCY", "is_active": true}]))
    } else if target.starts_with("/rest/v1/kernel_value_set_values?") {
        Reply::ok(json!([
            {"value_set_id": "VALUESET_GLOBAL_CURRENCY", "value_code": "EUR", "is_active": true},
            {"value_set_id": "VALUESET_GLOBAL_CURRENCY", "value_code": "USD", "is_active": true}
        ]))
    } else {
        Reply::status(404)
    }
}

/// Serves `rows` for any table, at most `max_rows` per response, honouring `offset`.
fn capped_table(rows: Vec<Value>, max_rows: usize) -> impl Fn(&str) -> Reply + Send + 'static {
    move |target: &str| {
        let offset = query_param(target, "offset").unwrap_or(0);
        let limit = query_param(target, "limit").unwrap_or(usize::MAX).min(max_rows);
        let page: Vec<Value> = rows.iter().skip(offset).take(limit).cloned().collect();
        let content_range = if page.is_empty() {
            format!("*/{}", rows.len())
        } else {
            format!("{}-{}/{}", offset, offset + page.len() - 1, rows.len())
        };
        Reply {
            status: 200,
            content_range: Some(content_range),
            body: Value::Array(page).to_string(),
        }
    }
}

#[test]
fn live_export_writes_snapshot_from_registry() {
    let env = TestEnv::new();
    let url = serve_registry(3, healthy);

    env.cmd()
        .env("SUPABASE_URL", &url)
        .env("SUPABASE_SERVICE_ROLE_KEY", "service-key")
        .arg("export-snapshot")
        .assert()
        .success()
        .stdout(contains("exported 2 concepts, 1 value sets, 2 values"));

    let snap = env.read_json(SNAPSHOT_REL);
    assert_eq!(snap["concepts"], json!(["CONCEPT_INVOICE", "CONCEPT_VENDOR"]));
    assert_eq!(snap["valuesBySet"]["VALUESET_GLOBAL_CURRENCY"], json!(["EUR", "USD"]));
}

#[test]
fn live_export_pages_past_the_server_row_cap() {
    let env = TestEnv::new();
    let concepts = vec![
        json!({"concept_id": "CONCEPT_A", "is_active": true}),
        json!({"concept_id": "CONCEPT_B", "is_active": true}),
        json!({"concept_id": "CONCEPT_C", "is_active": true}),
    ];
    let concepts_table = capped_table(concepts, 2);
    let url = serve_registry(4, move |target: &str| {
        if target.starts_with("/rest/v1/kernel_concept_registry?") {
            concepts_table(target)
        } else {
            healthy(target)
        }
    });

    env.cmd()
        .env("SUPABASE_URL", &url)
        .env("SUPABASE_SERVICE_ROLE_KEY", "service-key")
        .arg("export-snapshot")
        .assert()
        .success()
        .stdout(contains("exported 3 concepts"));

    let snap = env.read_json(SNAPSHOT_REL);
    assert_eq!(snap["concepts"], json!(["CONCEPT_A", "CONCEPT_B", "CONCEPT_C"]));
}

#[test]
fn truncated_registry_response_fails_export() {
    let env = TestEnv::new();
    // Claims two rows but keeps answering with the first one, whatever the offset.
    let url = serve_registry(6, |_| Reply {
        status: 200,
        content_range: Some("0-0/2".to_string()),
        body: json!([{"concept_id": "CONCEPT_A", "is_active": true}]).to_string(),
    });

    env.cmd()
        .env("SUPABASE_URL", &url)
        .env("SUPABASE_SERVICE_ROLE_KEY", "service-key")
        .arg("export-snapshot")
        .assert()
        .code(2)
        .stdout(contains("exported").not())
        .stderr(contains("registry fetch failed for concepts"));
    assert!(!env.path(SNAPSHOT_REL).exists());
}

#[test]
fn live_check_compares_against_registry() {
    let env = TestEnv::new();
    env.write_source("src/a.ts", "CONCEPT_INVOICE VALUESET_GLOBAL_FAKE_XYZ\n");
    let url = serve_registry(3, healthy);

    let out = env
        .cmd()
        .env("SUPABASE_URL", &url)
        .env("SUPABASE_SERVICE_ROLE_KEY", "service-key")
        .args(["--json", "check-drift", "--live"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let out: Value = serde_json::from_slice(&out).expect("valid json output");
    assert_eq!(out["data"]["mode"], "live");
    assert_eq!(out["data"]["orphanValueSets"], json!(["VALUESET_GLOBAL_FAKE_XYZ"]));
}

#[test]
fn live_check_with_failing_collection_cannot_pass() {
    let env = TestEnv::new();
    env.write_source("src/a.ts", "CONCEPT_INVOICE\n");
    let failing_values = |target: &str| {
        if target.starts_with("/rest/v1/kernel_value_set_values?") {
            Reply::status(500)
        } else {
            healthy(target)
        }
    };

    let url = serve_registry(3, failing_values);
    let out = env
        .cmd()
        .env("SUPABASE_URL", &url)
        .env("SUPABASE_SERVICE_ROLE_KEY", "service-key")
        .args(["--json", "check-drift", "--live"])
        .assert()
        .code(2)
        .stdout(contains("no drift").not())
        .get_output()
        .stdout
        .clone();
    let out: Value = serde_json::from_slice(&out).expect("valid json output");
    assert_eq!(out["ok"], false);
    assert_eq!(out["error"]["kind"], "registry_fetch");
    assert_eq!(out["error"]["exitCode"], 2);

    let url = serve_registry(3, failing_values);
    env.cmd()
        .env("SUPABASE_URL", &url)
        .env("SUPABASE_SERVICE_ROLE_KEY", "service-key")
        .args(["check-drift", "--live"])
        .assert()
        .code(2)
        .stdout(contains("no drift").not())
        .stderr(contains("registry fetch failed for values"));
}

#[test]
fn failed_collection_fetch_aborts_without_touching_snapshot() {
    let env = TestEnv::new();
    env.write_snapshot(SNAPSHOT_REL, &common::fixture_snapshot());
    let before = std::fs::read_to_string(env.path(SNAPSHOT_REL)).unwrap();

    let url = serve_registry(3, |target: &str| {
        if target.starts_with("/rest/v1/kernel_value_set_values?") {
            Reply::status(500)
        } else {
            healthy(target)
        }
    });

    env.cmd()
        .env("SUPABASE_URL", &url)
        .env("SUPABASE_SERVICE_ROLE_KEY", "service-key")
        .arg("export-snapshot")
        .assert()
        .code(2)
        .stderr(contains("registry fetch failed for values"));

    let after = std::fs::read_to_string(env.path(SNAPSHOT_REL)).unwrap();
    assert_eq!(before, after);
}
