use axum::{Json, Router, routing::get};
use chrono::Local;
use once_cell::sync::Lazy;
use payments_dashboard::{AppState, router, state::Snapshot};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct StatusResponse {
    state: String,
    fetched_at: Option<String>,
    error: Option<String>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(unix)]
mod cleanup {
    use std::sync::Mutex;
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PIDS: Mutex<Vec<i32>> = Mutex::new(Vec::new());

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for pid in pids.iter().copied().filter(|pid| *pid > 0) {
                unsafe {
                    libc::kill(pid, libc::SIGTERM);
                }
            }
        }
    }
}

fn success_payload() -> Value {
    json!({
        "status": "sucesso",
        "data": {
            "tabela_professores": [
                { "": "A", "Pagamentos confirmados": 100, "Faltante": 0, "Professores confirmados": 2, "Acompanhantes confirmados": 0 },
                { "": "Total", "Pagamentos confirmados": 100, "Faltante": 0, "Professores confirmados": 2, "Acompanhantes confirmados": 0 }
            ],
            "tabela_alunos": [
                { "": "Total", "Valor Pago": 50, "Valores Faltante": 10, "Alunos confirmados": 5, "Acompanhantes confirmados": 1 }
            ]
        }
    })
}

/// Spreadsheet endpoint stand-in, served from its own thread for the whole test binary.
static UPSTREAM: Lazy<String> = Lazy::new(|| {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind upstream");
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("upstream runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("upstream listener");
            let app = Router::new()
                .route("/ok", get(|| async { Json(success_payload()) }))
                .route("/rejected", get(|| async { Json(json!({ "status": "erro" })) }))
                .route(
                    "/broken",
                    get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "sheet unavailable") }),
                );
            axum::serve(listener, app).await.expect("upstream server");
        });
    });

    format!("http://{addr}")
});

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_loaded(base_url: &str) -> StatusResponse {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/status")).send().await {
            if let Ok(status) = resp.json::<StatusResponse>().await {
                if status.state != "loading" {
                    return status;
                }
            }
        }
        if Instant::now() > deadline {
            panic!("server did not finish loading");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(source_path: &str) -> (TestServer, StatusResponse) {
    spawn_server_with_source(&format!("{}{source_path}", *UPSTREAM)).await
}

async fn spawn_server_with_source(source_url: &str) -> (TestServer, StatusResponse) {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_payments_dashboard"))
        .env("PORT", port.to_string())
        .env("DASHBOARD_SOURCE_URL", source_url)
        .env("DASHBOARD_TITLE", "Painel de Teste")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    let status = wait_until_loaded(&base_url).await;

    (TestServer { base_url, child }, status)
}

#[tokio::test]
async fn http_dashboard_consolidates_upstream_tables() {
    let (server, status) = spawn_server("/ok").await;
    assert_eq!(status.state, "ready");
    assert!(status.fetched_at.is_some());
    let client = Client::new();

    let summary: Value = client
        .get(format!("{}/api/summary", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["summary"]["total_paid"], json!(150.0));
    assert_eq!(summary["summary"]["total_missing"], json!(10.0));
    assert_eq!(summary["summary"]["confirmed_base"], json!(7.0));
    assert_eq!(summary["summary"]["total_companions"], json!(1.0));
    assert_eq!(summary["summary"]["grand_total_people"], json!(8.0));
    assert_eq!(summary["teachers"]["paid"], json!(100.0));
    assert_eq!(summary["students"]["missing"], json!(10.0));

    let teachers: Value = client
        .get(format!("{}/api/view?view=teachers", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(teachers["view"], "teachers");
    assert_eq!(teachers["line_items"].as_array().map(Vec::len), Some(1));
    assert_eq!(teachers["keys"]["paid"], "Pagamentos confirmados");
    assert_eq!(teachers["kpis"]["paid"], "R$ 100,00");

    let consolidated: Value = client
        .get(format!("{}/api/view?view=consolidated", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(consolidated["line_items"].as_array().map(Vec::len), Some(0));
    assert_eq!(consolidated["kpis"]["paid"], "R$ 150,00");
    assert_eq!(consolidated["kpis"]["people_confirmed"], "7");

    let page = client
        .get(format!("{}/?view=total", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Painel de Teste"));
    assert!(page.contains("Resumo Consolidado Detalhado"));
    assert!(page.contains("R$ 150,00"));
}

#[tokio::test]
async fn http_rejected_upstream_is_terminal_failure() {
    let (server, status) = spawn_server("/rejected").await;
    assert_eq!(status.state, "failed");
    assert!(status.error.unwrap_or_default().contains("erro"));
    let client = Client::new();

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Erro ao carregar dados."));

    let response = client
        .get(format!("{}/api/summary", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn http_unknown_view_is_bad_request() {
    let (server, _) = spawn_server("/ok").await;
    let client = Client::new();

    for path in ["/?view=staff", "/api/view?view=staff"] {
        let response = client
            .get(format!("{}{path}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
    }
}

#[tokio::test]
async fn http_upstream_error_status_is_terminal_failure() {
    let (server, status) = spawn_server("/broken").await;
    assert_eq!(status.state, "failed");
    assert!(status.error.unwrap_or_default().contains("500"));

    let page = Client::new()
        .get(format!("{}/?view=students", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Erro ao carregar dados."));
}

#[tokio::test]
async fn http_unreachable_upstream_is_terminal_failure() {
    let closed_port = pick_free_port();
    let (server, status) =
        spawn_server_with_source(&format!("http://127.0.0.1:{closed_port}/exec")).await;
    assert_eq!(status.state, "failed");
    assert!(status.error.unwrap_or_default().contains("request failed"));

    let response = Client::new()
        .get(format!("{}/api/view?view=teachers", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

/// Serves the router in-process and returns its base URL.
async fn serve_in_process(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind in-process server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state)).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn http_loading_state_answers_503_and_refreshing_page() {
    let base_url = serve_in_process(AppState::new("Painel")).await;
    let client = Client::new();

    let status: StatusResponse = client
        .get(format!("{base_url}/api/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status.state, "loading");

    for path in ["/api/view", "/api/view?view=total", "/api/summary"] {
        let response = client.get(format!("{base_url}{path}")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{path}");
    }

    let response = client.get(format!("{base_url}/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = response.text().await.unwrap();
    assert!(page.contains(r#"http-equiv="refresh""#));
    assert!(page.contains("Sincronizando com Google Sheets..."));
}

#[tokio::test]
async fn http_ready_snapshot_projects_student_view() {
    let payload = success_payload();
    let data = serde_json::from_value(payload["data"].clone()).expect("source data");
    let state = AppState::with_snapshot("Painel", Snapshot::new(data, Local::now()));
    let base_url = serve_in_process(state).await;

    let students: Value = Client::new()
        .get(format!("{base_url}/api/view?view=alunos"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(students["view"], "students");
    assert_eq!(students["line_items"].as_array().map(Vec::len), Some(0));
    assert_eq!(students["kpis"]["paid"], "R$ 50,00");
    assert_eq!(students["kpis"]["missing"], "R$ 10,00");
    assert_eq!(students["kpis"]["companions"], "1");
}
