use crate::errors::LoadError;
use crate::models::{SUCCESS_STATUS, SourceData, SourcePayload};
use crate::state::{AppState, LoadState, Snapshot};
use chrono::Local;
use reqwest::Client;
use std::sync::Arc;
use tracing::{error, info};

/// Validates the upstream envelope and returns its tables.
pub fn parse_payload(bytes: &[u8]) -> Result<SourceData, LoadError> {
    let payload: SourcePayload = serde_json::from_slice(bytes)?;
    if payload.status != SUCCESS_STATUS {
        return Err(LoadError::Rejected(payload.status));
    }
    payload.data.ok_or(LoadError::MissingData)
}

pub async fn fetch_source(client: &Client, url: &str) -> Result<SourceData, LoadError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status(status));
    }

    let bytes = response.bytes().await?;
    parse_payload(&bytes)
}

/// Performs the single fetch. Failure is terminal; there is no retry.
pub async fn load_snapshot(client: &Client, url: &str) -> LoadState {
    match fetch_source(client, url).await {
        Ok(data) => {
            info!(
                teachers = data.tabela_professores.len(),
                students = data.tabela_alunos.len(),
                "dashboard data loaded"
            );
            if data.teacher_totals().is_none() || data.student_totals().is_none() {
                error!("source data is missing a Total row");
            }
            LoadState::Ready(Arc::new(Snapshot::new(data, Local::now())))
        }
        Err(err) => {
            error!("failed to load dashboard data: {err}");
            LoadState::Failed(err.to_string())
        }
    }
}

pub fn spawn_initial_load(state: AppState, url: String) {
    tokio::spawn(async move {
        info!("fetching dashboard data from {url}");
        let client = Client::new();
        let next = load_snapshot(&client, &url).await;
        state.set(next).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_payload_yields_tables() {
        let body = br#"{"status":"sucesso","data":{"tabela_professores":[{"":"Total"}],"tabela_alunos":[]}}"#;
        let data = parse_payload(body).expect("parsed");
        assert_eq!(data.tabela_professores.len(), 1);
        assert!(data.tabela_alunos.is_empty());
    }

    #[test]
    fn other_status_marker_is_rejected() {
        let body = br#"{"status":"erro","data":{"tabela_professores":[],"tabela_alunos":[]}}"#;
        match parse_payload(body) {
            Err(LoadError::Rejected(status)) => assert_eq!(status, "erro"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn success_without_data_is_an_error() {
        assert!(matches!(
            parse_payload(br#"{"status":"sucesso"}"#),
            Err(LoadError::MissingData)
        ));
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        assert!(matches!(parse_payload(b"<html>"), Err(LoadError::Decode(_))));
    }
}
