use crate::errors::AppError;
use crate::models::StatusResponse;
use crate::state::{AppState, LoadState, Snapshot};
use crate::summary::build_summary;
use crate::ui::{kpi_values, render_dashboard, render_error, render_loading};
use crate::view::{View, project};
use axum::{
    Json,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize, Default)]
pub struct ViewQuery {
    pub view: Option<String>,
}

impl ViewQuery {
    fn resolve(&self) -> Result<View, AppError> {
        match self.view.as_deref().map(str::trim) {
            None | Some("") => Ok(View::default()),
            Some(value) => Ok(value.parse()?),
        }
    }
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Html<String>, AppError> {
    let view = query.resolve()?;
    let page = match state.current().await {
        LoadState::Loading => render_loading(&state.title),
        LoadState::Failed(_) => render_error(&state.title),
        LoadState::Ready(snapshot) => {
            let projection = project(view, &snapshot.data, snapshot.summary.as_ref());
            render_dashboard(&state.title, &snapshot, &projection)
        }
    };
    Ok(Html(page))
}

pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let current = state.current().await;
    let (fetched_at, error) = match &current {
        LoadState::Ready(snapshot) => (Some(snapshot.fetched_at.to_rfc3339()), None),
        LoadState::Failed(reason) => (None, Some(reason.clone())),
        LoadState::Loading => (None, None),
    };

    Json(StatusResponse {
        state: current.label(),
        fetched_at,
        error,
    })
}

#[derive(Serialize)]
struct ViewResponse<'a> {
    #[serde(flatten)]
    projection: crate::view::Projection<'a>,
    kpis: crate::models::KpiValues,
}

pub async fn get_view(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Result<Response, AppError> {
    let view = query.resolve()?;
    let snapshot = ready_snapshot(&state).await?;

    let projection = project(view, &snapshot.data, snapshot.summary.as_ref());
    let kpis = kpi_values(&projection);
    Ok(Json(&ViewResponse { projection, kpis }).into_response())
}

pub async fn get_summary(State(state): State<AppState>) -> Result<Response, AppError> {
    let snapshot = ready_snapshot(&state).await?;
    let summary = build_summary(
        snapshot.data.teacher_totals(),
        snapshot.data.student_totals(),
        snapshot.summary,
    );
    Ok(Json(summary).into_response())
}

async fn ready_snapshot(state: &AppState) -> Result<Arc<Snapshot>, AppError> {
    match state.current().await {
        LoadState::Ready(snapshot) => Ok(snapshot),
        LoadState::Loading => Err(AppError::loading()),
        LoadState::Failed(reason) => Err(AppError::load_failed(&reason)),
    }
}
