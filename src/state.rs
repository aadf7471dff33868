use crate::models::{ConsolidatedSummary, SourceData};
use crate::summary::consolidate;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::RwLock;

/// One fetched dataset plus everything derived from it.
#[derive(Debug)]
pub struct Snapshot {
    pub data: SourceData,
    pub summary: Option<ConsolidatedSummary>,
    pub fetched_at: DateTime<Local>,
}

impl Snapshot {
    pub fn new(data: SourceData, fetched_at: DateTime<Local>) -> Self {
        let summary = consolidate(data.teacher_totals(), data.student_totals());
        Self {
            data,
            summary,
            fetched_at,
        }
    }
}

#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(Arc<Snapshot>),
    Failed(String),
}

impl LoadState {
    pub fn label(&self) -> &'static str {
        match self {
            LoadState::Loading => "loading",
            LoadState::Ready(_) => "ready",
            LoadState::Failed(_) => "failed",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub title: Arc<str>,
    pub load: Arc<RwLock<LoadState>>,
}

impl AppState {
    pub fn new(title: impl Into<Arc<str>>) -> Self {
        Self {
            title: title.into(),
            load: Arc::new(RwLock::new(LoadState::Loading)),
        }
    }

    pub fn with_snapshot(title: impl Into<Arc<str>>, snapshot: Snapshot) -> Self {
        Self {
            title: title.into(),
            load: Arc::new(RwLock::new(LoadState::Ready(Arc::new(snapshot)))),
        }
    }

    pub async fn current(&self) -> LoadState {
        self.load.read().await.clone()
    }

    pub async fn set(&self, next: LoadState) {
        *self.load.write().await = next;
    }
}
