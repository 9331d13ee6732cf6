//! HTTP surface: router, shared state and handlers.

use crate::dashboard::DashboardView;
use crate::data::{DashboardFilter, Dataset};
use crate::nlp::ComplaintPhrase;
use crate::report::{ReportError, DECK_FILE_NAME, INSIGHTS_FILE_NAME};
use crate::stats::DashboardSummary;
use crate::web::page;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub top_phrases: usize,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, top_phrases: usize) -> Self {
        Self {
            dataset,
            top_phrases,
        }
    }

    fn view(&self, query: &FilterQuery) -> DashboardView {
        let top = query.limit.unwrap_or(self.top_phrases);
        DashboardView::compute(&self.dataset, query.filter(), top)
    }
}

/// `?platform=&category=&limit=`
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub platform: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

impl FilterQuery {
    pub fn filter(&self) -> DashboardFilter {
        DashboardFilter::from_query(self.platform.as_deref(), self.category.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardOptions {
    pub platforms: Vec<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Report(#[from] ReportError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/api/summary", get(summary))
        .route("/api/complaints", get(complaints))
        .route("/api/options", get(options))
        .route("/download/insights.txt", get(download_insights))
        .route("/download/report.pptx", get(download_deck))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn dashboard_page(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Html<String> {
    let view = state.view(&query);
    let options = dashboard_options(&state.dataset);
    Html(page::render_dashboard(&view, &options))
}

async fn summary(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Json<DashboardSummary> {
    Json(state.view(&query).summary)
}

async fn complaints(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Json<Vec<ComplaintPhrase>> {
    Json(state.view(&query).complaints)
}

async fn options(State(state): State<AppState>) -> Json<DashboardOptions> {
    Json(dashboard_options(&state.dataset))
}

async fn download_insights(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> impl IntoResponse {
    let text = state.view(&query).insights_text();
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, attachment(INSIGHTS_FILE_NAME)),
        ],
        text,
    )
}

async fn download_deck(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, WebError> {
    let bytes = state.view(&query).deck()?;
    Ok((
        [
            (header::CONTENT_TYPE, PPTX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, attachment(DECK_FILE_NAME)),
        ],
        bytes,
    ))
}

async fn healthz(State(state): State<AppState>) -> String {
    format!("ok rows={}", state.dataset.len())
}

fn dashboard_options(dataset: &Dataset) -> DashboardOptions {
    DashboardOptions {
        platforms: dataset.platforms(),
        categories: dataset.categories(),
    }
}

fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}
