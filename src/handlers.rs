use crate::errors::AppError;
use crate::models::{
    DashboardSummary, Dataset, FailureMetrics, PeriodMetrics, RecordSet, ShareMetrics,
};
use crate::quality::{audit, DataQualityWarning};
use crate::state::AppState;
use crate::stats::{build_summary, failure_metrics, period_metrics, share_metrics};
use crate::ui::render_dashboard;
use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use chrono::Local;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let summary = build_summary(&state.dataset, &state.settings);
    Html(render_dashboard(
        &summary,
        &state.dataset,
        Local::now().naive_local(),
    ))
}

pub async fn get_summary(State(state): State<AppState>) -> Json<DashboardSummary> {
    Json(build_summary(&state.dataset, &state.settings))
}

pub async fn get_periods(
    State(state): State<AppState>,
    Path(series): Path<String>,
) -> Result<Json<PeriodMetrics>, AppError> {
    let (set, periods) = match series.as_str() {
        "monthly" => (RecordSet::Monthly, &state.dataset.monthly),
        "hourly" => (RecordSet::Hourly, &state.dataset.hourly),
        other => {
            return Err(AppError::not_found(format!(
                "unknown series '{other}', expected 'monthly' or 'hourly'"
            )));
        }
    };

    Ok(Json(period_metrics(set, periods)))
}

pub async fn get_countries(State(state): State<AppState>) -> Json<ShareMetrics> {
    Json(share_metrics(
        RecordSet::Countries,
        &state.dataset.countries,
        &state.settings,
    ))
}

pub async fn get_clients(State(state): State<AppState>) -> Json<ShareMetrics> {
    Json(share_metrics(
        RecordSet::Clients,
        &state.dataset.clients,
        &state.settings,
    ))
}

pub async fn get_failures(State(state): State<AppState>) -> Json<FailureMetrics> {
    Json(failure_metrics(&state.dataset.failures, &state.settings))
}

pub async fn get_warnings(State(state): State<AppState>) -> Json<Vec<DataQualityWarning>> {
    Json(audit(&state.dataset, state.settings.share_tolerance))
}

pub async fn get_dataset(State(state): State<AppState>) -> Json<Dataset> {
    Json(state.dataset.as_ref().clone())
}
