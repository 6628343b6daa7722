//! Recap of required duties over a date range
//!
//! The stored rows are read in one transaction so a concurrent schedule or
//! task edit can't produce a recap mixing old and new state.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use piket_common::db::load_schedule_with;
use piket_common::recap::RecapTotals;
use piket_common::time::span_days;
use piket_common::{reconcile, RecapEntry};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::required_date;
use crate::db::{completions, tasks};
use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, page_of, parse_page_params, Pagination};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecapResponse {
    pub recap: Vec<RecapEntry>,
    /// Counts over the whole range, not just the returned page
    pub totals: RecapTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// GET /api/recap?startDate=&endDate=[&page=&limit=]
///
/// Entries are ordered newest date first, then by task catalog order.
pub async fn get_recap(
    State(state): State<AppState>,
    query: Result<Query<RecapQuery>, QueryRejection>,
) -> ApiResult<Json<RecapResponse>> {
    let Query(query) = query?;
    let start = required_date(query.start_date.as_deref(), "startDate")?;
    let end = required_date(query.end_date.as_deref(), "endDate")?;
    let paging = parse_page_params(query.page.as_deref(), query.limit.as_deref())?;

    let max_days = state.config.max_recap_days;
    if start <= end && span_days(start, end) > max_days {
        return Err(ApiError::validation(format!(
            "Range may cover at most {} days",
            max_days
        )));
    }

    let mut tx = state.db.begin().await?;
    let task_list = tasks::list_tasks_with(&mut *tx).await?;
    let completion_list = completions::completions_between_with(&mut *tx, start, end).await?;
    let schedule = load_schedule_with(&mut *tx).await?;
    tx.commit().await?;

    let entries = reconcile(
        start,
        end,
        &task_list,
        &completion_list,
        &schedule,
        &state.config.communal_group,
    )?;
    let totals = RecapTotals::from_entries(&entries);
    debug!(
        "Recap {}..{}: {} completed, {} missed",
        start, end, totals.completed, totals.missed
    );

    let response = match paging {
        None => RecapResponse {
            recap: entries,
            totals,
            pagination: None,
        },
        Some((page, limit)) => {
            let pagination = calculate_pagination(entries.len() as i64, page, limit);
            RecapResponse {
                recap: page_of(entries, &pagination),
                totals,
                pagination: Some(pagination),
            }
        }
    };

    Ok(Json(response))
}
