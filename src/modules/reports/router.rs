use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    embed_report, list_all_reports, list_my_reports, list_pages, list_reports, list_workspaces,
};

pub fn init_reports_router() -> Router<AppState> {
    Router::new()
        .route("/all", get(list_all_reports))
        .route("/workspaces", get(list_workspaces))
        .route("/workspaces/{workspace_id}/reports", get(list_reports))
        .route("/workspaces/{workspace_id}/my-reports", get(list_my_reports))
        .route(
            "/workspaces/{workspace_id}/reports/{report_id}/pages",
            get(list_pages),
        )
        .route(
            "/workspaces/{workspace_id}/reports/{report_id}/embed",
            post(embed_report),
        )
}
