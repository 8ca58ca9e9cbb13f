use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::{header, HeaderName, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use jobsheet_core::{JobCode, SearchFilter};
use jobsheet_receipt::RenderedReceipt;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::RequestContext;

pub const JOBSHEET_CODE_HEADER: HeaderName = HeaderName::from_static("x-jobsheet-code");

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_jobsheet).get(search_jobsheets))
        .route("/:code", get(get_jobsheet))
        .route("/:code/receipt", get(download_receipt))
}

pub async fn create_jobsheet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    body: Result<Json<dto::CreateJobsheetRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text());
        }
    };

    match services.intake.create(body.into_form()).await {
        Ok(outcome) => {
            tracing::info!(
                request_id = %ctx.request_id(),
                code = %outcome.record.code,
                path = %outcome.receipt_path.display(),
                "intake receipt returned"
            );
            pdf_response(StatusCode::CREATED, &outcome.record.code, outcome.receipt)
        }
        Err(e) => errors::intake_error_to_response(&ctx, e),
    }
}

pub async fn search_jobsheets(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Query(filter): Query<SearchFilter>,
) -> axum::response::Response {
    let timezone = &services.intake.renderer().shop().timezone;
    match services.intake.search(&filter).await {
        Ok(records) => {
            let items = records
                .iter()
                .map(|r| dto::jobsheet_to_json(r, timezone))
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::intake_error_to_response(&ctx, e),
    }
}

pub async fn get_jobsheet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let code = match parse_code(&code) {
        Ok(code) => code,
        Err(resp) => return resp,
    };

    match services.intake.find(&code).await {
        Ok(record) => {
            let timezone = &services.intake.renderer().shop().timezone;
            (StatusCode::OK, Json(dto::jobsheet_to_json(&record, timezone))).into_response()
        }
        Err(e) => errors::intake_error_to_response(&ctx, e),
    }
}

pub async fn download_receipt(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let code = match parse_code(&code) {
        Ok(code) => code,
        Err(resp) => return resp,
    };

    match services.intake.receipt_for(&code).await {
        Ok((_, receipt)) => pdf_response(StatusCode::OK, &code, receipt),
        Err(e) => errors::intake_error_to_response(&ctx, e),
    }
}

fn parse_code(raw: &str) -> Result<JobCode, axum::response::Response> {
    JobCode::parse(raw).map_err(|e| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_code", e.to_string())
    })
}

fn pdf_response(status: StatusCode, code: &JobCode, receipt: RenderedReceipt) -> axum::response::Response {
    let disposition = format!("attachment; filename=\"{}\"", receipt.file_name);
    (
        status,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (JOBSHEET_CODE_HEADER, code.to_string()),
        ],
        receipt.bytes,
    )
        .into_response()
}
