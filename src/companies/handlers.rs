use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{
    CompaniesResponse, CompanyFilter, CompanyResponse, DeletedResponse, NewCompany, UpdateCompany,
};
use super::repo_types::{Company, CompanyDetail};
use crate::{auth::extractors::Admin, error::AppError, state::AppState, validation::ValidatedJson};

pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", post(create_company).get(list_companies))
        .route(
            "/companies/:handle",
            get(get_company).patch(update_company).delete(delete_company),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_company(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    ValidatedJson(payload): ValidatedJson<NewCompany>,
) -> Result<(StatusCode, Json<CompanyResponse<Company>>), AppError> {
    let company = Company::create(&state.db, payload).await?;
    info!(handle = %company.handle, "company created");
    Ok((StatusCode::CREATED, Json(CompanyResponse { company })))
}

/// `?name=&minEmployees=&maxEmployees=`; name matches case-insensitively.
#[instrument(skip(state))]
pub async fn list_companies(
    State(state): State<AppState>,
    filter: Result<Query<CompanyFilter>, QueryRejection>,
) -> Result<Json<CompaniesResponse>, AppError> {
    let Query(filter) = filter.map_err(|e| AppError::bad_request(e.body_text()))?;
    let companies = Company::find_all(&state.db, &filter).await?;
    Ok(Json(CompaniesResponse { companies }))
}

#[instrument(skip(state))]
pub async fn get_company(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<CompanyResponse<CompanyDetail>>, AppError> {
    let company = Company::get(&state.db, &handle).await?;
    Ok(Json(CompanyResponse { company }))
}

#[instrument(skip(state, payload))]
pub async fn update_company(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    Path(handle): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateCompany>,
) -> Result<Json<CompanyResponse<Company>>, AppError> {
    let company = Company::update(&state.db, &handle, payload).await?;
    info!(%handle, "company updated");
    Ok(Json(CompanyResponse { company }))
}

#[instrument(skip(state))]
pub async fn delete_company(
    State(state): State<AppState>,
    Admin(_admin): Admin,
    Path(handle): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    Company::remove(&state.db, &handle).await?;
    info!(%handle, "company deleted");
    Ok(Json(DeletedResponse { deleted: handle }))
}
