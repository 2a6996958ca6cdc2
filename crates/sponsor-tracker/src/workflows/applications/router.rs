use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;

use super::domain::{ApplicationId, ApplicationPatch, ManualNoteRequest, NewApplicationRequest};
use super::repository::ApplicationRepository;
use super::service::{ServiceError, TrackerService};
use crate::auth::{require_user, AuthenticatedUser, TokenKeys};
use crate::error::ApiError;
use crate::workflows::sponsors::{CompanyDirectory, CompanyId};

pub(crate) struct TrackerContext<C, R> {
    pub(crate) service: Arc<TrackerService<C, R>>,
    pub(crate) expose_errors: bool,
}

impl<C, R> Clone for TrackerContext<C, R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            expose_errors: self.expose_errors,
        }
    }
}

impl<C, R> TrackerContext<C, R> {
    fn fail(&self, err: ServiceError) -> Response {
        ApiError::from_service(err, self.expose_errors).into_response()
    }
}

/// Router builder for the authenticated application endpoints. Every route
/// sits behind the bearer-token guard.
pub fn application_router<C, R>(
    service: Arc<TrackerService<C, R>>,
    tokens: Arc<TokenKeys>,
    expose_errors: bool,
) -> Router
where
    C: CompanyDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    Router::new()
        .route("/api/predict/:company_id", get(predict_handler::<C, R>))
        .route(
            "/api/applications",
            get(list_handler::<C, R>).post(create_handler::<C, R>),
        )
        .route(
            "/api/applications/:application_id",
            get(detail_handler::<C, R>)
                .put(update_handler::<C, R>)
                .delete(delete_handler::<C, R>),
        )
        .route(
            "/api/applications/:application_id/updates",
            post(add_update_handler::<C, R>),
        )
        .route("/api/stats/summary", get(summary_handler::<C, R>))
        .route_layer(middleware::from_fn_with_state(tokens, require_user))
        .with_state(TrackerContext {
            service,
            expose_errors,
        })
}

fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, Response> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::validation(rejection.body_text()).into_response())
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::validation(rejection.body_text()).into_response())
}

pub(crate) async fn predict_handler<C, R>(
    State(ctx): State<TrackerContext<C, R>>,
    Extension(caller): Extension<AuthenticatedUser>,
    company_id: Result<Path<i64>, PathRejection>,
) -> Response
where
    C: CompanyDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    let company_id = match path_id(company_id) {
        Ok(id) => CompanyId(id),
        Err(response) => return response,
    };
    match ctx.service.predict(caller.id, company_id) {
        Ok(prediction) => Json(prediction).into_response(),
        Err(err) => ctx.fail(err),
    }
}

pub(crate) async fn list_handler<C, R>(
    State(ctx): State<TrackerContext<C, R>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Response
where
    C: CompanyDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    match ctx.service.list(caller.id) {
        Ok(listings) => Json(listings).into_response(),
        Err(err) => ctx.fail(err),
    }
}

pub(crate) async fn create_handler<C, R>(
    State(ctx): State<TrackerContext<C, R>>,
    Extension(caller): Extension<AuthenticatedUser>,
    body: Result<Json<NewApplicationRequest>, JsonRejection>,
) -> Response
where
    C: CompanyDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    let request = match json_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match ctx.service.create(caller.id, request) {
        Ok(detail) => (StatusCode::CREATED, Json(detail)).into_response(),
        Err(err) => ctx.fail(err),
    }
}

pub(crate) async fn detail_handler<C, R>(
    State(ctx): State<TrackerContext<C, R>>,
    Extension(caller): Extension<AuthenticatedUser>,
    application_id: Result<Path<i64>, PathRejection>,
) -> Response
where
    C: CompanyDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    let id = match path_id(application_id) {
        Ok(id) => ApplicationId(id),
        Err(response) => return response,
    };
    match ctx.service.get(caller.id, id) {
        Ok(detail) => Json(detail).into_response(),
        Err(err) => ctx.fail(err),
    }
}

pub(crate) async fn update_handler<C, R>(
    State(ctx): State<TrackerContext<C, R>>,
    Extension(caller): Extension<AuthenticatedUser>,
    application_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ApplicationPatch>, JsonRejection>,
) -> Response
where
    C: CompanyDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    let id = match path_id(application_id) {
        Ok(id) => ApplicationId(id),
        Err(response) => return response,
    };
    let patch = match json_body(body) {
        Ok(patch) => patch,
        Err(response) => return response,
    };
    match ctx.service.update(caller.id, id, patch) {
        Ok(detail) => Json(detail).into_response(),
        Err(err) => ctx.fail(err),
    }
}

pub(crate) async fn delete_handler<C, R>(
    State(ctx): State<TrackerContext<C, R>>,
    Extension(caller): Extension<AuthenticatedUser>,
    application_id: Result<Path<i64>, PathRejection>,
) -> Response
where
    C: CompanyDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    let id = match path_id(application_id) {
        Ok(id) => ApplicationId(id),
        Err(response) => return response,
    };
    match ctx.service.delete(caller.id, id) {
        Ok(()) => Json(json!({ "message": "application deleted" })).into_response(),
        Err(err) => ctx.fail(err),
    }
}

pub(crate) async fn add_update_handler<C, R>(
    State(ctx): State<TrackerContext<C, R>>,
    Extension(caller): Extension<AuthenticatedUser>,
    application_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<ManualNoteRequest>, JsonRejection>,
) -> Response
where
    C: CompanyDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    let id = match path_id(application_id) {
        Ok(id) => ApplicationId(id),
        Err(response) => return response,
    };
    let request = match json_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match ctx.service.add_update(caller.id, id, request) {
        Ok(update) => (StatusCode::CREATED, Json(update)).into_response(),
        Err(err) => ctx.fail(err),
    }
}

pub(crate) async fn summary_handler<C, R>(
    State(ctx): State<TrackerContext<C, R>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Response
where
    C: CompanyDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    match ctx.service.summary(caller.id) {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => ctx.fail(err),
    }
}
