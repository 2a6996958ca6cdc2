use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::directory::CompanyDirectory;
use super::domain::CompanyQuery;
use crate::error::ApiError;

struct DirectoryContext<C> {
    directory: Arc<C>,
    expose_errors: bool,
}

impl<C> Clone for DirectoryContext<C> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            expose_errors: self.expose_errors,
        }
    }
}

/// Public, unauthenticated routes over the sponsor register.
pub fn company_router<C>(directory: Arc<C>, expose_errors: bool) -> Router
where
    C: CompanyDirectory + 'static,
{
    Router::new()
        .route("/api/companies", get(search_handler::<C>))
        .route("/api/stats/last-import", get(last_import_handler::<C>))
        .with_state(DirectoryContext {
            directory,
            expose_errors,
        })
}

async fn search_handler<C>(
    State(ctx): State<DirectoryContext<C>>,
    query: Result<Query<CompanyQuery>, QueryRejection>,
) -> Response
where
    C: CompanyDirectory + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return ApiError::validation(rejection.body_text()).into_response(),
    };

    match ctx.directory.search(&query.normalized()) {
        Ok(page) => Json(page).into_response(),
        Err(err) => ApiError::internal(err, ctx.expose_errors).into_response(),
    }
}

async fn last_import_handler<C>(State(ctx): State<DirectoryContext<C>>) -> Response
where
    C: CompanyDirectory + 'static,
{
    match ctx.directory.last_import() {
        Ok(entry) => Json(entry).into_response(),
        Err(err) => ApiError::internal(err, ctx.expose_errors).into_response(),
    }
}
