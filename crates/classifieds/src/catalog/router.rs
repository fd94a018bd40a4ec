use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{ListingDraft, ListingId, ListingKind};
use super::gate::MutationDecision;
use super::notify::Notifier;
use super::principal::{MemberProfile, Principal, ProfileStore, SessionProvider};
use super::repository::{CatalogRepository, RepositoryError};
use super::service::{CatalogError, CatalogService, DeleteToken, SubmitReceipt};

/// Header carrying the caller's session token. Absent or unknown tokens
/// resolve to `Anonymous`.
pub const MEMBER_TOKEN_HEADER: &str = "x-member-token";

/// Shared router state: the catalog service plus the session collaborator
/// used to resolve an explicit principal per request.
pub struct CatalogState<R, P, N> {
    pub service: Arc<CatalogService<R, P, N>>,
    pub sessions: Arc<dyn SessionProvider>,
}

impl<R, P, N> Clone for CatalogState<R, P, N> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

/// Router builder exposing the catalog's HTTP endpoints.
pub fn catalog_router<R, P, N>(state: CatalogState<R, P, N>) -> Router
where
    R: CatalogRepository + 'static,
    P: ProfileStore + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/classifieds/:kind",
            get(browse_handler::<R, P, N>).post(create_handler::<R, P, N>),
        )
        .route(
            "/api/v1/classifieds/:kind/:id",
            get(inspect_handler::<R, P, N>).put(update_handler::<R, P, N>),
        )
        .route(
            "/api/v1/classifieds/:kind/:id/deletion-requests",
            post(request_delete_handler::<R, P, N>),
        )
        .route(
            "/api/v1/classifieds/deletions",
            post(confirm_delete_handler::<R, P, N>),
        )
        .route(
            "/api/v1/profile",
            get(fetch_profile_handler::<R, P, N>).put(save_profile_handler::<R, P, N>),
        )
        .route("/api/v1/session/sign-out", post(sign_out_handler::<R, P, N>))
        .with_state(state)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(MEMBER_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
}

fn principal<R, P, N>(state: &CatalogState<R, P, N>, headers: &HeaderMap) -> Principal {
    state.sessions.current_principal(bearer(headers))
}

fn parse_kind(segment: &str) -> Result<ListingKind, Response> {
    ListingKind::from_segment(segment).ok_or_else(|| {
        let payload = json!({ "error": format!("unknown listing kind '{segment}'") });
        (StatusCode::NOT_FOUND, Json(payload)).into_response()
    })
}

fn error_response(error: CatalogError) -> Response {
    match error {
        CatalogError::Validation(error) => {
            let payload = json!({
                "error": error.to_string(),
                "field": error.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        CatalogError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "listing not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        CatalogError::Repository(RepositoryError::Unavailable(_)) => {
            let payload = json!({ "error": "catalog store unavailable, try again" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
        CatalogError::Denied(decision) => {
            let status = match decision {
                MutationDecision::RequiresAuthentication => StatusCode::UNAUTHORIZED,
                _ => StatusCode::FORBIDDEN,
            };
            let payload = json!({
                "error": "listing mutation denied",
                "remediation": decision.remediation(),
            });
            (status, Json(payload)).into_response()
        }
        CatalogError::Session(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn browse_handler<R, P, N>(
    State(state): State<CatalogState<R, P, N>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
) -> Response
where
    R: CatalogRepository + 'static,
    P: ProfileStore + 'static,
    N: Notifier + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let caller = principal(&state, &headers);

    match state.service.browse(&caller, kind) {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn inspect_handler<R, P, N>(
    State(state): State<CatalogState<R, P, N>>,
    Path((kind, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response
where
    R: CatalogRepository + 'static,
    P: ProfileStore + 'static,
    N: Notifier + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let caller = principal(&state, &headers);

    match state.service.inspect(&caller, kind, &ListingId(id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R, P, N>(
    State(state): State<CatalogState<R, P, N>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<ListingDraft>,
) -> Response
where
    R: CatalogRepository + 'static,
    P: ProfileStore + 'static,
    N: Notifier + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let caller = principal(&state, &headers);

    let mut session = match state.service.open_create(&caller, kind) {
        Ok(session) => session,
        Err(error) => return error_response(error),
    };

    match state.service.submit(&mut session, &caller, draft) {
        Ok(SubmitReceipt::Created(record)) => {
            let view = super::disclosure::ListingView::project(&caller, &record);
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R, P, N>(
    State(state): State<CatalogState<R, P, N>>,
    Path((kind, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(draft): Json<ListingDraft>,
) -> Response
where
    R: CatalogRepository + 'static,
    P: ProfileStore + 'static,
    N: Notifier + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let caller = principal(&state, &headers);

    let (mut session, _loaded) =
        match state.service.open_edit(&caller, kind, ListingId(id)) {
            Ok(opened) => opened,
            Err(error) => return error_response(error),
        };

    match state.service.submit(&mut session, &caller, draft) {
        Ok(SubmitReceipt::Updated(id)) => {
            let payload = json!({ "id": id, "status": "updated" });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn request_delete_handler<R, P, N>(
    State(state): State<CatalogState<R, P, N>>,
    Path((kind, id)): Path<(String, String)>,
) -> Response
where
    R: CatalogRepository + 'static,
    P: ProfileStore + 'static,
    N: Notifier + 'static,
{
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    match state.service.request_delete(kind, &ListingId(id)) {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn confirm_delete_handler<R, P, N>(
    State(state): State<CatalogState<R, P, N>>,
    Json(token): Json<DeleteToken>,
) -> Response
where
    R: CatalogRepository + 'static,
    P: ProfileStore + 'static,
    N: Notifier + 'static,
{
    match state.service.confirm_delete(token) {
        Ok(()) => {
            let payload = json!({ "status": "removed" });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_profile_handler<R, P, N>(
    State(state): State<CatalogState<R, P, N>>,
    headers: HeaderMap,
) -> Response
where
    R: CatalogRepository + 'static,
    P: ProfileStore + 'static,
    N: Notifier + 'static,
{
    let caller = principal(&state, &headers);

    match state.service.profile_of(&caller) {
        Ok(profile) => (StatusCode::OK, Json(json!({ "profile": profile }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_profile_handler<R, P, N>(
    State(state): State<CatalogState<R, P, N>>,
    headers: HeaderMap,
    Json(profile): Json<MemberProfile>,
) -> Response
where
    R: CatalogRepository + 'static,
    P: ProfileStore + 'static,
    N: Notifier + 'static,
{
    let caller = principal(&state, &headers);

    match state.service.save_profile(&caller, profile) {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "saved" }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn sign_out_handler<R, P, N>(
    State(state): State<CatalogState<R, P, N>>,
    headers: HeaderMap,
) -> Response
where
    R: CatalogRepository + 'static,
    P: ProfileStore + 'static,
    N: Notifier + 'static,
{
    if let Some(token) = bearer(&headers) {
        state.sessions.sign_out(token);
    }
    StatusCode::NO_CONTENT.into_response()
}
