use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::rbac::authorizer::{AuthResult, AuthVerdict, authorize};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Header carrying the external user id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Optional display name for the same user.
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Extractor for the authorization outcome stashed by [`rbac_auth`].
/// Resolving it on a route not wrapped by the middleware is a
/// deployment mistake and fails with 417.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthResult);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthResult>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                AppError::misconfigured(
                    "user authorization is not configured for this route".to_string(),
                )
            })
    }
}

/// Route-layer middleware running the full authorization check for the
/// request's method and path. On success the [`AuthResult`] travels in
/// the request extensions for handlers to consult.
pub async fn rbac_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| AppError::unauthorized(format!("missing {USER_ID_HEADER} header")))?;

    let user_name = req
        .headers()
        .get(USER_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    let ar = authorize(&state.db, &user_id, &user_name, &method, &path).await;
    match ar.verdict {
        AuthVerdict::Ok => {
            req.extensions_mut().insert(ar);
            Ok(next.run(req).await)
        }
        AuthVerdict::NoPermission => Err(AppError::no_permission(ar.dump())),
        AuthVerdict::InternalError | AuthVerdict::Init => {
            Err(AppError::invalid_input(anyhow::anyhow!("{}", ar.msg)))
        }
    }
}
