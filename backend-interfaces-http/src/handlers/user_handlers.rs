use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::user_queries;
use backend_application::AppState;
use backend_domain::CurrentUserView;

use crate::error::HttpError;
use crate::middleware::user_context;

pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CurrentUserView>, HttpError> {
    let ctx = user_context(&state, &headers).await?;
    Ok(Json(user_queries::current_user_view(&ctx)))
}
