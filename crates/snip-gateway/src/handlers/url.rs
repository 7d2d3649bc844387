use crate::error::{AppError, Result};
use crate::model::{AddUrlForm, AddUrlResponse, MappingResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use snip_core::ShortKey;
use tracing::debug;

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><title>snip</title></head>
<body>
<h1>snip</h1>
<form method="post" action="/add">
  <input type="text" name="url" placeholder="Long URL" size="60">
  <input type="submit" value="Shorten">
</form>
</body>
</html>
"#;

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn add_url_handler(
    State(state): State<AppState>,
    Form(form): Form<AddUrlForm>,
) -> Result<Json<AddUrlResponse>> {
    let key = state.shortener().shorten(form.url).await?;
    Ok(Json(AddUrlResponse {
        result: key.into(),
    }))
}

pub async fn list_all_handler(State(state): State<AppState>) -> Result<Json<Vec<MappingResponse>>> {
    if !state.debug() {
        return Err(AppError::NotFound);
    }

    let mappings = state.shortener().list().await?;
    Ok(Json(mappings.into_iter().map(MappingResponse::from).collect()))
}

pub async fn redirect_handler(
    Path(short_key): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let Ok(key) = short_key.parse::<ShortKey>() else {
        debug!(short_key = %short_key, "malformed short key");
        return Err(AppError::NotFound);
    };

    let record = state
        .shortener()
        .resolve(&key)
        .await?
        .ok_or(AppError::NotFound)?;

    let target = redirect_target(&record.long_url);
    let location = HeaderValue::from_bytes(target.as_bytes())
        .map_err(|e| AppError::InvalidRedirect(e.to_string()))?;

    Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
}

/// Where to send the visitor for a stored long URL.
///
/// URLs without a scheme get a `//` prefix so the browser treats them as
/// another host instead of a path on this service.
pub fn redirect_target(long_url: &str) -> String {
    if long_url.contains("://") {
        long_url.to_string()
    } else {
        format!("//{long_url}")
    }
}
