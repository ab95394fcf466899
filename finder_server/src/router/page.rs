// Category pages (`/all`, `/cheese-shop+farm-stand`, `/undecided`) are client-side
// routes: they get the front-end's index.html, after non-canonical spellings are
// redirected. Everything else passes through to the static files.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use finder_url::{decode_url, is_category_page, target_url, UNDECIDED_ROUTE};

use crate::{error::Result, state::AppState};

/// The canonical URL for a category page request, if it differs from the one requested.
pub fn canonical_redirect(path: &str, query: Option<&str>) -> Option<String> {
    let requested = match query {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };
    let canonical = target_url(&decode_url(path, query.unwrap_or_default()));
    (canonical != requested).then_some(canonical)
}

fn is_client_route(path: &str) -> bool {
    path == UNDECIDED_ROUTE || is_category_page(path)
}

pub async fn category_pages(
    State(app_state): State<AppState>,
    request: Request<Body>,
    next: Next<Body>,
) -> Result<Response> {
    let path = request.uri().path().to_string();
    if !is_client_route(&path) {
        return Ok(next.run(request).await);
    }
    if path != UNDECIDED_ROUTE {
        if let Some(url) = canonical_redirect(&path, request.uri().query()) {
            tracing::debug!("Redirecting {} to {}", request.uri(), url);
            return Ok(Redirect::permanent(&url).into_response());
        }
    }

    let index = app_state.config.static_dir.join("index.html");
    let content = tokio::fs::read_to_string(&index).await?;
    Ok(Html(content).into_response())
}
