//! Editor identity extraction.
//!
//! Authentication itself lives upstream; the gateway that terminates the
//! session forwards the signed-in user's id and display name as headers.
//! A connection without both headers is rejected before the upgrade.

use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode};
use folio_core::Editor;

/// Header carrying the authenticated user's numeric id.
pub const EDITOR_ID_HEADER: &str = "x-editor-id";

/// Header carrying the authenticated user's display name.
pub const EDITOR_NAME_HEADER: &str = "x-editor-name";

/// The authenticated editor behind a request.
#[derive(Debug, Clone)]
pub struct EditorIdentity(pub Editor);

impl<S> FromRequestParts<S> for EditorIdentity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, EDITOR_ID_HEADER)?;
        let name = header_value(parts, EDITOR_NAME_HEADER)?;
        Ok(Self(Editor::new(id, name)))
    }
}

fn header_value(parts: &Parts, name: &str) -> Result<String, (StatusCode, &'static str)> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or((StatusCode::UNAUTHORIZED, "Missing editor identity"))
}
