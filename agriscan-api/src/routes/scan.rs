/// Leaf scan: upload form and classification
///
/// # Endpoints
///
/// - `GET /scan` - Upload form
/// - `POST /predict` - Multipart upload, field `file`
///
/// A request without a non-empty `file` part (or without a multipart body at
/// all) is sent back to `/scan`. Decode and inference failures are returned
/// as a 500 JSON error, never as a guessed label.

use crate::{
    app::AppState,
    error::ApiResult,
    middleware::session::CurrentUser,
    views,
};
use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use bytes::Bytes;

const FILE_FIELD: &str = "file";

/// `GET /scan`
pub async fn scan(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    Html(views::scan(&user, None))
}

/// `POST /predict`
pub async fn predict(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Option<Multipart>,
) -> ApiResult<Response> {
    let upload = match multipart {
        Some(multipart) => read_upload(multipart).await,
        None => None,
    };

    let Some(bytes) = upload else {
        tracing::debug!(username = %user, "Predict without a file, back to scan");
        return Ok(Redirect::to("/scan").into_response());
    };

    let size = bytes.len();
    let classifier = state.classifier.clone();
    let result = tokio::task::spawn_blocking(move || classifier.classify(&bytes)).await??;

    tracing::info!(
        username = %user,
        size,
        label = %result.label,
        confidence = result.confidence,
        "Leaf image classified"
    );

    Ok(Html(views::scan(&user, Some(&result))).into_response())
}

/// Returns the bytes of the first `file` part, if it names a file and is not empty
///
/// A body that cannot be parsed as multipart counts as having no file.
async fn read_upload(mut multipart: Multipart) -> Option<Bytes> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(e) => {
                tracing::debug!(error = %e, "Malformed multipart upload");
                return None;
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let has_file_name = field.file_name().is_some_and(|name| !name.is_empty());
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read uploaded file");
                return None;
            }
        };

        return (has_file_name && !data.is_empty()).then_some(data);
    }
}
