/// Farming assistant
///
/// # Endpoints
///
/// - `GET /chatbot`, `GET /chat` - Chat form
/// - `POST /chatbot` - Form field `message`, reply rendered in-page
/// - `POST /api/chat` - JSON `{"message": ...}` -> `{"response": ...}`
///
/// The HTML form degrades to an in-page notice when the chat service fails
/// or is not configured. The JSON endpoint reports the failure as an error
/// status instead.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::session::CurrentUser,
    views::{self, ChatOutcome},
};
use axum::{extract::State, response::Html, Extension, Form, Json};
use serde::{Deserialize, Serialize};

const EMPTY_PROMPT: &str = "Empty prompt";
const UNAVAILABLE: &str = "The assistant is unavailable right now. Please try again later.";

/// Chat question, from either the form or the JSON endpoint
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Chat answer
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// `GET /chatbot` and `GET /chat`
pub async fn chat_page(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    Html(views::chat(&user, None, None))
}

/// `POST /chatbot`
pub async fn chat_form(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Form(request): Form<ChatRequest>,
) -> Html<String> {
    let prompt = request.message.trim();
    if prompt.is_empty() {
        return Html(views::chat(
            &user,
            None,
            Some(ChatOutcome::Error("Please type a question first.")),
        ));
    }

    match state.chat.complete(prompt).await {
        Ok(reply) => Html(views::chat(&user, Some(prompt), Some(ChatOutcome::Reply(&reply)))),
        Err(e) => {
            tracing::warn!(username = %user, error = %e, "Chat completion failed");
            Html(views::chat(&user, Some(prompt), Some(ChatOutcome::Error(UNAVAILABLE))))
        }
    }
}

/// `POST /api/chat`
///
/// A missing or unparsable body is treated as an empty prompt.
pub async fn chat_api(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Option<Json<ChatRequest>>,
) -> ApiResult<Json<ChatResponse>> {
    let message = body.map(|Json(request)| request.message).unwrap_or_default();
    let prompt = message.trim();

    if prompt.is_empty() {
        return Err(ApiError::BadRequest(EMPTY_PROMPT.to_string()));
    }

    tracing::debug!(username = %user, prompt_len = prompt.len(), "Chat API request");
    let response = state.chat.complete(prompt).await?;

    Ok(Json(ChatResponse { response }))
}
