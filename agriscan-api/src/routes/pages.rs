use crate::{app::AppState, middleware::session::current_user, views};
use axum::{extract::State, response::Html};
use axum_extra::extract::cookie::CookieJar;

/// `GET /`
pub async fn landing(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let user = current_user(&state, &jar);
    Html(views::landing(user.as_deref()))
}
