use crate::{middleware::session::CurrentUser, views};
use axum::{response::Html, Extension};

/// `GET /dashboard`
pub async fn dashboard(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    Html(views::dashboard(&user))
}
