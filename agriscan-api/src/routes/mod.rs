/// Route handlers
///
/// - `health`: Liveness and detailed health endpoints
/// - `pages`: Landing page
/// - `auth`: Signup, login, logout
/// - `dashboard`: Signed-in home page
/// - `scan`: Upload form and image classification
/// - `chat`: Farming assistant

pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod pages;
pub mod scan;
