/// Middleware for the web server
///
/// - `security`: Security response headers
/// - `session`: Session cookie handling and the login guard

pub mod security;
pub mod session;
