/// Response hardening headers
///
/// Every page is server-rendered HTML with no JavaScript, and every form posts
/// back to this origin. The Content-Security-Policy says exactly that. HSTS is
/// only sent in production, where the server sits behind TLS.
///
/// # Example
///
/// ```no_run
/// use axum::Router;
/// use agriscan_api::middleware::security::SecurityHeadersLayer;
///
/// let app: Router = Router::new().layer(SecurityHeadersLayer::new(true));
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'none'; \
    style-src 'self' 'unsafe-inline'; img-src 'self' data:; \
    form-action 'self'; frame-ancestors 'none'; base-uri 'none'";

/// Headers sent on every response
const ALWAYS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "same-origin"),
    ("content-security-policy", CONTENT_SECURITY_POLICY),
    (
        "permissions-policy",
        "geolocation=(), microphone=(), camera=(), payment=()",
    ),
];

const HSTS: &str = "max-age=31536000; includeSubDomains";

fn apply(headers: &mut HeaderMap, production: bool) {
    for (name, value) in ALWAYS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    if production {
        headers.insert(header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS));
    }
}

/// Adds the hardening headers to every response
#[derive(Debug, Clone, Copy)]
pub struct SecurityHeadersLayer {
    production: bool,
}

impl SecurityHeadersLayer {
    /// `production` turns on HSTS
    pub fn new(production: bool) -> Self {
        Self { production }
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeaders {
            inner,
            production: self.production,
        }
    }
}

/// Service produced by [`SecurityHeadersLayer`]
#[derive(Debug, Clone)]
pub struct SecurityHeaders<S> {
    inner: S,
    production: bool,
}

impl<S> Service<Request> for SecurityHeaders<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let production = self.production;
        let response = self.inner.call(request);

        Box::pin(async move {
            let mut response = response.await?;
            apply(response.headers_mut(), production);
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use tower::Service as _;

    async fn headers_for(production: bool) -> HeaderMap {
        let mut app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(SecurityHeadersLayer::new(production));

        app.call(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .headers()
            .clone()
    }

    #[tokio::test]
    async fn test_headers_on_every_response() {
        let headers = headers_for(false).await;

        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["referrer-policy"], "same-origin");
        assert!(headers.contains_key("permissions-policy"));

        let csp = headers["content-security-policy"].to_str().unwrap();
        assert!(csp.contains("script-src 'none'"));
        assert!(csp.contains("form-action 'self'"));
    }

    #[tokio::test]
    async fn test_hsts_only_in_production() {
        assert!(headers_for(true)
            .await
            .contains_key(header::STRICT_TRANSPORT_SECURITY));
        assert!(!headers_for(false)
            .await
            .contains_key(header::STRICT_TRANSPORT_SECURITY));
    }
}
