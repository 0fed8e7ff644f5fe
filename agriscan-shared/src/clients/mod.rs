/// Clients for hosted services
///
/// Each service sits behind a small async trait so the web server and the
/// alert worker can be exercised with in-process fakes:
///
/// - [`ChatClient`]: OpenAI-compatible chat completion
/// - [`SmsSender`]: Twilio-style SMS delivery
/// - [`WeatherSource`]: wttr.in-style one-line weather summaries
///
/// None of the clients retry. Callers decide whether a failure degrades the
/// response (chat) or is logged and skipped (alerts).

pub mod chat;
pub mod sms;
pub mod weather;

pub use chat::{ChatClient, DisabledChatClient, OpenAiChatClient};
pub use sms::{SmsSender, TwilioSmsSender};
pub use weather::{WeatherSource, WttrWeather};

use std::time::Duration;

/// Request timeout applied to every outbound call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for calls to hosted services
#[derive(Debug, thiserror::Error)]
pub enum ExternalServiceError {
    /// Service is not configured (missing API key or credentials)
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Transport failure (DNS, TLS, timeout, connection reset)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Unexpected response from {service}: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },
}

/// Builds the shared HTTP client with the outbound timeout
pub fn http_client() -> Result<reqwest::Client, ExternalServiceError> {
    Ok(reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("agriscan/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Turns a non-success response into [`ExternalServiceError::Status`]
pub(crate) async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ExternalServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(200)
        .collect();

    Err(ExternalServiceError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}

/// One-shot HTTP server for client tests
#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves a single canned response and yields the raw request it received
    pub async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&request).into_owned()
        });

        (url, handle)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };

        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        request.len() >= header_end + 4 + content_length
    }
}
