use crate::llm::client::LLMError;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Build an HTTP client with the configured request timeout
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, LLMError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(LLMError::NetworkError)
}

/// Send a request, retrying 429s with exponential backoff.
///
/// `build` is called once per attempt since a `RequestBuilder` is consumed by
/// `send`.
pub async fn send_with_retry<F>(build: F) -> Result<Response, LLMError>
where
    F: Fn() -> RequestBuilder,
{
    send_with_backoff(build, Duration::from_millis(INITIAL_BACKOFF_MS)).await
}

async fn send_with_backoff<F>(build: F, initial_backoff: Duration) -> Result<Response, LLMError>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0;
    let mut backoff_ms = initial_backoff.as_millis() as u64;

    loop {
        attempt += 1;

        let response = build().send().await.map_err(LLMError::from_transport)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);

            if attempt >= MAX_RETRIES {
                return Err(LLMError::RateLimitExceeded(retry_after));
            }

            let wait_ms = retry_after.saturating_mul(1000).max(backoff_ms);
            warn!(wait_ms, attempt, max = MAX_RETRIES, "rate limited by API, retrying");

            tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            backoff_ms *= 2;
            continue;
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(LLMError::ApiError(format!(
            "API returned status {}: {}",
            status, error_text
        )));
    }
}

/// Join a base URL and a path without doubling slashes
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mediator::GenerationError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `response` to every connection; `None` holds the socket open
    /// without answering. Returns the base URL and a request counter.
    async fn stub_server(response: Option<&'static str>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    match response {
                        Some(response) => {
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        }
                        None => tokio::time::sleep(Duration::from_secs(30)).await,
                    }
                });
            }
        });

        (format!("http://{}", addr), hits)
    }

    fn test_client(timeout: Duration) -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_server_error_becomes_api_error() {
        let (url, hits) = stub_server(Some(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\nboom",
        ))
        .await;
        let client = test_client(Duration::from_secs(5));

        let err = send_with_retry(|| client.get(&url)).await.unwrap_err();

        match err {
            LLMError::ApiError(ref message) => {
                assert!(message.contains("500"));
                assert!(message.contains("boom"));
            }
            ref other => panic!("expected ApiError, got {:?}", other),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(matches!(GenerationError::from(err), GenerationError::Api(LLMError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_rate_limit_gives_up_after_three_attempts() {
        let (url, hits) = stub_server(Some(
            "HTTP/1.1 429 Too Many Requests\r\nRetry-After: 0\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ))
        .await;
        let client = test_client(Duration::from_secs(5));

        let err = send_with_backoff(|| client.get(&url), Duration::from_millis(1))
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::RateLimitExceeded(0)));
        assert_eq!(hits.load(Ordering::SeqCst), MAX_RETRIES as usize);
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let (url, _hits) = stub_server(None).await;
        let client = test_client(Duration::from_millis(200));

        let err = send_with_retry(|| client.get(&url)).await.unwrap_err();

        assert!(matches!(err, LLMError::Timeout));
    }

    #[tokio::test]
    async fn test_success_is_returned() {
        let (url, _hits) = stub_server(Some(
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
        ))
        .await;
        let client = test_client(Duration::from_secs(5));

        let response = send_with_retry(|| client.get(&url)).await.unwrap();
        assert_eq!(response.text().await.unwrap(), "ok");
    }

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            endpoint("https://api.openai.com/v1/", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(endpoint("http://localhost:8080", "messages"), "http://localhost:8080/messages");
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(Duration::from_secs(5)).is_ok());
    }
}
