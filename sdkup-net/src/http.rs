use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use sdkup_common::config::Config;
use sdkup_common::error::{Result, SdkupError};
use tokio::fs::File as TokioFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};

use crate::validation::validate_url;

const USER_AGENT_STRING: &str = "sdkup Creator SDK updater (Rust)";
const MAX_REDIRECTS: usize = 10;

/// Retrieves a remote package into a local file.
///
/// Implementations do not retry; a failed transfer is reported once and the
/// caller decides what happens next.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads `url` into `destination` and returns the path written.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<PathBuf>;
}

pub fn build_http_client(connect_timeout: Duration, timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| SdkupError::Config(format!("Failed to build HTTP client: {e}")))
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = build_http_client(config.connect_timeout, config.download_timeout)?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn download(&self, url: &str, destination: &Path) -> Result<()> {
        let mut response = self.client.get(url).send().await.map_err(|e| {
            debug!("HTTP request failed for {url}: {e}");
            SdkupError::FetchFailed(format!("HTTP request failed for {url}: {e}"))
        })?;
        let status = response.status();
        debug!("Received HTTP status: {} for {}", status, url);
        if !status.is_success() {
            return Err(SdkupError::FetchFailed(format!(
                "HTTP error {status} for URL {url}"
            )));
        }

        let mut file = TokioFile::create(destination).await.map_err(|e| {
            SdkupError::IoError(format!(
                "Failed to create temp file {}: {}",
                destination.display(),
                e
            ))
        })?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            SdkupError::FetchFailed(format!("Failed to read response body from {url}: {e}"))
        })? {
            file.write_all(&chunk).await.map_err(|e| {
                SdkupError::IoError(format!(
                    "Failed to write download stream to {}: {}",
                    destination.display(),
                    e
                ))
            })?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        debug!(
            "Finished writing {} bytes to {}",
            written,
            destination.display()
        );
        Ok(())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<PathBuf> {
        validate_url(url)?;
        debug!(
            "Downloading {} to temporary path {}",
            url,
            destination.display()
        );
        if destination.exists() {
            if let Err(e) = tokio::fs::remove_file(destination).await {
                warn!(
                    "Could not remove existing temporary file {}: {}",
                    destination.display(),
                    e
                );
            }
        }

        match self.download(url, destination).await {
            Ok(()) => Ok(destination.to_path_buf()),
            Err(e) => {
                error!("Download failed from {}: {}", url, e);
                let _ = tokio::fs::remove_file(destination).await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    fn test_fetcher(timeout: Duration) -> HttpFetcher {
        let client = Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .unwrap();
        HttpFetcher::from_client(client)
    }

    /// Serves one connection: reads the request head, then writes `response`
    /// after `delay`.
    async fn serve_once(response: Vec<u8>, delay: Duration) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            tokio::time::sleep(delay).await;
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        });
        (format!("http://{addr}/CreatorSDK.unitypackage"), handle)
    }

    fn http_response(status_line: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        out.extend_from_slice(body);
        out
    }

    #[tokio::test]
    async fn downloads_body_to_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join(".CreatorSDK.unitypackage.download");
        let (url, server) =
            serve_once(http_response("200 OK", b"package-bytes"), Duration::ZERO).await;

        let path = test_fetcher(Duration::from_secs(5))
            .fetch(&url, &dest)
            .await
            .unwrap();

        assert_eq!(path, dest);
        assert_eq!(std::fs::read(&dest).unwrap(), b"package-bytes");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_failed() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pkg.download");
        let (url, server) =
            serve_once(http_response("404 Not Found", b"missing"), Duration::ZERO).await;

        let err = test_fetcher(Duration::from_secs(5))
            .fetch(&url, &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, SdkupError::FetchFailed(ref m) if m.contains("404")));
        assert!(!dest.exists());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn timeout_is_fetch_failed_and_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pkg.download");
        let (url, server) = serve_once(
            http_response("200 OK", b"too late"),
            Duration::from_secs(2),
        )
        .await;

        let err = test_fetcher(Duration::from_millis(200))
            .fetch(&url, &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, SdkupError::FetchFailed(_)));
        assert!(!dest.exists());
        server.abort();
    }

    #[tokio::test]
    async fn refused_connection_is_fetch_failed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let dir = tempfile::tempdir().unwrap();

        let err = test_fetcher(Duration::from_secs(5))
            .fetch(
                &format!("http://{addr}/CreatorSDK.unitypackage"),
                &dir.path().join("pkg.download"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SdkupError::FetchFailed(_)));
    }

    #[tokio::test]
    async fn invalid_scheme_is_rejected_before_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let err = test_fetcher(Duration::from_secs(5))
            .fetch("file:///etc/passwd", &dir.path().join("pkg.download"))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkupError::ValidationError(_)));
    }
}
