// SPDX-License-Identifier: MIT OR Apache-2.0
//! HTTPS fetch plumbing shared by the in-memory and disk-cached resolvers
//! (`spec.md` §4.4, §6).

use crate::checksum::StreamingHasher;
use esp_error::PackageLoadError;
use futures::StreamExt;
use reqwest::Client;

/// Build the `User-Agent` header value `spec.md` §6 mandates:
/// `Pkl/<version> (<os> <flavor>)`.
#[must_use]
pub fn user_agent() -> String {
    format!(
        "Pkl/{} ({} {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Fetch `url` in full, streaming the response body through a SHA-256
/// hasher as it arrives. Returns the collected bytes and the lowercase hex
/// digest. A non-2xx status raises [`PackageLoadError::BadHttpStatusCode`];
/// a transport-level failure raises
/// [`PackageLoadError::IoErrorMakingHttpGet`].
pub async fn fetch(client: &Client, url: &str) -> Result<(Vec<u8>, String), PackageLoadError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, user_agent())
        .send()
        .await
        .map_err(|e| PackageLoadError::IoErrorMakingHttpGet {
            url: url.to_string(),
            source: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(PackageLoadError::BadHttpStatusCode {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let mut hasher = StreamingHasher::new();
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| PackageLoadError::IoErrorMakingHttpGet {
            url: url.to_string(),
            source: e.to_string(),
        })?;
        hasher.update(&chunk);
        body.extend_from_slice(&chunk);
    }

    Ok((body, hasher.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn user_agent_follows_the_mandated_shape() {
        let ua = user_agent();
        assert!(ua.starts_with("Pkl/"));
        assert!(ua.contains('('));
        assert!(ua.ends_with(')'));
    }

    #[tokio::test]
    async fn fetch_returns_body_and_digest_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/foo.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&server)
            .await;

        let client = Client::new();
        let (body, digest) = fetch(&client, &format!("{}/foo.zip", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, b"abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn fetch_reports_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.zip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = Client::new();
        let err = fetch(&client, &format!("{}/missing.zip", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PackageLoadError::BadHttpStatusCode { status: 404, .. }
        ));
    }
}
