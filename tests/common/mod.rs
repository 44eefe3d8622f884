#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};
use reposcribe::config::{BackoffConfig, Config};
use serde_json::{json, Value};

pub const API: &str = "https://api.github.com";
pub const RAW: &str = "https://raw.githubusercontent.com";

pub mod test_helpers {
    use super::*;

    pub async fn setup_test_server() -> ServerGuard {
        mockito::Server::new_async().await
    }

    /// Config routing through `proxy` with near-instant backoff
    pub fn test_config(proxy: &str) -> Config {
        Config {
            proxy_base: Some(proxy.to_string()),
            backoff: BackoffConfig {
                default_wait_secs: 0,
                min_wait_ms: 1,
                max_wait_secs: 1,
            },
            ..Config::default()
        }
    }

    pub fn setup_test_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    /// Upstream contents endpoint for `path` in acme/widgets at `main`
    pub fn contents_url(path: &str) -> String {
        if path.is_empty() {
            format!("{}/repos/acme/widgets/contents?ref=main", API)
        } else {
            format!("{}/repos/acme/widgets/contents/{}?ref=main", API, path)
        }
    }

    pub fn raw_url(path: &str) -> String {
        format!("{}/acme/widgets/main/{}", RAW, path)
    }

    pub fn file_entry(path: &str, size: u64) -> Value {
        json!({
            "name": path.rsplit('/').next().unwrap_or(path),
            "path": path,
            "type": "file",
            "size": size,
            "download_url": raw_url(path),
            "url": contents_url(path),
        })
    }

    pub fn dir_entry(path: &str) -> Value {
        json!({
            "name": path.rsplit('/').next().unwrap_or(path),
            "path": path,
            "type": "dir",
            "size": 0,
            "download_url": null,
            "url": contents_url(path),
        })
    }

    pub async fn mock_listing(server: &mut ServerGuard, upstream: &str, entries: Value) -> Mock {
        server
            .mock("GET", "/api/proxy_github_api")
            .match_query(Matcher::UrlEncoded("url".into(), upstream.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(entries.to_string())
            .expect(1)
            .create_async()
            .await
    }

    pub async fn mock_listing_status(
        server: &mut ServerGuard,
        upstream: &str,
        status: usize,
        headers: &[(&str, &str)],
        body: &str,
        hits: usize,
    ) -> Mock {
        let mut mock = server
            .mock("GET", "/api/proxy_github_api")
            .match_query(Matcher::UrlEncoded("url".into(), upstream.into()))
            .with_status(status)
            .with_body(body)
            .expect(hits);
        for (name, value) in headers {
            mock = mock.with_header(*name, *value);
        }
        mock.create_async().await
    }

    pub async fn mock_raw(server: &mut ServerGuard, path: &str, status: usize, body: &[u8], hits: usize) -> Mock {
        server
            .mock("GET", "/api/proxy_github_raw_content")
            .match_query(Matcher::UrlEncoded("url".into(), raw_url(path)))
            .with_status(status)
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Text between the header block and the footer
    pub fn body_of(markdown: &str) -> &str {
        let (_, rest) = markdown
            .split_once(" UTC\n\n")
            .expect("document header present");
        rest.strip_suffix(reposcribe::document::FOOTER)
            .expect("document footer present")
    }
}
