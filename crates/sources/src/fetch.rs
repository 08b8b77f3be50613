use std::time::Duration;

use anyhow::{Context, Result};
use corpus_core::SourceLoadError;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use url::Url;

pub trait UrlFetcher: Send + Sync {
    fn fetch(&self, locator: &str, url: &Url) -> Result<Vec<u8>, SourceLoadError>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("corpus-sources/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed building http client for sample sources")?;

        Ok(Self { client })
    }
}

impl UrlFetcher for HttpFetcher {
    fn fetch(&self, locator: &str, url: &Url) -> Result<Vec<u8>, SourceLoadError> {
        let response = self.client.get(url.clone()).send().map_err(|err| {
            SourceLoadError::io_failure(locator, format!("request failed: {err}")).with_source(err)
        })?;

        if let Some(err) = status_error(locator, response.status()) {
            return Err(err);
        }

        response.bytes().map(|body| body.to_vec()).map_err(|err| {
            SourceLoadError::io_failure(locator, format!("failed reading body: {err}"))
                .with_source(err)
        })
    }
}

fn status_error(locator: &str, status: StatusCode) -> Option<SourceLoadError> {
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
        Some(SourceLoadError::not_found(
            locator,
            format!("server answered {status}"),
        ))
    } else if !status.is_success() {
        Some(SourceLoadError::io_failure(
            locator,
            format!("unexpected http status {status}"),
        ))
    } else {
        None
    }
}
