#![deny(clippy::all, clippy::pedantic)]

use reqwest::{Client, Response, Url};
use serde::Deserialize;
use thiserror::Error;

use hottake_api_types::{CreatePostRequest, ErrorBody, Post, SortMode};

use crate::args::Cli;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("site URL is required (use --site or HOTTAKE_SITE_URL)")]
    MissingSite,
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server error: {0}")]
    Server(String),
    #[error("session state error: {0}")]
    Session(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(site: &str) -> Result<Self, CliError> {
        let base = Url::parse(site)?.join("/")?;
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("hottake-cli/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, path: &str) -> Result<Url, CliError> {
        self.base.join(path).map_err(CliError::Url)
    }

    pub async fn list_posts(
        &self,
        sort: SortMode,
        offset: usize,
        seed: Option<&str>,
    ) -> Result<Vec<Post>, CliError> {
        let mut url = self.url("/posts")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("offset", &offset.to_string());
            pairs.append_pair("sort", sort.as_str());
            if let Some(seed) = seed {
                pairs.append_pair("seed", seed);
            }
        }

        let resp = self.client.get(url).send().await?;
        Self::handle(resp).await
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, CliError> {
        let mut url = self.url("/post")?;
        url.query_pairs_mut().append_pair("postID", id);

        let resp = self.client.get(url).send().await?;
        Self::handle(resp).await
    }

    pub async fn create_post(&self, title: &str) -> Result<Post, CliError> {
        let url = self.url("/post")?;
        let body = CreatePostRequest {
            title: title.to_string(),
        };

        let resp = self.client.post(url).json(&body).send().await?;
        Self::handle(resp).await
    }

    async fn handle<T: for<'de> Deserialize<'de>>(resp: Response) -> Result<T, CliError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            // Error responses carry a `{message}` body; fall back to the
            // raw text when they do not.
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|body| body.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(CliError::Server(format!("status {status}: {message}")));
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| CliError::Server(format!("failed to parse body: {e}")))
    }
}

pub fn build_client_from_cli(cli: &Cli) -> Result<ApiClient, CliError> {
    let site = cli.site.clone().ok_or(CliError::MissingSite)?;
    ApiClient::new(&site)
}
