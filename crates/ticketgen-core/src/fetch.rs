use crate::document::Document;
use crate::error::{FetchError, GenError, Result};
use crate::template::Template;
use base64::Engine as _;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;
use tracing::debug;

/// Anything that can turn an item identifier into a parsed document.
pub trait ItemSource {
    fn fetch(&self, id: &str) -> std::result::Result<Document, FetchError>;
}

impl<T: ItemSource + ?Sized> ItemSource for &T {
    fn fetch(&self, id: &str) -> std::result::Result<Document, FetchError> {
        (**self).fetch(id)
    }
}

impl<T: ItemSource + ?Sized> ItemSource for Box<T> {
    fn fetch(&self, id: &str) -> std::result::Result<Document, FetchError> {
        (**self).fetch(id)
    }
}

/// `Basic <base64(username:password)>` with the credentials encoded one byte
/// per character (ISO-8859-1). Characters outside Latin-1 become `?`.
pub fn basic_auth_header(username: &str, password: &str) -> String {
    let bytes: Vec<u8> = format!("{username}:{password}")
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

/// Fetches items over HTTP with a static basic-auth header. No retries.
pub struct HttpSource {
    client: Client,
    url: Template,
    authorization: String,
}

impl HttpSource {
    pub fn new(
        url_template: &str,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let url = Template::parse("task_url", url_template, 1)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url,
            authorization: basic_auth_header(username, password),
        })
    }

    pub fn url_for(&self, id: &str) -> String {
        self.url.render(&[Some(id)])
    }
}

impl ItemSource for HttpSource {
    fn fetch(&self, id: &str) -> std::result::Result<Document, FetchError> {
        let url = self.url_for(id);
        debug!(%id, %url, "fetching item");

        let transport = |e: reqwest::Error| FetchError::Transport {
            id: id.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                id: id.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(transport)?;
        Document::parse(&body).map_err(|source| FetchError::Parse {
            id: id.to_string(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
