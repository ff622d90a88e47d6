//! Bibliographic record lookup for a resolved identifier.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::identifiers::Identifier;

pub const CROSSREF_ENDPOINT: &str = "https://api.crossref.org/works";
pub const DOI_RESOLVER: &str = "https://doi.org";
pub const MIMETYPE_BIBTEX: &str = "application/x-bibtex";

/// Default per-request timeout for citation lookups.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// DataCite prefix under which arXiv registers a DOI for every preprint.
const ARXIV_DOI_PREFIX: &str = "10.48550/arXiv.";

#[derive(Error, Debug)]
pub enum CitationError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("no record for {0}")]
    NotFound(String),
    #[error("HTTP {status}")]
    Http { status: u16 },
    #[error("empty response")]
    EmptyResponse,
}

/// A service that turns an identifier into a formatted citation record.
pub trait CitationSource: Send + Sync {
    /// The canonical name of this service (e.g., "CrossRef").
    fn name(&self) -> &str;

    fn fetch<'a>(
        &'a self,
        id: &'a Identifier,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, CitationError>> + Send + 'a>>;
}

/// BibTeX lookup via the CrossRef transform API, with arXiv preprints
/// resolved through their DataCite DOI on doi.org.
#[derive(Debug, Clone, Default)]
pub struct CrossRef {
    pub mailto: Option<String>,
}

impl CrossRef {
    pub fn new(mailto: Option<String>) -> Self {
        Self { mailto }
    }

    /// CrossRef asks polite clients to identify themselves with a contact address.
    pub fn user_agent(&self) -> String {
        let base = format!("pdfdoi/{}", env!("CARGO_PKG_VERSION"));
        match &self.mailto {
            Some(email) => format!("{} (mailto:{})", base, email),
            None => base,
        }
    }

    /// The URL serving a BibTeX record for `id`.
    pub fn bibtex_url(id: &Identifier) -> String {
        match id {
            Identifier::Doi(doi) => {
                format!("{}/{}/transform/{}", CROSSREF_ENDPOINT, doi, MIMETYPE_BIBTEX)
            }
            Identifier::Arxiv(arxiv_id) => {
                format!("{}/{}{}", DOI_RESOLVER, ARXIV_DOI_PREFIX, arxiv_id)
            }
        }
    }
}

impl CitationSource for CrossRef {
    fn name(&self) -> &str {
        "CrossRef"
    }

    fn fetch<'a>(
        &'a self,
        id: &'a Identifier,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, CitationError>> + Send + 'a>> {
        Box::pin(async move {
            let url = Self::bibtex_url(id);
            tracing::debug!(%id, url = %url, "fetching citation");

            let resp = client
                .get(&url)
                .header("User-Agent", self.user_agent())
                .header("Accept", MIMETYPE_BIBTEX)
                .timeout(timeout)
                .send()
                .await?;

            read_record(id, resp).await
        })
    }
}

/// Map a lookup response to the record body or an error.
async fn read_record(id: &Identifier, resp: reqwest::Response) -> Result<String, CitationError> {
    let status = resp.status();
    if status.as_u16() == 404 {
        return Err(CitationError::NotFound(id.to_string()));
    }
    if !status.is_success() {
        return Err(CitationError::Http {
            status: status.as_u16(),
        });
    }

    let body = resp.text().await?;
    let body = body.trim();
    if body.is_empty() {
        return Err(CitationError::EmptyResponse);
    }
    Ok(body.to_string())
}
