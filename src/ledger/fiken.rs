use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;

use super::{DateWindow, Ledger};
use crate::error::{KassaflytError, Result};
use crate::models::{JournalEntry, Transaction};

const PAGE_SIZE: usize = 100;
const PAGE_COUNT_HEADER: &str = "Fiken-Api-Page-Count";
const ATTEMPTS: u32 = 3;

/// Blocking client for the Fiken v2 REST API.
pub struct FikenClient {
    http: Client,
    base_url: String,
    company_slug: String,
    token: String,
    attempts: u32,
    pause: Duration,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Page {
    Bare(Vec<JournalEntry>),
    Wrapped { items: Vec<JournalEntry> },
}

impl Page {
    fn into_entries(self) -> Vec<JournalEntry> {
        match self {
            Page::Bare(entries) => entries,
            Page::Wrapped { items } => items,
        }
    }
}

impl FikenClient {
    pub fn new(base_url: &str, company_slug: &str, token: &str) -> Result<Self> {
        if company_slug.is_empty() {
            return Err(KassaflytError::Settings(
                "no company slug configured; run `kassaflyt init` or pass --company".to_string(),
            ));
        }
        if token.is_empty() {
            return Err(KassaflytError::Settings(
                "no API token configured; set FIKEN_TOKEN or run `kassaflyt init`".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| KassaflytError::Other(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            company_slug: company_slug.to_string(),
            token: token.to_string(),
            attempts: ATTEMPTS,
            pause: Duration::from_secs(1),
        })
    }

    fn company_url(&self, path: &str) -> String {
        format!("{}/companies/{}/{path}", self.base_url, self.company_slug)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| KassaflytError::Settings("API token is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("kassaflyt/", env!("CARGO_PKG_VERSION"))),
        );
        if let Ok(id) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
            headers.insert("X-Request-ID", id);
        }
        Ok(headers)
    }

    /// GET with a fixed number of attempts and a pause between them.
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        let mut last_error = String::new();
        for attempt in 1..=self.attempts {
            let sent = self
                .http
                .get(url)
                .headers(self.headers()?)
                .query(query)
                .send()
                .and_then(|resp| resp.error_for_status());
            match sent {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    tracing::warn!(attempt, url, error = %e, "request failed");
                    last_error = e.to_string();
                    if attempt < self.attempts {
                        std::thread::sleep(self.pause);
                    }
                }
            }
        }
        Err(KassaflytError::Fetch {
            url: url.to_string(),
            cause: last_error,
        })
    }
}

impl Ledger for FikenClient {
    fn list_journal_entries(&self, window: &DateWindow) -> Result<Vec<JournalEntry>> {
        let url = self.company_url("journalEntries");
        let mut all = Vec::new();
        let mut page = 0usize;

        loop {
            let query = [
                ("dateGe", window.from.to_string()),
                ("dateLe", window.to.to_string()),
                ("page", page.to_string()),
                ("pageSize", PAGE_SIZE.to_string()),
            ];
            let resp = self.get(&url, &query)?;
            let total_pages = resp
                .headers()
                .get(PAGE_COUNT_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(1);
            let body: Page = resp.json().map_err(|e| KassaflytError::Fetch {
                url: url.clone(),
                cause: format!("invalid journal entry page {page}: {e}"),
            })?;
            let entries = body.into_entries();
            tracing::debug!(page, total_pages, count = entries.len(), "fetched journal entry page");
            all.extend(entries);

            if page + 1 >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    fn get_transaction(&self, id: i64) -> Result<Transaction> {
        let url = self.company_url(&format!("transactions/{id}"));
        let resp = self.get(&url, &[])?;
        resp.json().map_err(|e| KassaflytError::Fetch {
            url,
            cause: format!("invalid transaction body: {e}"),
        })
    }
}
