//! Drives a full run: walk the results pages, then read every case.

use std::time::Duration;

use mdprobate_api::{Client, Endpoints, Fetcher, SearchFilter};

use crate::config::{ScrapeConfig, DEFAULT_DETAIL_DELAY};
use crate::detail::{extract_case_rows, OutputRow};
use crate::error::ScrapeError;
use crate::links::DiscoveredUrls;
use crate::pagination::{PageRequest, PaginationState, Step};

/// Milestones reported while a run is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeProgress {
    /// A results page was read.
    PageRead {
        page: usize,
        new_urls: usize,
        total_urls: usize,
    },
    /// Pagination finished; `selected` cases will be fetched.
    CasesDiscovered { total: usize, selected: usize },
    /// A detail page was handled (`rows` is zero when it could not be fetched).
    CaseScraped {
        index: usize,
        total: usize,
        url: String,
        rows: usize,
    },
}

/// Sequential scraper over any [`Fetcher`].
///
/// One request is in flight at a time. All state lives inside a single
/// call, so a scraper can be reused for several runs.
pub struct ProbateScraper<F> {
    fetcher: F,
    endpoints: Endpoints,
    detail_delay: Duration,
}

impl ProbateScraper<Client> {
    /// Builds the reqwest client described by the config.
    pub fn from_config(config: &ScrapeConfig) -> Result<Self, ScrapeError> {
        let client = config.build_client()?;
        let endpoints = client.endpoints().clone();
        Ok(Self::new(client, endpoints).with_detail_delay(config.detail_delay))
    }
}

impl<F: Fetcher> ProbateScraper<F> {
    pub fn new(fetcher: F, endpoints: Endpoints) -> Self {
        Self {
            fetcher,
            endpoints,
            detail_delay: DEFAULT_DETAIL_DELAY,
        }
    }

    /// Pause between consecutive detail fetches.
    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = delay;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Walks every results page for the filter and returns the distinct
    /// detail URLs in discovery order.
    pub async fn collect_case_urls(
        &self,
        filter: &SearchFilter,
    ) -> Result<DiscoveredUrls, ScrapeError> {
        self.walk_pages(filter, &mut |_| {}).await
    }

    /// Fetches and extracts one detail page. A failed fetch yields no rows.
    pub async fn scrape_case(&self, url: &str) -> Vec<OutputRow> {
        match self.fetcher.fetch(url, None).await {
            Some(html) => {
                let rows = extract_case_rows(&html, url);
                tracing::debug!("Extracted {} row(s) from {}", rows.len(), url);
                rows
            }
            None => {
                tracing::warn!("Skipping case, detail page unavailable: {}", url);
                Vec::new()
            }
        }
    }

    /// Runs the whole search and returns the flattened rows of every case,
    /// keeping only the first `limit` discovered cases when a limit is given.
    pub async fn scrape(
        &self,
        filter: &SearchFilter,
        limit: Option<usize>,
    ) -> Result<Vec<OutputRow>, ScrapeError> {
        self.scrape_with_progress(filter, limit, |_| {}).await
    }

    /// Same as [`scrape`](Self::scrape), reporting milestones as they happen.
    pub async fn scrape_with_progress<P>(
        &self,
        filter: &SearchFilter,
        limit: Option<usize>,
        mut on_progress: P,
    ) -> Result<Vec<OutputRow>, ScrapeError>
    where
        P: FnMut(ScrapeProgress),
    {
        let discovered = self.walk_pages(filter, &mut on_progress).await?;
        let total = discovered.len();
        let urls = discovered.into_limited(limit);
        if urls.len() < total {
            tracing::info!("Record limit applied: {} of {} cases", urls.len(), total);
        }
        on_progress(ScrapeProgress::CasesDiscovered {
            total,
            selected: urls.len(),
        });

        let mut rows = Vec::new();
        for (index, url) in urls.iter().enumerate() {
            if index > 0 && !self.detail_delay.is_zero() {
                tokio::time::sleep(self.detail_delay).await;
            }
            let case_rows = self.scrape_case(url).await;
            on_progress(ScrapeProgress::CaseScraped {
                index: index + 1,
                total: urls.len(),
                url: url.clone(),
                rows: case_rows.len(),
            });
            rows.extend(case_rows);
        }

        tracing::info!("Scraped {} row(s) from {} case(s)", rows.len(), urls.len());
        Ok(rows)
    }

    async fn walk_pages<P>(
        &self,
        filter: &SearchFilter,
        on_progress: &mut P,
    ) -> Result<DiscoveredUrls, ScrapeError>
    where
        P: FnMut(ScrapeProgress),
    {
        let search_url = self.endpoints.search_url();
        let results_base = self.endpoints.results_base()?;
        let mut discovered = DiscoveredUrls::new();
        let mut state = PaginationState::Init;

        tracing::info!(
            "Searching filings {} to {} by {}",
            filter.date_from_str(),
            filter.date_to_str(),
            filter.party_type
        );

        while let Some(request) = state.request(filter) {
            let page = match &state {
                PaginationState::Searched { .. } => Some(1),
                PaginationState::Paging { page, .. } => Some(*page),
                _ => None,
            };
            let response = match &request {
                PageRequest::Get => self.fetcher.fetch(&search_url, None).await,
                PageRequest::Post(form) => self.fetcher.fetch(&search_url, Some(form)).await,
            };

            let Step { state: next, urls } = state.advance(response.as_deref(), &results_base);
            if let Some(page) = page {
                let new_urls = discovered.merge(urls);
                tracing::debug!(
                    "Page {}: {} new link(s), {} total",
                    page,
                    new_urls,
                    discovered.len()
                );
                on_progress(ScrapeProgress::PageRead {
                    page,
                    new_urls,
                    total_urls: discovered.len(),
                });
            }
            state = next;
        }

        match state {
            PaginationState::Failed(failure) => {
                tracing::error!("Pagination failed at {}", failure);
                Err(failure.into())
            }
            PaginationState::Done { pages } => {
                tracing::info!(
                    "Pagination finished after {} page(s), {} case(s) found",
                    pages,
                    discovered.len()
                );
                Ok(discovered)
            }
            other => {
                tracing::warn!("Pagination stopped in non-terminal state {:?}", other);
                Ok(discovered)
            }
        }
    }
}
