//! The page-fetching contract the scraper is written against.

use std::future::Future;

use crate::{form::FormPayload, Client};

/// Fetches a page, either with a GET (no form) or a urlencoded POST.
///
/// Implementations never fail loudly: any transport problem is logged and
/// reported as `None`, leaving the caller to decide whether the missing
/// page is fatal.
pub trait Fetcher {
    fn fetch(&self, url: &str, form: Option<&FormPayload>) -> impl Future<Output = Option<String>>;
}

impl Fetcher for Client {
    async fn fetch(&self, url: &str, form: Option<&FormPayload>) -> Option<String> {
        let result = match form {
            Some(form) => {
                tracing::debug!("POST {} ({} fields)", url, form.len());
                self.post_form(url, form).await
            }
            None => {
                tracing::debug!("GET {}", url);
                self.get_html(url).await
            }
        };
        match result {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::error!("Request error for {}: {}", url, e);
                None
            }
        }
    }
}
