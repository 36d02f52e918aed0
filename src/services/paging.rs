//! Paginated list fetching.
//!
//! Both platforms expose list endpoints that return a JSON array per page.
//! GitHub pages by number (`page`, `per_page`); the HuggingFace Hub pages by
//! offset (`offset`, `limit`). Either way the walk stops at the first page
//! that comes back shorter than the requested size, or at a page that starts
//! with the same item as the one before it (the server ignored the cursor).

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::utils::ApiClient;

type QueryFn = Box<dyn Fn(u32) -> Vec<(&'static str, String)> + Send + Sync>;

/// Configuration for a paginated fetch operation.
pub struct PaginatedFetchConfig {
    /// Label used in logs and errors (e.g. "GitHub repositories").
    pub context: String,
    /// API path of the list endpoint.
    pub path: String,
    /// Items requested per page.
    pub page_size: usize,
    /// Builds the query for a zero-based page index.
    query_fn: QueryFn,
}

impl PaginatedFetchConfig {
    /// Page-numbered endpoint (`page` starts at 1).
    pub fn numbered(
        context: impl Into<String>,
        path: impl Into<String>,
        per_page: usize,
        base_query: Vec<(&'static str, String)>,
    ) -> Self {
        Self {
            context: context.into(),
            path: path.into(),
            page_size: per_page,
            query_fn: Box::new(move |index| {
                let mut query = base_query.clone();
                query.push(("per_page", per_page.to_string()));
                query.push(("page", (index + 1).to_string()));
                query
            }),
        }
    }

    /// Offset-based endpoint (`offset` advances by `limit`).
    pub fn offset(
        context: impl Into<String>,
        path: impl Into<String>,
        limit: usize,
        base_query: Vec<(&'static str, String)>,
    ) -> Self {
        Self {
            context: context.into(),
            path: path.into(),
            page_size: limit,
            query_fn: Box::new(move |index| {
                let mut query = base_query.clone();
                query.push(("limit", limit.to_string()));
                query.push(("offset", (index as usize * limit).to_string()));
                query
            }),
        }
    }

    /// Query parameters for a zero-based page index.
    pub fn query(&self, index: u32) -> Vec<(&'static str, String)> {
        (self.query_fn)(index)
    }
}

/// Result of a paginated fetch operation.
#[derive(Debug)]
pub struct PaginatedFetchResult<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
}

impl ApiClient {
    /// Fetch every page of a list endpoint, in order.
    pub async fn fetch_pages<T: DeserializeOwned>(
        &self,
        config: &PaginatedFetchConfig,
    ) -> Result<PaginatedFetchResult<T>> {
        let mut items: Vec<T> = Vec::new();
        let mut previous_first: Option<Value> = None;
        let mut index = 0u32;

        loop {
            let query = config.query(index);
            let page: Vec<Value> = self.get_json(&config.path, &query, &config.context).await?;
            let count = page.len();

            if count > 0 && previous_first.as_ref() == page.first() {
                log::warn!(
                    "Page {} of {} repeats the previous page, stopping",
                    index + 1,
                    config.context
                );
                break;
            }
            previous_first = page.first().cloned();

            for raw in page {
                let item = serde_json::from_value(raw)
                    .map_err(|e| AppError::malformed(config.context.as_str(), e))?;
                items.push(item);
            }

            log::info!(
                "Fetched page {} ({} {})",
                index + 1,
                count,
                config.context
            );

            // Empty and partial pages both end the walk
            if count < config.page_size {
                break;
            }
            index += 1;
        }

        Ok(PaginatedFetchResult {
            items,
            pages_fetched: index + 1,
        })
    }
}
