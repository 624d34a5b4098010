//! One batch pass from the mailbox into the sheet.

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::dedup::DedupIndex;
use crate::error::Result;
use crate::models::{Message, Record};
use crate::normalize::normalize;

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub ids: Vec<String>,
    pub next_page_token: Option<String>,
}

#[async_trait]
pub trait MailSource: Send + Sync {
    async fn search(&self, query: &str, page_token: Option<&str>) -> Result<SearchPage>;
    async fn get(&self, id: &str) -> Result<Message>;
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All rows in the configured range, header included.
    async fn read(&self) -> Result<Vec<Vec<String>>>;
    async fn append(&self, rows: Vec<Vec<String>>) -> Result<()>;
}

/// Builds the provider search expression for the trailing window with all
/// whitespace runs collapsed.
pub fn search_expression(window_days: u32, query: &str) -> String {
    format!("newer_than:{}d {}", window_days, query)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Default)]
pub struct SyncSummary {
    /// Message ids returned by the search.
    pub candidates: usize,
    /// Candidates dropped because their key was already known.
    pub skipped: usize,
    /// Rows written to the store. Zero on a dry run.
    pub appended: usize,
    /// Records produced by this run, written or not.
    pub records: Vec<Record>,
    /// Set when the mail source failed part-way through.
    pub mail_error: Option<String>,
}

pub struct Orchestrator<M, S> {
    mail: M,
    store: S,
    query: String,
    dry_run: bool,
}

impl<M: MailSource, S: RecordStore> Orchestrator<M, S> {
    pub fn new(mail: M, store: S, query: impl Into<String>) -> Self {
        Self {
            mail,
            store,
            query: query.into(),
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn mail(&self) -> &M {
        &self.mail
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn sync(&self) -> Result<SyncSummary> {
        let existing = self.store.read().await?;
        let mut index = DedupIndex::build(&existing);
        info!("Loaded {} known message ids from the sheet", index.len());

        let mut summary = SyncSummary::default();
        if let Err(e) = self.collect(&mut index, &mut summary).await {
            // Records gathered before the failure are still written below.
            error!("{}", e);
            summary.mail_error = Some(e.to_string());
        }

        if summary.records.is_empty() {
            info!("No new confirmations");
            return Ok(summary);
        }

        if self.dry_run {
            info!("Dry run, skipping append of {} rows", summary.records.len());
            return Ok(summary);
        }

        let rows = summary.records.iter().cloned().map(Record::into_row).collect();
        self.store.append(rows).await?;
        summary.appended = summary.records.len();
        info!("Appended {} rows", summary.appended);
        Ok(summary)
    }

    async fn collect(&self, index: &mut DedupIndex, summary: &mut SyncSummary) -> Result<()> {
        let ids = self.search_all().await?;
        summary.candidates = ids.len();
        info!("Search matched {} messages", ids.len());

        for id in &ids {
            let message = self.mail.get(id).await?;
            let key = message.dedup_key();
            if !index.insert(key) {
                debug!("Skipping {} (already recorded as {})", id, key);
                summary.skipped += 1;
                continue;
            }
            summary.records.push(normalize(&message));
        }
        Ok(())
    }

    /// Walks every result page before anything is fetched.
    async fn search_all(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.mail.search(&self.query, page_token.as_deref()).await?;
            debug!(
                "Search page: {} ids, next_page={}",
                page.ids.len(),
                page.next_page_token.is_some()
            );
            if page.ids.is_empty() {
                break;
            }
            ids.extend(page.ids);
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_expression_collapses_whitespace() {
        let query = "\n(subject:(\"application received\"\n   OR \"thanks for applying\")\n OR \"We received your application\")\n";
        assert_eq!(
            search_expression(90, query),
            "newer_than:90d (subject:(\"application received\" OR \"thanks for applying\") OR \"We received your application\")"
        );
    }
}
