//! Per-session corpus and derived view.

use super::engine::{Aggregator, today};
use crate::models::{EnhancedArticle, FilterCriteria, ScoringMode, SortOption};
use crate::pipeline::{available_journals, deduplicate, derive_view, merge_into_corpus};

/// Search state owned by one client session.
///
/// `all_articles` is the accumulated, deduplicated corpus; `filtered_articles` is
/// always derived from it with the current filters and sort option. Both are replaced
/// wholesale on every change.
#[derive(Debug, Clone)]
pub struct SearchSession {
    query: Option<String>,
    page: u32,
    scoring_mode: Option<ScoringMode>,
    all_articles: Vec<EnhancedArticle>,
    filtered_articles: Vec<EnhancedArticle>,
    sort_option: SortOption,
    filters: FilterCriteria,
    available_journals: Vec<String>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: None,
            page: 1,
            scoring_mode: None,
            all_articles: Vec::new(),
            filtered_articles: Vec::new(),
            sort_option: SortOption::default(),
            filters: FilterCriteria::default(),
            available_journals: Vec::new(),
        }
    }

    /// Run page `page` of `query`.
    ///
    /// A fresh search replaces the corpus; with `is_load_more` the page is merged into
    /// the existing corpus and only unseen articles are appended. Returns the number of
    /// articles added.
    pub async fn run(
        &mut self,
        aggregator: &Aggregator,
        query: &str,
        page: u32,
        is_load_more: bool,
        scoring_mode: Option<ScoringMode>,
    ) -> usize {
        let ranked = aggregator.search_page(query, page, scoring_mode).await;
        let ranked = deduplicate(ranked);

        let added = if is_load_more {
            let survivors = merge_into_corpus(&self.all_articles, ranked);
            let added = survivors.len();
            let mut corpus = Vec::with_capacity(self.all_articles.len() + added);
            corpus.extend(self.all_articles.iter().cloned());
            corpus.extend(survivors);
            self.all_articles = corpus;
            added
        } else {
            let added = ranked.len();
            self.all_articles = ranked;
            added
        };

        self.query = Some(query.to_string());
        self.page = page;
        self.scoring_mode = scoring_mode;
        self.available_journals = available_journals(&self.all_articles);
        self.refresh_view();

        tracing::info!(
            query = %query,
            page,
            load_more = is_load_more,
            added,
            corpus = self.all_articles.len(),
            visible = self.filtered_articles.len(),
            "Session updated"
        );
        added
    }

    /// Fresh search: page 1, corpus replaced.
    pub async fn search(
        &mut self,
        aggregator: &Aggregator,
        query: &str,
        scoring_mode: Option<ScoringMode>,
    ) -> usize {
        self.run(aggregator, query, 1, false, scoring_mode).await
    }

    /// Next page of the current query. `None` when no search has run.
    pub async fn load_more(&mut self, aggregator: &Aggregator) -> Option<usize> {
        let query = self.query.clone()?;
        let next_page = self.page.saturating_add(1);
        Some(self.run(aggregator, &query, next_page, true, self.scoring_mode).await)
    }

    /// Reorder the view. Scores are untouched.
    pub fn set_sort(&mut self, option: SortOption) {
        self.sort_option = option;
        self.refresh_view();
    }

    /// Replace the filters and recompute the view.
    pub fn apply_filters(&mut self, criteria: FilterCriteria) {
        self.filters = criteria;
        self.refresh_view();
    }

    /// Drop every filter and recompute the view.
    pub fn clear_filters(&mut self) {
        self.filters = FilterCriteria::default();
        self.refresh_view();
    }

    /// Empty the session. The sort option is kept.
    pub fn clear(&mut self) {
        let sort_option = self.sort_option;
        *self = Self::new();
        self.sort_option = sort_option;
        tracing::info!("Session cleared");
    }

    /// Replace the corpus directly, as after a fresh search.
    pub fn replace_corpus(&mut self, query: &str, articles: Vec<EnhancedArticle>) {
        self.all_articles = deduplicate(articles);
        self.query = Some(query.to_string());
        self.page = 1;
        self.available_journals = available_journals(&self.all_articles);
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        self.filtered_articles =
            derive_view(&self.all_articles, &self.filters, self.sort_option, today());
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn all_articles(&self) -> &[EnhancedArticle] {
        &self.all_articles
    }

    #[must_use]
    pub fn filtered_articles(&self) -> &[EnhancedArticle] {
        &self.filtered_articles
    }

    #[must_use]
    pub const fn sort_option(&self) -> SortOption {
        self.sort_option
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    #[must_use]
    pub fn filters_active(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Distinct venues of the corpus, without the placeholder.
    #[must_use]
    pub fn available_journals(&self) -> &[String] {
        &self.available_journals
    }

    /// Corpus article whose DOI matches `doi` after normalization.
    #[must_use]
    pub fn find_by_doi(&self, doi: &str) -> Option<&EnhancedArticle> {
        let wanted = crate::pipeline::normalize_doi(doi)?;
        self.all_articles
            .iter()
            .find(|a| crate::pipeline::normalize_doi(&a.article.doi).as_deref() == Some(wanted.as_str()))
    }
}
