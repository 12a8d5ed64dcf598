//! Search result pagination.
use crate::factory;
use crate::model::{JobPostingListingItem, SearchQuery};
use crate::pages::JobSearchPage;
use prowl_common::settings::SiteSettings;
use prowl_common::{Identity, Operation, ProwlError, Result};
use prowl_drivers::browser::page::Page;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// Where a search run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Searching,
    /// 1-based result page being read.
    ListingPage(u32),
    Done,
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchState::Idle => f.write_str("idle"),
            SearchState::Searching => f.write_str("searching"),
            SearchState::ListingPage(n) => write!(f, "page {n}"),
            SearchState::Done => f.write_str("done"),
        }
    }
}

/// Why a run stopped paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FirstPageOnly,
    EmptyPage,
    PageCap,
    NoNextPage,
}

/// Drives one search: submit, then read result pages until a stop condition.
///
/// Stops on the first of: `limit_to_first_page`, a page with no cards, the
/// `max_pages` cap, or no usable "next page" control.
pub struct SearchController<'a> {
    search: JobSearchPage<'a>,
    max_pages: u32,
    state: SearchState,
    transitions: Vec<SearchState>,
    stop_reason: Option<StopReason>,
}

impl<'a> SearchController<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteSettings) -> Self {
        Self {
            search: JobSearchPage::new(page, site),
            max_pages: site.max_pages.max(1),
            state: SearchState::Idle,
            transitions: vec![SearchState::Idle],
            stop_reason: None,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn transitions(&self) -> &[SearchState] {
        &self.transitions
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    fn enter(&mut self, next: SearchState) {
        debug!(target: "prowl.search", from = %self.state, to = %next, "transition");
        self.state = next;
        self.transitions.push(next);
    }

    /// Run the search to completion. Items keep page order; an id already
    /// seen on an earlier page is skipped.
    pub async fn run(
        &mut self,
        identity: &Identity,
        query: &SearchQuery,
    ) -> Result<Vec<JobPostingListingItem>> {
        let nav = |stage| ProwlError::navigation(Operation::SearchJobs, identity, stage);

        self.enter(SearchState::Searching);
        self.search.open().await.map_err(nav("open search page"))?;
        self.search
            .fill_query(&query.query)
            .await
            .map_err(nav("fill search query"))?;
        self.search
            .fill_location(&query.location)
            .await
            .map_err(nav("fill search location"))?;
        self.search.submit().await.map_err(nav("submit search"))?;
        if let Some(filter) = query.date_filter {
            self.search
                .apply_date_filter(filter)
                .await
                .map_err(nav("apply date filter"))?;
        }

        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut page_no = 1;

        loop {
            self.enter(SearchState::ListingPage(page_no));
            self.search
                .scroll_results()
                .await
                .map_err(nav("load result list"))?;

            let cards = self.search.cards().await.map_err(nav("enumerate cards"))?;
            let card_count = cards.len();
            for card in &cards {
                let item = factory::listing_item_from_card(card).await.map_err(|detail| {
                    ProwlError::JoinKey {
                        operation: Operation::SearchJobs,
                        identity: identity.clone(),
                        detail,
                    }
                })?;
                if seen.insert(item.id) {
                    items.push(item);
                } else {
                    debug!(target: "prowl.search", id = item.id, page = page_no, "duplicate listing skipped");
                }
            }
            debug!(target: "prowl.search", page = page_no, cards = card_count, "result page read");

            let stop = if query.limit_to_first_page {
                Some(StopReason::FirstPageOnly)
            } else if card_count == 0 {
                Some(StopReason::EmptyPage)
            } else if page_no >= self.max_pages {
                Some(StopReason::PageCap)
            } else if !self.search.has_next_page().await {
                Some(StopReason::NoNextPage)
            } else {
                None
            };

            if let Some(reason) = stop {
                self.stop_reason = Some(reason);
                break;
            }

            self.search
                .go_to_next_page()
                .await
                .map_err(nav("go to next page"))?;
            page_no += 1;
        }

        self.enter(SearchState::Done);
        info!(
            target: "prowl.search",
            %identity,
            pages = page_no,
            items = items.len(),
            reason = ?self.stop_reason,
            "search finished"
        );
        Ok(items)
    }
}
