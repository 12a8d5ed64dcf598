use super::{child_text, element_text};
use crate::model::DateFilter;
use crate::parse;
use anyhow::{Context, Result};
use prowl_common::settings::{SiteLocale, SiteSettings, Timeouts};
use prowl_drivers::browser::page::{DomElement, Key, Page};
use tracing::debug;

pub const SEARCH_PATH: &str = "jobs/search/";
pub const DATE_FILTER_SELECTOR: &str = "#searchFilter_timePostedRange";
pub const RESULTS_CONTAINER_SELECTOR: &str = ".scaffold-layout__list";
pub const CARD_SELECTOR: &str = ".job-card-container";
pub const CARD_TITLE_SELECTOR: &str = "strong";
pub const CARD_COMPANY_SELECTOR: &str = ".artdeco-entity-lockup__subtitle";
pub const CARD_METADATA_SELECTOR: &str = ".job-card-container__metadata-wrapper li";
pub const CARD_ID_ATTRIBUTE: &str = "data-job-id";

pub fn search_input_selector(locale: &SiteLocale) -> String {
    format!(r#"input[aria-label="{}"]"#, locale.search_input_label)
}

pub fn location_input_selector(locale: &SiteLocale) -> String {
    format!(r#"input[aria-label="{}"]"#, locale.location_input_label)
}

pub fn next_page_selector(locale: &SiteLocale) -> String {
    format!(r#"button[aria-label="{}"]"#, locale.next_page_label)
}

/// The job search page and its result list.
pub struct JobSearchPage<'a> {
    page: &'a dyn Page,
    site: &'a SiteSettings,
}

impl<'a> JobSearchPage<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteSettings) -> Self {
        Self { page, site }
    }

    fn timeouts(&self) -> &Timeouts {
        &self.site.timeouts
    }

    pub async fn open(&self) -> Result<()> {
        self.page.goto(&self.site.url(SEARCH_PATH)).await
    }

    pub async fn fill_query(&self, query: &str) -> Result<()> {
        self.fill_input(&search_input_selector(&self.site.locale), query)
            .await
            .context("keyword input")
    }

    pub async fn fill_location(&self, location: &str) -> Result<()> {
        self.fill_input(&location_input_selector(&self.site.locale), location)
            .await
            .context("location input")
    }

    async fn fill_input(&self, selector: &str, value: &str) -> Result<()> {
        self.page
            .wait_for(selector, self.timeouts().page_wait())
            .await?;
        self.page.fill(selector, value).await?;
        self.page
            .pause(Timeouts::ms(self.timeouts().input_settle))
            .await;
        Ok(())
    }

    pub async fn submit(&self) -> Result<()> {
        self.page.press(Key::Enter).await?;
        self.page
            .pause(Timeouts::ms(self.timeouts().search_settle))
            .await;
        Ok(())
    }

    /// Select a "date posted" option by keyboard: the dropdown offers no
    /// stable input to set directly.
    pub async fn apply_date_filter(&self, filter: DateFilter) -> Result<()> {
        let t = self.timeouts();
        let step = Timeouts::ms(t.filter_step);

        self.page
            .click(DATE_FILTER_SELECTOR)
            .await
            .context("date filter control")?;
        self.page.pause(Timeouts::ms(t.filter_open)).await;

        for key in [Key::Tab, Key::Tab] {
            self.page.press(key).await?;
            self.page.pause(step).await;
        }
        for _ in 0..filter.arrow_presses() {
            self.page.press(Key::ArrowDown).await?;
            self.page.pause(step).await;
        }
        for key in [Key::Tab, Key::Tab] {
            self.page.press(key).await?;
            self.page.pause(step).await;
        }
        self.page.press(Key::Enter).await?;
        self.page.pause(Timeouts::ms(t.filter_open)).await;
        debug!(target: "prowl.search", %filter, "date filter applied");
        Ok(())
    }

    /// Wait for the result list, then scroll it in fixed steps so lazily
    /// rendered cards mount.
    pub async fn scroll_results(&self) -> Result<()> {
        let t = self.timeouts();
        self.page
            .wait_for(RESULTS_CONTAINER_SELECTOR, t.page_wait())
            .await
            .context("result list")?;
        self.page.pause(Timeouts::ms(t.scroll_pause)).await;

        for _ in 0..t.scroll_steps {
            self.page
                .scroll_by(RESULTS_CONTAINER_SELECTOR, t.scroll_increment)
                .await?;
            self.page.pause(Timeouts::ms(t.scroll_pause)).await;
        }
        Ok(())
    }

    /// Cards currently mounted in the result list.
    pub async fn cards(&self) -> Result<Vec<JobSearchResultCard<'a>>> {
        let site: &'a SiteSettings = self.site;
        let elements = self.page.query_all(CARD_SELECTOR).await?;
        Ok(elements
            .into_iter()
            .map(|element| JobSearchResultCard::new(element, &site.locale))
            .collect())
    }

    /// A usable "next page" control exists. A rendered but disabled control
    /// counts as absent.
    pub async fn has_next_page(&self) -> bool {
        let selector = next_page_selector(&self.site.locale);
        match self.page.query(&selector).await {
            Ok(Some(button)) => !matches!(button.attr("disabled").await, Ok(Some(_))),
            Ok(None) => false,
            Err(err) => {
                debug!(target: "prowl.search", error = %err, "next page lookup failed");
                false
            }
        }
    }

    pub async fn go_to_next_page(&self) -> Result<()> {
        self.page
            .click(&next_page_selector(&self.site.locale))
            .await?;
        self.page
            .pause(Timeouts::ms(self.timeouts().next_page_settle))
            .await;
        Ok(())
    }
}

/// One result card in the search list.
pub struct JobSearchResultCard<'a> {
    element: Box<dyn DomElement>,
    locale: &'a SiteLocale,
}

impl<'a> JobSearchResultCard<'a> {
    pub fn new(element: Box<dyn DomElement>, locale: &'a SiteLocale) -> Self {
        Self { element, locale }
    }

    /// The posting id. Unlike every other card field this is required: it is
    /// the key callers join detail lookups on.
    pub async fn id(&self) -> std::result::Result<u64, String> {
        let raw = self
            .element
            .attr(CARD_ID_ATTRIBUTE)
            .await
            .map_err(|e| format!("{CARD_ID_ATTRIBUTE} unreadable: {e}"))?;
        parse::parse_card_id(raw.as_deref())
    }

    pub async fn title(&self) -> Option<String> {
        child_text(self.element.as_ref(), CARD_TITLE_SELECTOR).await
    }

    pub async fn company_name(&self) -> Option<String> {
        child_text(self.element.as_ref(), CARD_COMPANY_SELECTOR).await
    }

    pub async fn metadata_items(&self) -> Vec<String> {
        let Ok(items) = self.element.find_all(CARD_METADATA_SELECTOR).await else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if let Some(text) = item.text().await.ok().as_deref().and_then(parse::clean_text) {
                out.push(text);
            }
        }
        out
    }

    pub async fn created_at(&self) -> Option<String> {
        let html = self.element.inner_html().await.ok()?;
        parse::parse_created_at(&html)
    }

    pub async fn is_simple_application(&self) -> bool {
        element_text(self.element.as_ref())
            .await
            .is_some_and(|text| text.contains(&self.locale.simple_application_marker))
    }
}
