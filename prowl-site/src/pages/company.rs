use super::{element_attr, optional_element, optional_text};
use crate::parse;
use anyhow::Result;
use prowl_common::settings::{SiteSettings, Timeouts};
use prowl_drivers::browser::page::Page;

pub const NAME_SELECTOR: &str = ".org-top-card-summary__title";
pub const TAGLINE_SELECTOR: &str = ".org-top-card-summary__tagline";
pub const OVERFLOW_MENU_SELECTOR: &str = ".org-top-card-overflow .artdeco-dropdown";
pub const OVERFLOW_LINK_SELECTOR: &str = ".artdeco-dropdown__content-inner a";
pub const PRIMARY_ACTION_LINK_SELECTOR: &str = ".org-top-card-primary-actions__inner a";
pub const INDUSTRY_SELECTOR: &str = ".org-about-company-module__industry";
pub const SIZE_SELECTOR: &str = ".org-about-company-module__company-size-definition-text";
pub const HEADQUARTERS_SELECTOR: &str = ".org-about-company-module__headquarters";

/// Icon markup identifying the external website entry of the overflow menu.
const EXTERNAL_LINK_ICON: &str = "link-external-medium";
const EXTERNAL_ACTION_CLASS: &str = "org-top-card-primary-actions__external-link";

pub fn company_path(slug: &str) -> String {
    format!("company/{slug}/")
}

pub struct CompanyDetailPage<'a> {
    page: &'a dyn Page,
    site: &'a SiteSettings,
}

impl<'a> CompanyDetailPage<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteSettings) -> Self {
        Self { page, site }
    }

    pub async fn open(&self, slug: &str) -> Result<()> {
        self.page.goto(&self.site.url(&company_path(slug))).await
    }

    pub async fn slug(&self) -> Option<String> {
        let url = self.page.current_url().await.ok()?;
        parse::slug_after(&url, "company/")
    }

    pub async fn name(&self) -> Option<String> {
        optional_text(self.page, NAME_SELECTOR, self.site.timeouts.field_wait()).await
    }

    pub async fn description(&self) -> Option<String> {
        optional_text(self.page, TAGLINE_SELECTOR, self.site.timeouts.field_wait()).await
    }

    /// External website. The overflow menu is tried first, then the primary
    /// action bar.
    pub async fn website(&self) -> Option<String> {
        if let Some(url) = self.website_from_overflow_menu().await {
            return Some(url);
        }
        self.link_whose_markup_contains(PRIMARY_ACTION_LINK_SELECTOR, EXTERNAL_ACTION_CLASS)
            .await
    }

    async fn website_from_overflow_menu(&self) -> Option<String> {
        let menu =
            optional_element(self.page, OVERFLOW_MENU_SELECTOR, self.site.timeouts.field_wait())
                .await?;
        menu.click().await.ok()?;
        self.page
            .pause(Timeouts::ms(self.site.timeouts.dropdown_settle))
            .await;
        self.link_whose_markup_contains(OVERFLOW_LINK_SELECTOR, EXTERNAL_LINK_ICON)
            .await
    }

    async fn link_whose_markup_contains(&self, selector: &str, needle: &str) -> Option<String> {
        optional_element(self.page, selector, self.site.timeouts.field_wait()).await?;
        for link in self.page.query_all(selector).await.ok()? {
            let Ok(html) = link.inner_html().await else {
                continue;
            };
            if html.contains(needle) {
                if let Some(href) = element_attr(link.as_ref(), "href").await {
                    return Some(href);
                }
            }
        }
        None
    }

    pub async fn industry(&self) -> Option<String> {
        optional_text(self.page, INDUSTRY_SELECTOR, self.site.timeouts.field_wait()).await
    }

    pub async fn company_size(&self) -> Option<String> {
        optional_text(self.page, SIZE_SELECTOR, self.site.timeouts.field_wait()).await
    }

    pub async fn headquarters(&self) -> Option<String> {
        optional_text(self.page, HEADQUARTERS_SELECTOR, self.site.timeouts.field_wait()).await
    }
}
