use super::optional_text;
use crate::parse;
use anyhow::Result;
use prowl_common::settings::SiteSettings;
use prowl_drivers::browser::page::Page;

pub const NAME_SELECTOR: &str = "h1";
pub const ROLE_SELECTOR: &str = ".text-body-medium.break-words";
pub const LOCATION_SELECTOR: &str = ".text-body-small.inline.t-black--light.break-words";

pub fn profile_path(slug: &str) -> String {
    format!("in/{slug}/")
}

/// A member profile page.
pub struct RecruiterDetailPage<'a> {
    page: &'a dyn Page,
    site: &'a SiteSettings,
}

impl<'a> RecruiterDetailPage<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteSettings) -> Self {
        Self { page, site }
    }

    pub async fn open(&self, slug: &str) -> Result<()> {
        self.page.goto(&self.site.url(&profile_path(slug))).await
    }

    pub async fn current_url(&self) -> Option<String> {
        self.page.current_url().await.ok()
    }

    pub async fn slug(&self) -> Option<String> {
        let url = self.current_url().await?;
        parse::slug_after(&url, "in/")
    }

    pub async fn name(&self) -> Option<String> {
        optional_text(self.page, NAME_SELECTOR, self.site.timeouts.field_wait()).await
    }

    pub async fn role(&self) -> Option<String> {
        optional_text(self.page, ROLE_SELECTOR, self.site.timeouts.field_wait()).await
    }

    pub async fn location(&self) -> Option<String> {
        optional_text(self.page, LOCATION_SELECTOR, self.site.timeouts.field_wait()).await
    }
}
