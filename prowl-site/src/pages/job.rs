use super::{child_text, element_attr, element_text, optional_element, optional_text};
use crate::model::Hirer;
use crate::parse;
use anyhow::Result;
use prowl_common::settings::{SiteSettings, Timeouts};
use prowl_drivers::browser::page::Page;
use std::collections::HashSet;
use tracing::debug;

pub const NOT_FOUND_SELECTOR: &str = ".jobs-no-job__error-msg";
pub const TITLE_SELECTOR: &str = ".artdeco-card h1";
pub const LOCATION_SELECTOR: &str =
    ".job-details-jobs-unified-top-card__primary-description-container .tvm__text:first-child";
pub const DESCRIPTION_SELECTOR: &str = ".jobs-box__html-content p";
pub const SKILLS_SELECTOR: &str = ".job-details-how-you-match__skills-item-subtitle";
pub const ADDITIONAL_SKILLS_SELECTOR: &str =
    ".job-details-how-you-match__skills-section-descriptive-skill";
pub const COMPANY_LINK_SELECTOR: &str = ".job-details-jobs-unified-top-card__company-name a";
pub const FEEDBACK_SELECTOR: &str = ".artdeco-inline-feedback__message";
pub const APPLY_BUTTON_SELECTOR: &str = ".jobs-apply-button--top-card .jobs-apply-button";
pub const HIRER_SELECTOR: &str = ".hirer-card__hirer-information";
pub const HIRER_NAME_SELECTOR: &str = ".jobs-poster__name";
pub const HIRER_ROLE_SELECTOR: &str = ".text-body-small";

pub fn job_path(id: u64) -> String {
    format!("jobs/view/{id}/")
}

/// A job posting's detail page.
pub struct JobPostingDetailPage<'a> {
    page: &'a dyn Page,
    site: &'a SiteSettings,
}

impl<'a> JobPostingDetailPage<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteSettings) -> Self {
        Self { page, site }
    }

    pub async fn open(&self, id: u64) -> Result<()> {
        self.page.goto(&self.site.url(&job_path(id))).await
    }

    /// Id parsed from the current URL.
    pub async fn id(&self) -> Option<u64> {
        let url = self.page.current_url().await.ok()?;
        parse::parse_job_id_from_url(&url)
    }

    /// The site renders a "no longer available" message instead of the card.
    pub async fn is_not_found(&self) -> bool {
        matches!(self.page.query(NOT_FOUND_SELECTOR).await, Ok(Some(_)))
    }

    pub async fn title(&self) -> Option<String> {
        optional_text(self.page, TITLE_SELECTOR, self.site.timeouts.field_wait()).await
    }

    pub async fn location(&self) -> Option<String> {
        optional_text(self.page, LOCATION_SELECTOR, self.site.timeouts.field_wait()).await
    }

    /// First paragraph of the description body.
    pub async fn description(&self) -> Option<String> {
        optional_text(self.page, DESCRIPTION_SELECTOR, self.site.timeouts.field_wait()).await
    }

    /// Matched skills followed by the additional-skills line, in page order.
    pub async fn skills(&self) -> Vec<String> {
        let mut skills = Vec::new();
        let and_word = &self.site.locale.and_word;

        if optional_element(self.page, SKILLS_SELECTOR, self.site.timeouts.field_wait())
            .await
            .is_some()
        {
            for line in self.page.query_all(SKILLS_SELECTOR).await.unwrap_or_default() {
                if let Some(text) = element_text(line.as_ref()).await {
                    skills.extend(parse::parse_skills(&text, and_word));
                }
            }
        }

        if let Some(text) =
            optional_text(self.page, ADDITIONAL_SKILLS_SELECTOR, self.site.timeouts.field_wait())
                .await
        {
            skills.extend(parse::parse_additional_skills(&text));
        }
        skills
    }

    pub async fn company_name(&self) -> Option<String> {
        optional_text(self.page, COMPANY_LINK_SELECTOR, self.site.timeouts.field_wait()).await
    }

    pub async fn company_slug(&self) -> Option<String> {
        let link =
            optional_element(self.page, COMPANY_LINK_SELECTOR, self.site.timeouts.field_wait())
                .await?;
        let href = element_attr(link.as_ref(), "href").await?;
        parse::slug_after(&href, "company/")
    }

    /// The posting no longer accepts applications.
    pub async fn is_disabled(&self) -> bool {
        let phrase = self.site.locale.closed_posting_phrase.to_lowercase();
        optional_text(self.page, FEEDBACK_SELECTOR, self.site.timeouts.field_wait())
            .await
            .is_some_and(|text| text.to_lowercase().contains(&phrase))
    }

    /// The apply button starts an on-site application.
    pub async fn is_simple_application(&self) -> bool {
        let marker = &self.site.locale.apply_button_simple_marker;
        optional_text(self.page, APPLY_BUTTON_SELECTOR, self.site.timeouts.field_wait())
            .await
            .is_some_and(|text| text.contains(marker.as_str()))
    }

    /// Click the apply button and report where it leads: the tab it opened,
    /// or the current tab when it navigated in place.
    ///
    /// Only meaningful for open, non-simple postings; the click has side
    /// effects on the browsing context.
    pub async fn external_url(&self) -> Option<String> {
        let button =
            optional_element(self.page, APPLY_BUTTON_SELECTOR, self.site.timeouts.field_wait())
                .await?;
        let known: HashSet<String> = self
            .page
            .tabs()
            .await
            .map(|tabs| tabs.into_iter().map(|t| t.handle).collect())
            .unwrap_or_default();

        if let Err(err) = button.click().await {
            debug!(target: "prowl.extract", error = %err, "apply button click failed");
            return None;
        }
        self.page
            .pause(Timeouts::ms(self.site.timeouts.apply_settle))
            .await;

        let opened = self
            .page
            .tabs()
            .await
            .ok()
            .and_then(|tabs| tabs.into_iter().find(|t| !known.contains(&t.handle)));
        match opened {
            Some(tab) => Some(tab.url),
            None => self.page.current_url().await.ok(),
        }
    }

    pub async fn hirers(&self) -> Vec<Hirer> {
        if optional_element(self.page, HIRER_SELECTOR, self.site.timeouts.field_wait())
            .await
            .is_none()
        {
            return Vec::new();
        }
        let Ok(blocks) = self.page.query_all(HIRER_SELECTOR).await else {
            return Vec::new();
        };

        let mut hirers = Vec::with_capacity(blocks.len());
        for block in blocks {
            let block = block.as_ref();
            let profile_url = match block.find("a").await {
                Ok(Some(link)) => element_attr(link.as_ref(), "href").await,
                _ => None,
            };
            hirers.push(Hirer {
                slug: profile_url
                    .as_deref()
                    .and_then(|href| parse::slug_after(href, "in/")),
                name: child_text(block, HIRER_NAME_SELECTOR).await,
                role: child_text(block, HIRER_ROLE_SELECTOR).await,
                location: None,
                profile_url,
            });
        }
        hirers
    }
}
