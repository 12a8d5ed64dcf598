//! Page objects: typed getters over live pages of the target site.
//!
//! Optional getters follow one policy. They wait for the field's anchor
//! element for at most `timeouts.field_wait`, return `None` (or an empty
//! list / `false`) when it does not show up, and return trimmed content
//! otherwise. The UI renders different field sets per job type, locale and
//! account, so a missing field is normal. Only navigation itself fails hard.
use prowl_drivers::browser::page::{DomElement, Page};
use std::time::Duration;
use tracing::trace;

pub mod company;
pub mod job;
pub mod login;
pub mod recruiter;
pub mod search;

pub use company::CompanyDetailPage;
pub use job::JobPostingDetailPage;
pub use login::LoginPage;
pub use recruiter::RecruiterDetailPage;
pub use search::{JobSearchPage, JobSearchResultCard};

/// Trimmed, non-empty text.
pub(crate) fn trimmed(raw: &str) -> Option<String> {
    let t = raw.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Wait for `selector`, then read its trimmed text.
pub(crate) async fn optional_text(page: &dyn Page, selector: &str, wait: Duration) -> Option<String> {
    let element = optional_element(page, selector, wait).await?;
    element_text(element.as_ref()).await
}

/// Wait for `selector`, then read `attr`.
pub(crate) async fn optional_attr(
    page: &dyn Page,
    selector: &str,
    attr: &str,
    wait: Duration,
) -> Option<String> {
    let element = optional_element(page, selector, wait).await?;
    element_attr(element.as_ref(), attr).await
}

pub(crate) async fn optional_element(
    page: &dyn Page,
    selector: &str,
    wait: Duration,
) -> Option<Box<dyn DomElement>> {
    match page.wait_for(selector, wait).await {
        Ok(element) => Some(element),
        Err(err) => {
            trace!(target: "prowl.extract", %selector, error = %err, "optional field absent");
            None
        }
    }
}

pub(crate) async fn element_text(element: &dyn DomElement) -> Option<String> {
    element.text().await.ok().as_deref().and_then(trimmed)
}

pub(crate) async fn element_attr(element: &dyn DomElement, attr: &str) -> Option<String> {
    element.attr(attr).await.ok().flatten().as_deref().and_then(trimmed)
}

/// Text of the first descendant of `element` matching `selector`.
pub(crate) async fn child_text(element: &dyn DomElement, selector: &str) -> Option<String> {
    let child = element.find(selector).await.ok().flatten()?;
    element_text(child.as_ref()).await
}

/// True when `url` is the login form, an auth wall or a security checkpoint,
/// i.e. the stored session no longer grants access.
pub fn is_auth_wall(url: &str) -> bool {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    path.starts_with("/login")
        || path.starts_with("/uas/login")
        || path.starts_with("/authwall")
        || path.starts_with("/checkpoint")
}
