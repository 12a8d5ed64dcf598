//! Page object → entity mapping.
//!
//! Getters run in field-declaration order. They are independent of each
//! other with one exception: reading the external apply URL clicks the apply
//! button, so it only happens once `disabled` and `is_simple_application` are
//! known, and only when both are false.
use crate::model::{Company, Hirer, JobPostingInfo, JobPostingListingItem};
use crate::pages::{CompanyDetailPage, JobPostingDetailPage, JobSearchResultCard, RecruiterDetailPage};
use tracing::debug;

/// Convert one result card. Fails only when the card has no usable id.
pub async fn listing_item_from_card(
    card: &JobSearchResultCard<'_>,
) -> Result<JobPostingListingItem, String> {
    let id = card.id().await?;
    Ok(JobPostingListingItem {
        id,
        title: card.title().await,
        company_name: card.company_name().await,
        metadata_items: card.metadata_items().await,
        created_at: card.created_at().await,
        is_simple_application: card.is_simple_application().await,
    })
}

/// Read a job posting. `requested_id` is used when the URL carries none
/// (e.g. the site redirected away from the posting).
pub async fn job_posting_from_page(
    page: &JobPostingDetailPage<'_>,
    requested_id: u64,
) -> JobPostingInfo {
    let id = page.id().await.unwrap_or(requested_id);

    if page.is_not_found().await {
        debug!(target: "prowl.extract", id, "posting no longer exists");
        return JobPostingInfo::unavailable(id);
    }

    let mut info = JobPostingInfo::new(id);
    info.title = page.title().await;
    info.location = page.location().await;
    info.description = page.description().await;
    info.skills = page.skills().await;
    info.company_name = page.company_name().await;
    info.company_slug = page.company_slug().await;
    info.disabled = page.is_disabled().await;
    info.is_simple_application = !info.disabled && page.is_simple_application().await;

    let external_url = if info.disabled || info.is_simple_application {
        None
    } else {
        page.external_url().await
    };
    let mut info = info.with_external_url(external_url);

    info.hirers = page.hirers().await;
    info
}

pub async fn company_from_page(page: &CompanyDetailPage<'_>) -> Company {
    Company {
        slug: page.slug().await,
        name: page.name().await,
        description: page.description().await,
        website: page.website().await,
        industry: page.industry().await,
        company_size: page.company_size().await,
        headquarters: page.headquarters().await,
    }
}

pub async fn hirer_from_page(page: &RecruiterDetailPage<'_>) -> Hirer {
    Hirer {
        slug: page.slug().await,
        name: page.name().await,
        role: page.role().await,
        location: page.location().await,
        profile_url: page.current_url().await,
    }
}
