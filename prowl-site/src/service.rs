use crate::auth::AuthenticationFlow;
use crate::factory;
use crate::model::{Company, Hirer, JobPostingInfo, JobPostingListingItem, SearchQuery};
use crate::pages::{self, CompanyDetailPage, JobPostingDetailPage, RecruiterDetailPage};
use crate::pagination::SearchController;
use prowl_common::settings::SiteSettings;
use prowl_common::{Credentials, Identity, Operation, ProwlError, Result};
use prowl_drivers::browser::page::Page;
use prowl_drivers::session::{ScopedBrowserContext, SessionFactory};
use tracing::{info_span, warn, Instrument, Span};

/// The five operations exposed to callers.
///
/// Every operation except a short-circuited [`login`](Self::login) owns one
/// browser context for its whole duration and closes it before returning.
#[derive(Clone)]
pub struct JobBoard {
    site: SiteSettings,
    sessions: SessionFactory,
    auth: AuthenticationFlow,
}

fn op_span(operation: Operation, identity: &Identity) -> Span {
    info_span!("prowl.op", %operation, %identity)
}

impl JobBoard {
    pub fn new(site: SiteSettings, sessions: SessionFactory) -> Self {
        let auth = AuthenticationFlow::new(sessions.clone(), site.clone());
        Self {
            site,
            sessions,
            auth,
        }
    }

    pub fn site(&self) -> &SiteSettings {
        &self.site
    }

    pub fn sessions(&self) -> &SessionFactory {
        &self.sessions
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let span = op_span(Operation::Login, &credentials.identity());
        self.auth.login(credentials).instrument(span).await
    }

    pub async fn search_jobs(
        &self,
        identity: &Identity,
        query: &SearchQuery,
    ) -> Result<Vec<JobPostingListingItem>> {
        async {
            let ctx = self.sessions.open(identity).await?;
            let outcome = SearchController::new(ctx.page(), &self.site)
                .run(identity, query)
                .await;
            finish(ctx, outcome).await
        }
        .instrument(op_span(Operation::SearchJobs, identity))
        .await
    }

    pub async fn get_job_posting(&self, identity: &Identity, id: u64) -> Result<JobPostingInfo> {
        async {
            let ctx = self.sessions.open(identity).await?;
            let outcome = self.read_job_posting(&ctx, identity, id).await;
            finish(ctx, outcome).await
        }
        .instrument(op_span(Operation::GetJobPosting, identity))
        .await
    }

    pub async fn get_company(&self, identity: &Identity, slug: &str) -> Result<Company> {
        async {
            let ctx = self.sessions.open(identity).await?;
            let outcome = self.read_company(&ctx, identity, slug).await;
            finish(ctx, outcome).await
        }
        .instrument(op_span(Operation::GetCompany, identity))
        .await
    }

    pub async fn get_recruiter(&self, identity: &Identity, slug: &str) -> Result<Hirer> {
        async {
            let ctx = self.sessions.open(identity).await?;
            let outcome = self.read_recruiter(&ctx, identity, slug).await;
            finish(ctx, outcome).await
        }
        .instrument(op_span(Operation::GetRecruiter, identity))
        .await
    }

    async fn read_job_posting(
        &self,
        ctx: &ScopedBrowserContext,
        identity: &Identity,
        id: u64,
    ) -> Result<JobPostingInfo> {
        let op = Operation::GetJobPosting;
        let page = JobPostingDetailPage::new(ctx.page(), &self.site);
        page.open(id)
            .await
            .map_err(ProwlError::navigation(op, identity, "open job posting"))?;
        ensure_signed_in(ctx.page(), op, identity).await?;
        Ok(factory::job_posting_from_page(&page, id).await)
    }

    async fn read_company(
        &self,
        ctx: &ScopedBrowserContext,
        identity: &Identity,
        slug: &str,
    ) -> Result<Company> {
        let op = Operation::GetCompany;
        let page = CompanyDetailPage::new(ctx.page(), &self.site);
        page.open(slug)
            .await
            .map_err(ProwlError::navigation(op, identity, "open company page"))?;
        ensure_signed_in(ctx.page(), op, identity).await?;
        Ok(factory::company_from_page(&page).await)
    }

    async fn read_recruiter(
        &self,
        ctx: &ScopedBrowserContext,
        identity: &Identity,
        slug: &str,
    ) -> Result<Hirer> {
        let op = Operation::GetRecruiter;
        let page = RecruiterDetailPage::new(ctx.page(), &self.site);
        page.open(slug)
            .await
            .map_err(ProwlError::navigation(op, identity, "open recruiter profile"))?;
        ensure_signed_in(ctx.page(), op, identity).await?;
        Ok(factory::hirer_from_page(&page).await)
    }
}

/// Close the context, then hand back the operation's outcome.
async fn finish<T>(ctx: ScopedBrowserContext, outcome: Result<T>) -> Result<T> {
    ctx.close().await;
    if let Err(err) = &outcome {
        warn!(target: "prowl.op", error = %err, "operation failed");
    }
    outcome
}

/// A redirect to the login form or an auth wall means the stored session
/// stopped granting access.
async fn ensure_signed_in(page: &dyn Page, operation: Operation, identity: &Identity) -> Result<()> {
    let url = page
        .current_url()
        .await
        .map_err(ProwlError::navigation(operation, identity, "read current url"))?;
    if pages::is_auth_wall(&url) {
        return Err(ProwlError::Navigation {
            operation,
            identity: identity.clone(),
            stage: "session expired",
            source: anyhow::anyhow!("redirected to {url}; run login again"),
        });
    }
    Ok(())
}
