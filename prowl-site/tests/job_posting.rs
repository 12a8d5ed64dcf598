mod common;

use common::*;
use prowl_common::ProwlError;
use prowl_site::pages::job::{
    ADDITIONAL_SKILLS_SELECTOR, APPLY_BUTTON_SELECTOR, COMPANY_LINK_SELECTOR, DESCRIPTION_SELECTOR,
    FEEDBACK_SELECTOR, HIRER_NAME_SELECTOR, HIRER_ROLE_SELECTOR, HIRER_SELECTOR,
    LOCATION_SELECTOR, NOT_FOUND_SELECTOR, SKILLS_SELECTOR, TITLE_SELECTOR,
};
use prowl_site::Hirer;
use std::sync::Arc;

fn posting() -> Screen {
    Screen::new()
        .with(TITLE_SELECTOR, FakeNode::text(" Senior Rust Engineer "))
        .with(LOCATION_SELECTOR, FakeNode::text("Milano, Lombardia, Italia"))
        .with(DESCRIPTION_SELECTOR, FakeNode::text("Costruiamo sistemi distribuiti."))
        .with(DESCRIPTION_SELECTOR, FakeNode::text("Secondo paragrafo."))
        .with(
            COMPANY_LINK_SELECTOR,
            FakeNode::text("Acme").attr("href", "https://www.linkedin.com/company/acme-corp/life/"),
        )
}

fn apply_button(label: &str, effect: ClickEffect) -> FakeNode {
    FakeNode::text(label).on_click(effect)
}

async fn fetch(page: FakePage, id: u64) -> (Result<prowl_site::JobPostingInfo, ProwlError>, Arc<FakeLauncher>) {
    let dir = tempfile::tempdir().unwrap();
    let launcher = Arc::new(FakeLauncher::new(page));
    let board = signed_in_board(dir.path(), launcher.clone());
    let result = board.get_job_posting(&identity(), id).await;
    (result, launcher)
}

#[tokio::test]
async fn closed_posting_is_disabled_and_apply_is_never_clicked() {
    let page = FakePage::single(
        posting()
            .with(FEEDBACK_SELECTOR, FakeNode::text("Non accetta più candidature"))
            .with(
                APPLY_BUTTON_SELECTOR,
                apply_button("Candidati", ClickEffect::OpenTab("https://careers.acme.test".into())),
            ),
    );

    let (info, launcher) = fetch(page.clone(), 42).await;
    let info = info.unwrap();

    assert!(info.disabled);
    assert_eq!(info.external_url, None);
    assert!(!info.is_simple_application);
    assert!(page.clicks().is_empty());
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn simple_application_has_no_external_url() {
    let page = FakePage::single(posting().with(
        APPLY_BUTTON_SELECTOR,
        apply_button("Candidatura semplice", ClickEffect::OpenTab("https://x.test".into())),
    ));

    let (info, _) = fetch(page.clone(), 42).await;
    let info = info.unwrap();

    assert!(info.is_simple_application);
    assert!(!info.disabled);
    assert_eq!(info.external_url, None);
    assert!(page.clicks().is_empty());
}

#[tokio::test]
async fn external_url_comes_from_the_new_tab() {
    let page = FakePage::single(posting().with(
        APPLY_BUTTON_SELECTOR,
        apply_button(
            "Candidati",
            ClickEffect::OpenTab("https://careers.acme.test/apply/42".into()),
        ),
    ));

    let (info, _) = fetch(page.clone(), 42).await;
    let info = info.unwrap();

    assert_eq!(info.external_url.as_deref(), Some("https://careers.acme.test/apply/42"));
    assert_eq!(page.clicks(), vec![APPLY_BUTTON_SELECTOR.to_string()]);
}

#[tokio::test]
async fn external_url_ignores_window_handle_order() {
    let page = FakePage::single(posting().with(
        APPLY_BUTTON_SELECTOR,
        apply_button(
            "Candidati",
            ClickEffect::OpenTab("https://careers.acme.test/apply/42".into()),
        ),
    ))
    .newest_tab_first();

    let (info, _) = fetch(page.clone(), 42).await;

    assert_eq!(
        info.unwrap().external_url.as_deref(),
        Some("https://careers.acme.test/apply/42")
    );
    assert_eq!(page.url(), format!("{BASE}/jobs/view/42/"));
}

#[tokio::test]
async fn external_url_falls_back_to_current_tab() {
    let page = FakePage::single(posting().with(
        APPLY_BUTTON_SELECTOR,
        apply_button("Candidati", ClickEffect::SetUrl("https://jobs.acme.test/42".into())),
    ));

    let (info, _) = fetch(page, 42).await;

    assert_eq!(info.unwrap().external_url.as_deref(), Some("https://jobs.acme.test/42"));
}

#[tokio::test]
async fn fields_are_read_from_the_detail_page() {
    let page = FakePage::single(
        posting()
            .with(SKILLS_SELECTOR, FakeNode::text("Python, Go e Rust"))
            .with(SKILLS_SELECTOR, FakeNode::text("SQL"))
            .with(ADDITIONAL_SKILLS_SELECTOR, FakeNode::text("Kubernetes · AWS"))
            .with(
                HIRER_SELECTOR,
                FakeNode::new()
                    .child(HIRER_NAME_SELECTOR, FakeNode::text("Jane Doe"))
                    .child(HIRER_ROLE_SELECTOR, FakeNode::text("Talent Acquisition"))
                    .child("a", FakeNode::new().attr("href", "https://www.linkedin.com/in/jane-doe/")),
            )
            .with(HIRER_SELECTOR, FakeNode::new().child(HIRER_NAME_SELECTOR, FakeNode::text("Anonimo"))),
    );

    let (info, _) = fetch(page.clone(), 3_912_345_678).await;
    let info = info.unwrap();

    assert_eq!(info.id, 3_912_345_678);
    assert_eq!(info.title.as_deref(), Some("Senior Rust Engineer"));
    assert_eq!(info.location.as_deref(), Some("Milano, Lombardia, Italia"));
    assert_eq!(info.description.as_deref(), Some("Costruiamo sistemi distribuiti."));
    assert_eq!(info.skills, vec!["Python", "Go", "Rust", "SQL", "Kubernetes", "AWS"]);
    assert_eq!(info.company_name.as_deref(), Some("Acme"));
    assert_eq!(info.company_slug.as_deref(), Some("acme-corp"));
    assert!(!info.disabled);
    assert_eq!(info.external_url, None);
    assert_eq!(
        info.hirers,
        vec![
            Hirer {
                slug: Some("jane-doe".into()),
                name: Some("Jane Doe".into()),
                role: Some("Talent Acquisition".into()),
                location: None,
                profile_url: Some("https://www.linkedin.com/in/jane-doe/".into()),
            },
            Hirer {
                name: Some("Anonimo".into()),
                ..Hirer::default()
            },
        ]
    );
    assert!(page.waits().contains(&ADDITIONAL_SKILLS_SELECTOR.to_string()));
}

#[tokio::test]
async fn missing_fields_resolve_to_absent() {
    let (info, _) = fetch(FakePage::single(Screen::new()), 7).await;
    let info = info.unwrap();

    assert_eq!(info.id, 7);
    assert_eq!(info.title, None);
    assert_eq!(info.company_slug, None);
    assert!(info.skills.is_empty());
    assert!(info.hirers.is_empty());
    assert!(!info.disabled);
    assert!(!info.is_simple_application);
    assert_eq!(info.external_url, None);
}

#[tokio::test]
async fn removed_posting_is_an_unavailable_marker() {
    let page = FakePage::single(
        posting().with(NOT_FOUND_SELECTOR, FakeNode::text("Questa offerta non è più disponibile")),
    );

    let (info, _) = fetch(page, 42).await;
    let info = info.unwrap();

    assert_eq!(info.id, 42);
    assert!(info.disabled);
    assert_eq!(info.title, None);
    assert_eq!(info.external_url, None);
}

#[tokio::test]
async fn auth_wall_redirect_reports_expired_session() {
    let page = FakePage::single(posting())
        .redirect(&format!("{BASE}/jobs/view/42/"), &format!("{BASE}/authwall?trk=x"));

    let (result, launcher) = fetch(page, 42).await;
    let err = result.unwrap_err();

    assert!(matches!(err, ProwlError::Navigation { .. }), "got {err:?}");
    assert_eq!(err.stage(), Some("session expired"));
    assert_eq!(launcher.closes(), 1);
}

#[tokio::test]
async fn entity_serializes_for_callers() {
    let page = FakePage::single(posting().with(
        APPLY_BUTTON_SELECTOR,
        apply_button("Candidatura semplice", ClickEffect::NextScreen),
    ));

    let (info, _) = fetch(page, 42).await;
    let json = serde_json::to_value(info.unwrap()).unwrap();

    assert_eq!(json["id"], 42);
    assert_eq!(json["companySlug"], "acme-corp");
    assert_eq!(json["isSimpleApplication"], true);
    assert!(json["externalUrl"].is_null());
}
