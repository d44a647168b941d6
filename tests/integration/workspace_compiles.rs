//! Integration test to verify the workspace crates link together.

#![allow(clippy::unwrap_used)]

#[test]
fn domain_crate_links() {
    let site = brawl_domain::SiteConfig::default();
    assert_eq!(brawl_domain::get_url(&site, "/"), "https://localhost:3000");
    assert_eq!(brawl_domain::format_debate_result("win"), "Victory");
}

#[test]
fn application_crate_links() {
    let error = brawl_application::ApplicationError::ServicesUnavailable;
    assert!(error.to_string().contains("non-interactive"));
    assert_eq!(brawl_application::redirect_target(""), "/dashboard");
}

#[test]
fn infrastructure_crate_links() {
    use brawl_application::Clock;
    let clock = brawl_infrastructure::SystemClock::new();
    assert!(clock.now().timestamp() > 0);
    assert_eq!(
        brawl_infrastructure::AppConfig::default().backend.mode,
        brawl_infrastructure::BackendMode::Memory
    );
}
