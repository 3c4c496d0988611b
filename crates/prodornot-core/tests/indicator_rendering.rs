use chrono::Utc;
use prodornot_core::testing::{FakeHost, FakeTabs, MemoryStore};
use prodornot_core::{
    DomainMark, DomainMarks, INDICATOR_ELEMENT_ID, IndicatorEvent, IndicatorPosition,
    IndicatorRenderer, IndicatorSettings, IndicatorStyle, QuickToggle, Reaction, RuntimeMessage,
    STORAGE_DOMAINS_KEY, STORAGE_ENVIRONMENTS_KEY, StoreChange,
};
use serde_json::json;

fn store_with_mark(domain: &str, environment_id: &str) -> MemoryStore {
    let store = MemoryStore::default();
    let mut domains = DomainMarks::new();
    domains.insert(domain.to_string(), DomainMark::new(environment_id, Utc::now()));
    store.seed_domains(&domains);
    store
}

#[tokio::test]
async fn repeated_renders_leave_a_single_badge() {
    let store = store_with_mark("prod.example.com", "prod");
    let renderer = IndicatorRenderer::new("prod.example.com");
    let mut host = FakeHost::default();

    renderer.refresh(&store, &mut host).await;
    renderer.refresh(&store, &mut host).await;

    assert_eq!(host.badge_count(), 1);
    let badge = &host.elements[0];
    assert_eq!(badge.element_id, INDICATOR_ELEMENT_ID);
    assert_eq!(badge.aria_label, "Environment: Production");
    assert_eq!(badge.style.get("background-color"), Some("#f44336"));
}

#[tokio::test]
async fn unmarked_domain_clears_previous_badge() {
    let store = store_with_mark("prod.example.com", "prod");
    let renderer = IndicatorRenderer::new("prod.example.com");
    let mut host = FakeHost::default();
    renderer.refresh(&store, &mut host).await;
    assert_eq!(host.badge_count(), 1);

    store.seed(STORAGE_DOMAINS_KEY, json!({}));
    let reaction = renderer
        .handle(
            &IndicatorEvent::Message(RuntimeMessage::UpdateIndicator),
            &store,
            &mut host,
        )
        .await;

    assert_eq!(reaction, Reaction::Rerender);
    assert_eq!(host.badge_count(), 0);
}

#[tokio::test]
async fn orphaned_mark_shows_no_badge() {
    let store = store_with_mark("qa.example.com", "qa");
    let renderer = IndicatorRenderer::new("qa.example.com");
    let mut host = FakeHost::default();

    let badge = renderer.refresh(&store, &mut host).await;

    assert!(badge.is_none());
    assert_eq!(host.badge_count(), 0);
}

#[tokio::test]
async fn custom_environments_and_settings_shape_the_badge() {
    let store = store_with_mark("ops.example.com", "ops");
    store.seed(
        STORAGE_ENVIRONMENTS_KEY,
        json!([{ "id": "ops", "label": "Ops", "color": "#123456", "icon": "⚙️" }]),
    );
    store.seed_indicator_settings(IndicatorSettings {
        style: IndicatorStyle::Triangle,
        position: IndicatorPosition::TopLeft,
    });
    let renderer = IndicatorRenderer::new("ops.example.com");
    let mut host = FakeHost::default();

    let badge = renderer
        .refresh(&store, &mut host)
        .await
        .expect("badge for marked domain");

    assert!(badge.content.is_none());
    assert_eq!(
        badge.style.get("border-color"),
        Some("transparent transparent transparent #123456")
    );
}

#[tokio::test]
async fn storage_failure_degrades_to_no_badge() {
    let store = store_with_mark("prod.example.com", "prod");
    let renderer = IndicatorRenderer::new("prod.example.com");
    let mut host = FakeHost::default();
    renderer.refresh(&store, &mut host).await;

    store.fail_reads(true);
    let badge = renderer.refresh(&store, &mut host).await;

    assert!(badge.is_none());
    assert_eq!(host.badge_count(), 0);
}

#[tokio::test]
async fn insert_failure_is_contained() {
    let store = store_with_mark("prod.example.com", "prod");
    let renderer = IndicatorRenderer::new("prod.example.com");
    let mut host = FakeHost {
        fail_inserts: true,
        ..FakeHost::default()
    };

    assert!(renderer.refresh(&store, &mut host).await.is_none());
    assert_eq!(host.badge_count(), 0);
}

#[tokio::test]
async fn popup_write_reaches_the_page_through_store_changes() {
    let store = MemoryStore::default();
    let tabs = FakeTabs::default();
    tabs.add_active_tab(9, "https://billing.example.com/invoices");
    let renderer = IndicatorRenderer::new("billing.example.com");
    let mut host = FakeHost::default();

    renderer
        .handle(&IndicatorEvent::DocumentReady, &store, &mut host)
        .await;
    assert_eq!(host.badge_count(), 0);

    let popup = QuickToggle::open(store.clone(), tabs)
        .await
        .expect("open popup");
    popup.save("staging", Utc::now()).await.expect("mark domain");

    for change in store.take_changes() {
        renderer
            .handle(&IndicatorEvent::StorageChanged(change), &store, &mut host)
            .await;
    }
    assert_eq!(host.badge_count(), 1);
    assert_eq!(host.elements[0].aria_label, "Environment: Staging");

    let ignored = renderer
        .handle(
            &IndicatorEvent::StorageChanged(StoreChange::sync(["unrelated_key"])),
            &store,
            &mut host,
        )
        .await;
    assert_eq!(ignored, Reaction::Ignore);
    assert_eq!(host.badge_count(), 1);
}
