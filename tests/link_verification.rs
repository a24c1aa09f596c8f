//! Link verification passes against mocked apply links

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fresher_intake::config::VerificationConfig;
use fresher_intake::models::{
    LinkHealth, LinkHealthUpdate, Posting, PostingCreateRequest, PostingStatus, PostingType,
};
use fresher_intake::notifications::NotificationDispatcher;
use fresher_intake::repositories::{InMemoryStore, PostingRepository};
use fresher_intake::utils::HttpClientFactory;
use fresher_intake::verification::{HttpLinkProber, LinkVerificationService, VerificationStats};

fn verifier(store: Arc<InMemoryStore>) -> LinkVerificationService<InMemoryStore> {
    let config = VerificationConfig {
        probe_timeout: Duration::from_secs(1),
        ..Default::default()
    };
    let prober = HttpLinkProber::from_config(&config, &HttpClientFactory::default()).unwrap();
    LinkVerificationService::new(store, Arc::new(prober), config, NotificationDispatcher::empty())
}

async fn posting(store: &InMemoryStore, status: PostingStatus, link: String) -> Posting {
    store
        .create_posting(PostingCreateRequest {
            slug: format!("graduate-trainee-acme-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]),
            posting_type: PostingType::Job,
            status,
            title: "Graduate Trainee".to_string(),
            company: "Acme".to_string(),
            description: String::new(),
            apply_link: Some(link),
            locations: vec!["India".to_string()],
            work_mode: None,
            experience_min: None,
            experience_max: Some(0),
            allowed_passout_years: vec![],
            required_skills: vec![],
            allowed_education_levels: vec!["UG".to_string()],
            provenance_note: None,
            created_by: "ops".to_string(),
        })
        .await
        .unwrap()
}

async fn reload(store: &InMemoryStore, id: uuid::Uuid) -> Posting {
    store.find_posting(id).await.unwrap().unwrap()
}

#[tokio::test]
async fn rate_limited_probe_keeps_failures_then_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/job/1"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/job/1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    let posting = posting(&store, PostingStatus::Published, format!("{}/job/1", server.uri())).await;
    store
        .apply_link_health(
            posting.id,
            &LinkHealthUpdate {
                link_health: LinkHealth::Retrying,
                verification_failures: 1,
                last_verified_at: Utc::now(),
                status: None,
            },
        )
        .await
        .unwrap();

    let verifier = verifier(store.clone());
    let mut stats = VerificationStats::new();

    let first = verifier.run(&mut stats).await.unwrap();
    assert_eq!(first.soft_failures, 1);
    let after_soft = reload(&store, posting.id).await;
    assert_eq!(after_soft.link_health, LinkHealth::Retrying);
    assert_eq!(after_soft.verification_failures, 1);

    let second = verifier.run(&mut stats).await.unwrap();
    assert_eq!(second.healthy, 1);
    let recovered = reload(&store, posting.id).await;
    assert_eq!(recovered.link_health, LinkHealth::Healthy);
    assert_eq!(recovered.verification_failures, 0);
    assert_eq!(recovered.status, PostingStatus::Published);

    assert_eq!(stats.runs, 2);
    assert_eq!(stats.processed, 2);
}

#[tokio::test]
async fn three_hard_failures_quarantine_and_archive() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    let posting = posting(&store, PostingStatus::Published, format!("{}/gone", server.uri())).await;
    let verifier = verifier(store.clone());
    let mut stats = VerificationStats::new();

    for expected_failures in 1..=2 {
        let summary = verifier.run(&mut stats).await.unwrap();
        assert_eq!(summary.hard_failures, 1);
        assert_eq!(summary.archived, 0);
        let current = reload(&store, posting.id).await;
        assert_eq!(current.link_health, LinkHealth::Retrying);
        assert_eq!(current.verification_failures, expected_failures);
    }

    let summary = verifier.run(&mut stats).await.unwrap();
    assert_eq!(summary.archived, 1);
    let archived = reload(&store, posting.id).await;
    assert_eq!(archived.link_health, LinkHealth::Broken);
    assert_eq!(archived.status, PostingStatus::Archived);
    assert_eq!(archived.verification_failures, 3);

    // quarantined postings are never probed again
    let summary = verifier.run(&mut stats).await.unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(stats.archived, 1);
}

#[tokio::test]
async fn protected_link_never_accumulates_failures() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/protected"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    let posting =
        posting(&store, PostingStatus::Published, format!("{}/protected", server.uri())).await;
    let verifier = verifier(store.clone());
    let mut stats = VerificationStats::new();

    for _ in 0..10 {
        verifier.run(&mut stats).await.unwrap();
    }

    let current = reload(&store, posting.id).await;
    assert_eq!(current.link_health, LinkHealth::Retrying);
    assert_eq!(current.verification_failures, 0);
    assert_eq!(current.status, PostingStatus::Published);
    assert_eq!(stats.soft_failures, 10);
    assert_eq!(stats.archived, 0);
}

#[tokio::test]
async fn stalled_head_falls_back_to_ranged_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .and(header("range", "bytes=0-0"))
        .respond_with(ResponseTemplate::new(206))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    let posting = posting(&store, PostingStatus::Published, format!("{}/slow", server.uri())).await;
    let verifier = verifier(store.clone());

    let summary = verifier.run(&mut VerificationStats::new()).await.unwrap();
    assert_eq!(summary.healthy, 1);
    assert_eq!(reload(&store, posting.id).await.link_health, LinkHealth::Healthy);
}

#[tokio::test]
async fn unreachable_host_counts_as_hard_failure() {
    let store = Arc::new(InMemoryStore::new());
    let posting =
        posting(&store, PostingStatus::Published, "http://127.0.0.1:9/job".to_string()).await;
    let verifier = verifier(store.clone());

    let summary = verifier.run(&mut VerificationStats::new()).await.unwrap();
    assert_eq!(summary.hard_failures, 1);
    let current = reload(&store, posting.id).await;
    assert_eq!(current.link_health, LinkHealth::Retrying);
    assert_eq!(current.verification_failures, 1);
}

#[tokio::test]
async fn only_stale_published_postings_are_probed() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/live"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    for skipped in ["/draft", "/deleted", "/fresh"] {
        Mock::given(method("HEAD"))
            .and(path(skipped))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
    }

    let store = Arc::new(InMemoryStore::new());
    posting(&store, PostingStatus::Published, format!("{}/live", server.uri())).await;
    posting(&store, PostingStatus::Draft, format!("{}/draft", server.uri())).await;
    let deleted =
        posting(&store, PostingStatus::Published, format!("{}/deleted", server.uri())).await;
    store.soft_delete_posting(deleted.id, Utc::now()).await.unwrap();
    let fresh = posting(&store, PostingStatus::Published, format!("{}/fresh", server.uri())).await;
    store
        .apply_link_health(
            fresh.id,
            &LinkHealthUpdate {
                link_health: LinkHealth::Healthy,
                verification_failures: 0,
                last_verified_at: Utc::now(),
                status: None,
            },
        )
        .await
        .unwrap();

    let summary = verifier(store.clone())
        .run(&mut VerificationStats::new())
        .await
        .unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.healthy, 1);
}

#[tokio::test]
async fn redirecting_link_stays_published() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/apply"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/login"))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    let posting = posting(&store, PostingStatus::Published, format!("{}/apply", server.uri())).await;
    let verifier = verifier(store.clone());
    let mut stats = VerificationStats::new();

    for _ in 0..3 {
        verifier.run(&mut stats).await.unwrap();
        backdate_last_check(&store, posting.id).await;
    }

    let current = reload(&store, posting.id).await;
    assert_eq!(current.link_health, LinkHealth::Healthy);
    assert_eq!(current.verification_failures, 0);
    assert_eq!(current.status, PostingStatus::Published);
    assert_eq!(stats.healthy, 3);
}

/// Backdate the last check so the next pass picks the posting up again
async fn backdate_last_check(store: &InMemoryStore, id: uuid::Uuid) {
    let current = reload(store, id).await;
    store
        .apply_link_health(
            id,
            &LinkHealthUpdate {
                link_health: current.link_health,
                verification_failures: current.verification_failures,
                last_verified_at: Utc::now() - chrono::Duration::days(1),
                status: None,
            },
        )
        .await
        .unwrap();
}
