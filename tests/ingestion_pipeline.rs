//! End-to-end ingestion runs against mocked feeds

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fresher_intake::config::IngestionConfig;
use fresher_intake::errors::{AppError, ProcessingError, SourceResult};
use fresher_intake::ingestor::IngestionService;
use fresher_intake::models::{
    Candidate, IngestionSource, IngestionSourceCreateRequest, PostingStatus, PostingType,
    RawOpportunityStatus, RunStatus, SourceType,
};
use fresher_intake::notifications::NotificationDispatcher;
use fresher_intake::repositories::{
    InMemoryStore, IngestionRunRepository, RawOpportunityRepository, SourceRepository,
};
use fresher_intake::sources::{SourceAdapter, SourceAdapterRegistry};
use fresher_intake::utils::HttpClientFactory;

fn registry() -> Arc<SourceAdapterRegistry> {
    let client = HttpClientFactory::default()
        .create_client(Duration::from_secs(5))
        .unwrap();
    Arc::new(SourceAdapterRegistry::with_defaults(client))
}

fn config(owner: Option<&str>) -> IngestionConfig {
    IngestionConfig {
        default_owner_id: owner.map(str::to_string),
        ..Default::default()
    }
}

fn service(
    store: Arc<InMemoryStore>,
    registry: Arc<SourceAdapterRegistry>,
    owner: Option<&str>,
) -> IngestionService<InMemoryStore> {
    IngestionService::new(store, registry, config(owner), NotificationDispatcher::empty())
}

async fn add_source(store: &InMemoryStore, name: &str, endpoint: String) -> IngestionSource {
    store
        .create_source(IngestionSourceCreateRequest {
            name: name.to_string(),
            endpoint,
            source_type: SourceType::JsonFeed,
            default_posting_type: PostingType::Job,
            run_frequency_minutes: 60,
            enabled: true,
        })
        .await
        .unwrap()
}

async fn serve_feed(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn mixed_feed() -> Value {
    json!({
        "jobs": [
            {
                "title": "Graduate Trainee — Fresher Program",
                "company": "Acme",
                "applyLink": "https://x.com/job/1",
                "experienceMax": 0
            },
            {
                "title": "Graduate Trainee (repost)",
                "company": "Acme",
                "applyLink": "https://x.com/job/1",
                "experienceMax": 0
            },
            {
                "title": "Senior Engineering Manager",
                "company": "Globex",
                "applyLink": "https://x.com/job/2",
                "experienceMin": 5
            },
            {
                "title": "Campus Intern",
                "company": "Acme",
                "type": "internship",
                "experienceMax": 0
            },
            {
                "title": "Walk-in Drive for Freshers",
                "company": "Initech",
                "type": "walk-in",
                "experience": "0-1 years"
            }
        ]
    })
}

#[tokio::test]
async fn mixed_feed_produces_balanced_successful_run() {
    let server = MockServer::start().await;
    serve_feed(&server, "/feed.json", mixed_feed()).await;

    let store = Arc::new(InMemoryStore::new());
    let source = add_source(&store, "Board", format!("{}/feed.json", server.uri())).await;
    let service = service(store.clone(), registry(), Some("ops@intake"));

    let cycle = service.run_cycle().await.unwrap();
    assert_eq!(cycle.scanned_sources, 1);
    assert_eq!(cycle.runnable_sources, 1);

    let summary = cycle.results[0].summary.clone().unwrap();
    assert_eq!(summary.status, RunStatus::Success);
    assert_eq!(summary.fetched_count, 5);
    assert_eq!(summary.draft_created_count, 2);
    assert_eq!(summary.deduped_count, 1);
    assert_eq!(summary.rejected_count, 2);
    assert_eq!(summary.error_count, 0);
    assert_eq!(
        summary.draft_created_count
            + summary.deduped_count
            + summary.rejected_count
            + summary.error_count,
        summary.fetched_count
    );

    let audit = store
        .list_raw_opportunities_for_run(summary.run_id)
        .await
        .unwrap();
    assert_eq!(audit.len(), 5);

    let scenario_a = &audit[0];
    assert_eq!(scenario_a.status, RawOpportunityStatus::DraftCreated);
    assert_eq!(scenario_a.fresher_score, 55);
    assert!(scenario_a.mapped_posting_id.is_some());

    let scenario_b = &audit[2];
    assert_eq!(scenario_b.status, RawOpportunityStatus::Rejected);
    assert!(scenario_b.fresher_score <= -75);

    let walk_in = &audit[4];
    assert_eq!(walk_in.status, RawOpportunityStatus::DraftCreated);
    assert_eq!(walk_in.suggested_type, PostingType::WalkIn);
    assert_eq!(walk_in.apply_link, None);

    let postings = store.all_postings().await;
    assert_eq!(postings.len(), 2);
    assert!(postings.iter().all(|p| p.status == PostingStatus::Draft));
    assert!(postings.iter().all(|p| p.created_by == "ops@intake"));

    let source = store.find_source(source.id).await.unwrap().unwrap();
    assert!(source.last_run_at.is_some());
    assert_eq!(source.last_run_at, source.last_success_at);
}

#[tokio::test]
async fn rerunning_a_source_dedupes_everything() {
    let server = MockServer::start().await;
    serve_feed(
        &server,
        "/feed.json",
        json!([
            {"title": "Graduate Trainee", "company": "Acme", "url": "https://x.com/job/1", "experienceMax": 1},
            {"title": "Entry Level Analyst", "company": "Acme", "url": "https://x.com/job/7", "experienceMax": 0}
        ]),
    )
    .await;

    let store = Arc::new(InMemoryStore::new());
    let source = add_source(&store, "Board", format!("{}/feed.json", server.uri())).await;
    let service = service(store.clone(), registry(), Some("ops"));

    let first = service.run_source_by_id(source.id).await.unwrap();
    let second = service.run_source_by_id(source.id).await.unwrap();

    assert_eq!(first.draft_created_count, 2);
    assert_eq!(second.draft_created_count, 0);
    assert_eq!(second.deduped_count, 2);
    assert_eq!(store.all_postings().await.len(), 2);

    let runs = store.list_runs_for_source(source.id, 10).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|run| run.status == RunStatus::Success));
}

#[tokio::test]
async fn failing_source_does_not_stop_the_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    serve_feed(
        &server,
        "/good.json",
        json!([{"title": "Trainee Engineer", "company": "Acme", "applyLink": "https://x.com/job/3", "experienceMax": 0}]),
    )
    .await;

    let store = Arc::new(InMemoryStore::new());
    let broken = add_source(&store, "A Broken", format!("{}/broken.json", server.uri())).await;
    let good = add_source(&store, "B Good", format!("{}/good.json", server.uri())).await;
    let service = service(store.clone(), registry(), Some("ops"));

    let cycle = service.run_cycle().await.unwrap();
    assert_eq!(cycle.results.len(), 2);

    let broken_result = cycle.results.iter().find(|r| r.source_id == broken.id).unwrap();
    assert!(broken_result.summary.is_none());
    assert!(broken_result.error.as_deref().unwrap().contains("500"));

    let good_result = cycle.results.iter().find(|r| r.source_id == good.id).unwrap();
    assert_eq!(good_result.summary.as_ref().unwrap().draft_created_count, 1);

    let broken_runs = store.list_runs_for_source(broken.id, 10).await.unwrap();
    assert_eq!(broken_runs[0].status, RunStatus::Failed);
    let broken = store.find_source(broken.id).await.unwrap().unwrap();
    assert!(broken.last_run_at.is_some());
    assert!(broken.last_success_at.is_none());
}

#[tokio::test]
async fn non_json_feed_fails_the_run_and_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    let source = add_source(&store, "Board", format!("{}/feed.json", server.uri())).await;
    let service = service(store.clone(), registry(), Some("ops"));

    let err = service.run_source_by_id(source.id).await.unwrap_err();
    assert!(matches!(err, AppError::Source(_)));

    let runs = store.list_runs_for_source(source.id, 1).await.unwrap();
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert!(runs[0].error_summary.is_some());
    assert_eq!(runs[0].fetched_count, 0);
}

#[tokio::test]
async fn missing_owner_fails_run_without_creating_drafts() {
    let server = MockServer::start().await;
    serve_feed(&server, "/feed.json", mixed_feed()).await;

    let store = Arc::new(InMemoryStore::new());
    let source = add_source(&store, "Board", format!("{}/feed.json", server.uri())).await;
    let service = service(store.clone(), registry(), None);

    let cycle = service.run_cycle().await.unwrap();
    let result = &cycle.results[0];
    assert!(result.error.as_deref().unwrap().contains("default_owner_id"));

    let runs = store.list_runs_for_source(source.id, 1).await.unwrap();
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert!(store.all_postings().await.is_empty());

    let err = service.run_source_by_id(source.id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Processing(ProcessingError::Configuration { .. })
    ));
}

/// Hands the tracker candidates that bypass feed normalization
struct RawCandidates(Vec<Candidate>);

#[async_trait]
impl SourceAdapter for RawCandidates {
    fn source_type(&self) -> SourceType {
        SourceType::Custom
    }

    async fn fetch(&self, _source: &IngestionSource) -> SourceResult<Value> {
        Ok(Value::Null)
    }

    fn normalize(&self, _source: &IngestionSource, _payload: &Value) -> Vec<Candidate> {
        self.0.clone()
    }
}

#[tokio::test]
async fn bad_item_is_recorded_and_the_batch_continues() {
    let mut broken = Candidate::new(PostingType::Job, "Graduate Trainee", "");
    broken.apply_link = Some("https://x.com/job/11".to_string());
    broken.experience_max = Some(0);
    let mut good = Candidate::new(PostingType::Job, "Graduate Trainee", "Acme");
    good.apply_link = Some("https://x.com/job/12".to_string());
    good.experience_max = Some(0);

    let mut registry = SourceAdapterRegistry::new();
    registry.register(Arc::new(RawCandidates(vec![broken, good])));

    let store = Arc::new(InMemoryStore::new());
    let source = store
        .create_source(IngestionSourceCreateRequest {
            name: "Custom board".to_string(),
            endpoint: "https://board.example.com/api/jobs".to_string(),
            source_type: SourceType::Custom,
            default_posting_type: PostingType::Job,
            run_frequency_minutes: 30,
            enabled: true,
        })
        .await
        .unwrap();
    let service = service(store.clone(), Arc::new(registry), Some("ops"));

    let summary = service.run_source_by_id(source.id).await.unwrap();
    assert_eq!(summary.status, RunStatus::Partial);
    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.draft_created_count, 1);

    let audit = store
        .list_raw_opportunities_for_run(summary.run_id)
        .await
        .unwrap();
    assert_eq!(audit[0].status, RawOpportunityStatus::Error);
    assert!(audit[0].error_message.is_some());
    assert_eq!(audit[1].status, RawOpportunityStatus::DraftCreated);
}
