//! Shared test utilities for coursewise-server integration tests

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use coursewise_core::{
    Catalog, Conversation, Course, Difficulty, EngineConfig, HashingEmbedder, MemoryStore,
    MemoryVectorIndex, RecommendationEngine, RecommendationJobs,
};
use coursewise_models::TextGenerator;
use coursewise_server::{AppState, CoursewiseServer, ServerConfig, create_router};
use tokio::net::TcpListener;

pub const EXPLANATION: &str = "It lines up with what you want to learn.";

/// Always answers with [`EXPLANATION`], or with a preference JSON document
/// when asked to extract preferences
struct StubGenerator;

#[async_trait]
impl TextGenerator for StubGenerator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, prompt: &str) -> coursewise_models::Result<String> {
        if prompt.contains("JSON") {
            Ok(r#"{"preferred_categories": ["Data Science"], "preferred_difficulty": "beginner"}"#
                .to_string())
        } else {
            Ok(EXPLANATION.to_string())
        }
    }
}

fn course(id: &str, title: &str, category: &str, difficulty: Difficulty) -> Course {
    Course {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} for {} learners", title, difficulty),
        category: category.to_string(),
        difficulty,
        duration: 30,
        tags: BTreeSet::from([category.to_lowercase()]),
        rating: 4.7,
        price: 49.0,
    }
}

/// State over a small indexed catalog with in-memory storage
pub async fn test_state() -> Arc<AppState> {
    let catalog = Catalog::new(vec![
        course("1", "Python Basics", "Programming", Difficulty::Beginner),
        course("2", "Statistics with R", "Data Science", Difficulty::Beginner),
        course("3", "Deep Learning", "Data Science", Difficulty::Advanced),
        course("4", "Startup Finance", "Business", Difficulty::Intermediate),
    ])
    .unwrap();

    let store = Arc::new(MemoryStore::new());
    let generator: Arc<dyn TextGenerator> = Arc::new(StubGenerator);
    let index = Arc::new(MemoryVectorIndex::new(Arc::new(HashingEmbedder::default())));
    let engine = Arc::new(RecommendationEngine::new(
        Arc::new(catalog),
        index,
        store.clone(),
        generator.clone(),
        EngineConfig::default(),
    ));
    engine.index_catalog().await.unwrap();

    let jobs = Arc::new(RecommendationJobs::new(engine.clone(), None));
    let conversation = Arc::new(Conversation::new(
        engine.clone(),
        jobs.clone(),
        store,
        generator,
    ));
    Arc::new(AppState::new(engine, jobs, conversation))
}

pub async fn test_server() -> TestServer {
    TestServer::new(create_router(test_state().await)).unwrap()
}

/// Spawns a real server in a background task, returns bound address
pub async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = CoursewiseServer::new(ServerConfig::default(), test_state().await);

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    addr
}
