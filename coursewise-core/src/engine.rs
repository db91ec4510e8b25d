//! Recommendation orchestration
//!
//! [`RecommendationEngine`] ties the catalog, the embedding index, the
//! preference store and the text generator together. It is `Send + Sync`
//! and meant to be shared behind an `Arc`; requests for different users
//! run in parallel, and requests for the same user are serialized by the
//! caller if ordering matters.
//!
//! No request writes anything before its final store call, so a request
//! future can be dropped at any await point without leaving partial state.

use std::sync::Arc;

use coursewise_models::TextGenerator;
use tracing::{debug, info, instrument, warn};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::explain::Explainer;
use crate::extraction::PreferenceExtractor;
use crate::feedback::apply_feedback;
use crate::index::{EmbeddingIndex, IndexHit};
use crate::retry::RetryPolicy;
use crate::scoring::Ranker;
use crate::store::{PreferenceStore, StoreError};
use crate::types::{
    CandidateResult, FeedbackReceipt, InteractionRecord, PreferenceProfile, RecommendationSet,
    UserRecord,
};

/// Query used when the user gave none and has no preferred categories
pub const GENERIC_QUERY: &str = "Recommend popular, highly rated courses for skill development";

/// Query used when the user gave none
pub fn synthesize_query(preferences: &PreferenceProfile) -> String {
    if preferences.preferred_categories.is_empty() {
        GENERIC_QUERY.to_string()
    } else {
        format!(
            "Recommend courses based on my interests: {}",
            preferences.categories_text()
        )
    }
}

/// Append the profile to the query so the embedding reflects both
pub fn enrich_query(query: &str, preferences: &PreferenceProfile) -> String {
    let mut enriched = query.trim().to_string();
    if !preferences.preferred_categories.is_empty() {
        enriched.push_str(&format!(
            "\nPreferred categories: {}",
            preferences.categories_text()
        ));
    }
    if let Some(difficulty) = preferences.preferred_difficulty {
        enriched.push_str(&format!("\nPreferred difficulty: {}", difficulty));
    }
    if let Some(style) = preferences.learning_style {
        enriched.push_str(&format!("\nLearning style: {}", style));
    }
    enriched
}

fn read_failure(err: StoreError) -> EngineError {
    EngineError::ServiceUnavailable(err.to_string())
}

fn write_failure(err: StoreError) -> EngineError {
    match err {
        StoreError::UserNotFound(id) => EngineError::UserNotFound(id),
        StoreError::UserExists(id) => EngineError::UserExists(id),
        other => EngineError::StoreWriteFailure(other.to_string()),
    }
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EngineError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Turns queries, profiles and history into explained recommendations
pub struct RecommendationEngine {
    catalog: Arc<Catalog>,
    index: Arc<dyn EmbeddingIndex>,
    store: Arc<dyn PreferenceStore>,
    explainer: Explainer,
    extractor: PreferenceExtractor,
    ranker: Ranker,
    retry: RetryPolicy,
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<Catalog>,
        index: Arc<dyn EmbeddingIndex>,
        store: Arc<dyn PreferenceStore>,
        generator: Arc<dyn TextGenerator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            catalog,
            index,
            store,
            explainer: Explainer::new(generator.clone(), config.timeout()),
            extractor: PreferenceExtractor::new(generator, config.timeout()),
            ranker: Ranker::new(config.scoring.clone()),
            retry: RetryPolicy::from_config(&config.retry),
            config,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of recommendations returned when the caller does not say
    pub fn default_limit(&self) -> usize {
        self.config.default_limit
    }

    // ────────────────────────────────────────────────────────────────────────
    // Catalog
    // ────────────────────────────────────────────────────────────────────────

    /// Embed every catalog course into the index (replacing by id)
    pub async fn index_catalog(&self) -> Result<usize> {
        let documents = self.catalog.documents();
        let written = self
            .index
            .index(documents)
            .await
            .map_err(|e| EngineError::ServiceUnavailable(e.to_string()))?;
        info!(courses = written, "catalog indexed");
        Ok(written)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Users and preferences
    // ────────────────────────────────────────────────────────────────────────

    /// Register a user, extracting preferences from `description`
    #[instrument(skip(self, description), level = "debug")]
    pub async fn create_user(
        &self,
        user_id: &str,
        name: &str,
        description: &str,
    ) -> Result<UserRecord> {
        require(user_id, "user_id")?;
        require(name, "name")?;
        if self.store.get_user(user_id).await.map_err(read_failure)?.is_some() {
            return Err(EngineError::UserExists(user_id.to_string()));
        }

        let preferences = self.extractor.extract(description).await;
        self.create_user_with_profile(user_id, name, preferences)
            .await
    }

    /// Register a user with an already structured profile
    #[instrument(skip(self, preferences), level = "debug")]
    pub async fn create_user_with_profile(
        &self,
        user_id: &str,
        name: &str,
        preferences: PreferenceProfile,
    ) -> Result<UserRecord> {
        require(user_id, "user_id")?;
        require(name, "name")?;

        let user = UserRecord::new(user_id.trim(), name.trim(), preferences);
        self.retry
            .run(
                "create_user",
                || self.store.create_user(user.clone()),
                StoreError::is_transient,
            )
            .await
            .map_err(write_failure)?;

        info!(user_id = %user.user_id, "user registered");
        Ok(user)
    }

    pub async fn user(&self, user_id: &str) -> Result<UserRecord> {
        self.store
            .get_user(user_id)
            .await
            .map_err(read_failure)?
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))
    }

    pub async fn preferences(&self, user_id: &str) -> Result<PreferenceProfile> {
        self.load_profile(user_id)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))
    }

    async fn load_profile(&self, user_id: &str) -> Result<Option<PreferenceProfile>> {
        self.retry
            .run(
                "get_profile",
                || self.store.get_profile(user_id),
                StoreError::is_transient,
            )
            .await
            .map_err(read_failure)
    }

    /// Re-extract the profile from a new description, keeping `custom`
    #[instrument(skip(self, description), level = "debug")]
    pub async fn update_preferences(
        &self,
        user_id: &str,
        description: &str,
    ) -> Result<PreferenceProfile> {
        require(description, "description")?;
        let current = self.preferences(user_id).await?;

        let mut profile = self.extractor.extract(description).await;
        profile.custom = current.custom;
        self.write_profile(user_id, &profile).await?;
        Ok(profile)
    }

    /// Attach free text to the profile
    pub async fn set_custom_preference(
        &self,
        user_id: &str,
        text: &str,
    ) -> Result<PreferenceProfile> {
        require(text, "preference text")?;
        let mut profile = self.preferences(user_id).await?;
        profile.custom = Some(text.trim().to_string());
        self.write_profile(user_id, &profile).await?;
        Ok(profile)
    }

    async fn write_profile(&self, user_id: &str, profile: &PreferenceProfile) -> Result<()> {
        self.retry
            .run(
                "put_profile",
                || self.store.put_profile(user_id, profile),
                StoreError::is_transient,
            )
            .await
            .map_err(write_failure)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Interaction log
    // ────────────────────────────────────────────────────────────────────────

    async fn append(&self, record: InteractionRecord) -> Result<()> {
        self.retry
            .run(
                "append_interaction",
                || self.store.append_interaction(record.clone()),
                StoreError::is_transient,
            )
            .await
            .map_err(|e| EngineError::StoreWriteFailure(e.to_string()))
    }

    async fn history(&self, user_id: &str) -> Result<Vec<InteractionRecord>> {
        self.store
            .list_interactions(user_id)
            .await
            .map_err(read_failure)
    }

    /// Log a recommendation request under a sentinel course id
    pub async fn log_query(&self, user_id: &str, sentinel: &str, query: &str) -> Result<()> {
        require(user_id, "user_id")?;
        require(query, "query")?;
        self.append(InteractionRecord::query(user_id, sentinel, query.trim()))
            .await
    }

    /// Log that the user opened a course
    pub async fn record_view(&self, user_id: &str, course_id: &str) -> Result<()> {
        require(user_id, "user_id")?;
        require(course_id, "course_id")?;
        self.append(InteractionRecord::view(user_id, course_id)).await
    }

    /// Most recently logged query text
    pub async fn last_query(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self
            .history(user_id)
            .await?
            .iter()
            .find_map(|r| r.query_text().map(str::to_string)))
    }

    /// Every logged query text, newest first
    pub async fn query_history(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self
            .history(user_id)
            .await?
            .iter()
            .filter_map(|r| r.query_text().map(str::to_string))
            .collect())
    }

    // ────────────────────────────────────────────────────────────────────────
    // Recommendations and feedback
    // ────────────────────────────────────────────────────────────────────────

    fn candidate_from_hit(&self, hit: IndexHit) -> Option<CandidateResult> {
        let similarity = 1.0 - hit.distance;
        if let Some(course) = self.catalog.get(&hit.id) {
            return Some(CandidateResult::new(course.clone(), similarity));
        }
        match serde_json::from_value(hit.metadata) {
            Ok(course) => Some(CandidateResult::new(course, similarity)),
            Err(e) => {
                warn!(course_id = %hit.id, error = %e, "index hit is not a known course");
                None
            }
        }
    }

    /// Ranked, explained recommendations for a user.
    ///
    /// An empty `query` is synthesized from the preferred categories.
    #[instrument(skip(self, query), level = "debug")]
    pub async fn get_recommendations(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<RecommendationSet> {
        if limit == 0 {
            return Err(EngineError::InvalidInput(
                "limit must be at least 1".to_string(),
            ));
        }

        let preferences = self.preferences(user_id).await?;
        let history = self.history(user_id).await?;

        let query = if query.trim().is_empty() {
            synthesize_query(&preferences)
        } else {
            query.trim().to_string()
        };
        let enriched = enrich_query(&query, &preferences);
        let k = self.config.candidate_count(limit);

        let hits = match tokio::time::timeout(self.config.timeout(), self.index.query(&enriched, k))
            .await
        {
            Ok(Ok(hits)) => hits,
            Ok(Err(e)) => return Err(EngineError::ServiceUnavailable(e.to_string())),
            Err(_) => {
                return Err(EngineError::ServiceUnavailable(format!(
                    "index query timed out after {}ms",
                    self.config.timeout_ms
                )));
            }
        };
        debug!(hits = hits.len(), k, "index query finished");

        let candidates: Vec<CandidateResult> = hits
            .into_iter()
            .filter_map(|hit| self.candidate_from_hit(hit))
            .collect();

        let mut ranked = self.ranker.score_all(&candidates, &preferences, &history);
        let total_found = ranked.len();
        ranked.truncate(limit);

        let mut recommendations = Vec::with_capacity(ranked.len());
        for candidate in ranked {
            let explanation = self
                .explainer
                .explain(&candidate.course, &preferences, &history)
                .await;
            recommendations.push(candidate.annotate(explanation));
        }

        info!(
            user_id,
            returned = recommendations.len(),
            total_found,
            "recommendations generated"
        );

        Ok(RecommendationSet {
            user_id: user_id.to_string(),
            recommendations,
            total_found,
        })
    }

    /// Log a rating and learn from it.
    ///
    /// The interaction is logged even for unknown users or courses; the
    /// profile only changes when both are known and the rating teaches
    /// something new. A profile that cannot be read even after retries is
    /// reported as [`EngineError::ServiceUnavailable`].
    #[instrument(skip(self, feedback), level = "debug")]
    pub async fn record_feedback(
        &self,
        user_id: &str,
        course_id: &str,
        rating: u8,
        feedback: Option<String>,
    ) -> Result<FeedbackReceipt> {
        if !(1..=5).contains(&rating) {
            return Err(EngineError::InvalidInput(format!(
                "rating must be between 1 and 5, got {}",
                rating
            )));
        }
        require(user_id, "user_id")?;
        require(course_id, "course_id")?;

        self.append(InteractionRecord::feedback(
            user_id,
            course_id,
            Some(rating),
            feedback,
        ))
        .await?;

        let logged_only = FeedbackReceipt {
            logged: true,
            preferences_updated: false,
        };

        let Some(profile) = self.load_profile(user_id).await.inspect_err(|e| {
            warn!(user_id, error = %e, "feedback logged but profile could not be loaded");
        })?
        else {
            debug!(user_id, "feedback from unknown user, nothing to learn");
            return Ok(logged_only);
        };
        let Some(course) = self.catalog.get(course_id) else {
            debug!(course_id, "feedback for unknown course, nothing to learn");
            return Ok(logged_only);
        };

        let outcome = apply_feedback(&profile, course, rating);
        if !outcome.changed {
            return Ok(logged_only);
        }

        self.write_profile(user_id, &outcome.profile).await?;
        info!(user_id, course_id, rating, "preferences updated from feedback");

        Ok(FeedbackReceipt {
            logged: true,
            preferences_updated: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::types::{Difficulty, LearningStyle};

    #[test]
    fn test_synthesized_query_lists_categories() {
        let prefs = PreferenceProfile {
            preferred_categories: BTreeSet::from(["Programming".to_string(), "AI".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            synthesize_query(&prefs),
            "Recommend courses based on my interests: AI, Programming"
        );
    }

    #[test]
    fn test_synthesized_query_without_categories_is_generic() {
        let prefs = PreferenceProfile {
            preferred_categories: BTreeSet::new(),
            ..Default::default()
        };
        assert_eq!(synthesize_query(&prefs), GENERIC_QUERY);
    }

    #[test]
    fn test_enriched_query_appends_profile() {
        let prefs = PreferenceProfile {
            preferred_categories: BTreeSet::from(["Programming".to_string()]),
            preferred_difficulty: Some(Difficulty::Beginner),
            learning_style: Some(LearningStyle::Visual),
            ..Default::default()
        };
        assert_eq!(
            enrich_query(" python ", &prefs),
            "python\nPreferred categories: Programming\nPreferred difficulty: beginner\nLearning style: visual"
        );
    }

    #[test]
    fn test_enriched_query_skips_absent_fields() {
        let prefs = PreferenceProfile {
            preferred_categories: BTreeSet::new(),
            preferred_difficulty: None,
            learning_style: None,
            ..Default::default()
        };
        assert_eq!(enrich_query("python", &prefs), "python");
    }

    #[test]
    fn test_write_failures_keep_identity_errors() {
        assert!(matches!(
            write_failure(StoreError::UserNotFound("u".into())),
            EngineError::UserNotFound(_)
        ));
        assert!(matches!(
            write_failure(StoreError::Backend("locked".into())),
            EngineError::StoreWriteFailure(_)
        ));
    }
}
