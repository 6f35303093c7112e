//! Orchestrates one extraction request: cache check, page fetch, strategy
//! loop with score-driven fallback, cache store. Extraction problems surface
//! as quality scores and metadata; only a missing page is an error.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::{ResultCache, DEFAULT_TTL};
use crate::error::ExtractError;
use crate::fetch::PageFetcher;
use crate::parser::{self, DEFAULT_LOOK_AHEAD};
use crate::quality::{self, ScoreConfig};
use crate::records::{CourseRecord, ExtractionMeta, ExtractionRequest, ExtractionResult};
use crate::registry::StrategyRegistry;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub score: ScoreConfig,
    pub look_ahead: usize,
    pub cache_ttl: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            score: ScoreConfig::default(),
            look_ahead: DEFAULT_LOOK_AHEAD,
            cache_ttl: DEFAULT_TTL,
        }
    }
}

pub struct ExtractionCoordinator {
    fetcher: Arc<dyn PageFetcher>,
    registry: StrategyRegistry,
    cache: ResultCache,
    config: CoordinatorConfig,
}

impl ExtractionCoordinator {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        registry: StrategyRegistry,
        config: CoordinatorConfig,
    ) -> Self {
        let cache = ResultCache::new(config.cache_ttl);
        Self { fetcher, registry, cache, config }
    }

    pub fn with_defaults(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::new(fetcher, StrategyRegistry::default(), CoordinatorConfig::default())
    }

    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractError> {
        let key = request.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            info!(key = %key, courses = hit.courses.len(), "cache hit");
            return Ok(hit);
        }
        debug!(key = %key, "cache miss, extracting fresh");

        let raw = self.fetcher.fetch_page(request).await.map_err(|cause| {
            ExtractError::Fetch {
                term: request.term.clone(),
                subject: request.subject.clone(),
                cause,
            }
        })?;
        if raw.trim().is_empty() {
            return Err(ExtractError::NoRawInput {
                term: request.term.clone(),
                subject: request.subject.clone(),
            });
        }

        let lines = parser::tokenize(&raw);
        let subject = request.subject_code();
        let threshold = self.config.score.pass_threshold;

        // First strategy to meet the threshold wins; otherwise the best batch
        // seen is returned marked needs_improvement.
        let mut best: Option<(Vec<CourseRecord>, &'static str, u8)> = None;
        for kind in self.registry.candidates_for(&subject) {
            let records = parser::run_strategy(kind, &lines, &subject, self.config.look_ahead);
            let score = quality::score(&records, &self.config.score);
            self.registry.record_outcome(kind, score >= threshold);
            debug!(strategy = kind.name(), score, records = records.len(), "strategy attempt");

            if best.as_ref().map_or(true, |(_, _, top)| score > *top) {
                best = Some((records, kind.name(), score));
            }
            if score >= threshold {
                break;
            }
        }

        let (courses, parser_used, score) =
            best.unwrap_or_else(|| (Vec::new(), "none", 0));
        if score < threshold {
            warn!(
                subject = %subject,
                score,
                "all strategies below threshold, returning best effort"
            );
        }

        let total_courses = courses.len();
        let courses = request.apply_filters(courses);
        let result = ExtractionResult {
            metadata: ExtractionMeta {
                parser_used: parser_used.to_string(),
                quality_score: score,
                needs_improvement: quality::needs_improvement(score, &self.config.score),
                from_cache: false,
                extracted_at: Utc::now(),
                total_courses,
            },
            courses,
        };
        self.cache.put(&key, &result);
        info!(
            subject = %subject,
            parser = %result.metadata.parser_used,
            score,
            courses = result.courses.len(),
            "extraction complete"
        );
        Ok(result)
    }
}
