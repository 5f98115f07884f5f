//! Run Research use case
//!
//! Drives a [`ResearchTask`] through
//! `Planning → Searching → Extracting → Verifying? → Synthesizing`.
//! Every phase except Synthesizing recovers from its own failures;
//! a failed synthesis fails the run and no partial report is returned.

use super::route_inference::InferenceRouter;
use crate::config::ResearchConfig;
use crate::ports::event_logger::{NoEventLogger, ResearchEvent, ResearchEventLogger};
use crate::ports::progress::{NoProgress, ResearchProgressNotifier};
use crate::ports::provider_gateway::ProviderGateway;
use crate::ports::source_provider::SourceProvider;
use deepdive_domain::{
    FactReport, LlmRequest, LlmResponse, ResearchMetadata, ResearchPrompt, ResearchReport,
    ResearchRequest, ResearchResponse, ResearchState, ResearchTask, SubQuestionPlan, TaskKind,
    merge_hits, parse_structured_or_default, rank_sources,
};
use futures::future::join_all;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that fail a research run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResearchError {
    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("research cancelled")]
    Cancelled,
}

/// Use case for running a research request
pub struct RunResearchUseCase<G: ProviderGateway + 'static, S: SourceProvider + 'static> {
    router: Arc<InferenceRouter<G>>,
    sources: Arc<S>,
    config: ResearchConfig,
    events: Arc<dyn ResearchEventLogger>,
}

impl<G: ProviderGateway + 'static, S: SourceProvider + 'static> RunResearchUseCase<G, S> {
    pub fn new(router: Arc<InferenceRouter<G>>, sources: Arc<S>, config: ResearchConfig) -> Self {
        Self {
            router,
            sources,
            config,
            events: Arc::new(NoEventLogger),
        }
    }

    pub fn with_event_logger(mut self, events: Arc<dyn ResearchEventLogger>) -> Self {
        self.events = events;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, request: ResearchRequest) -> ResearchResponse {
        self.execute_with_progress(request, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: ResearchRequest,
        progress: &dyn ResearchProgressNotifier,
    ) -> ResearchResponse {
        self.execute_with_cancellation(request, progress, &CancellationToken::new())
            .await
    }

    /// Execute the use case, checking `cancel` between phases
    pub async fn execute_with_cancellation(
        &self,
        request: ResearchRequest,
        progress: &dyn ResearchProgressNotifier,
        cancel: &CancellationToken,
    ) -> ResearchResponse {
        let start = Instant::now();
        let mut task = ResearchTask::new(request.query.trim());
        info!("Starting research: {}", task.query);

        if let Err(e) = self.run(&mut task, &request, progress, cancel).await {
            let phase = task.state();
            task.fail(e.to_string());
            warn!("Research failed during {}: {}", phase, e);
            self.events.log(ResearchEvent::new(
                ResearchEvent::RESEARCH_FAILED,
                json!({ "query": task.query, "phase": phase.as_str(), "error": e.to_string() }),
            ));
            return ResearchResponse::failed(e.to_string());
        }

        let execution_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let metadata = ResearchMetadata {
            total_sources: task.sources.len(),
            execution_time_ms,
            queries_executed: task.queries_executed,
            model_used: task.model_used.clone(),
        };
        info!(
            "Research completed: {} sources, {} facts, {} partial failure(s), {}ms",
            metadata.total_sources,
            task.verified_facts.len(),
            task.partial_failures.len(),
            execution_time_ms
        );
        self.events.log(ResearchEvent::new(
            ResearchEvent::RESEARCH_COMPLETED,
            json!({
                "query": task.query,
                "total_sources": metadata.total_sources,
                "facts_verified": task.verified_facts.len(),
                "partial_failures": task.partial_failures,
                "execution_time_ms": execution_time_ms,
                "model_used": metadata.model_used,
            }),
        ));

        ResearchResponse::Completed(ResearchReport {
            report: task.report.unwrap_or_default(),
            sources: task.sources,
            facts_verified: task.verified_facts,
            metadata,
        })
    }

    async fn run(
        &self,
        task: &mut ResearchTask,
        request: &ResearchRequest,
        progress: &dyn ResearchProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<(), ResearchError> {
        check_cancelled(cancel)?;
        self.phase_planning(task, request, progress).await;

        check_cancelled(cancel)?;
        self.phase_searching(task, request, progress).await;

        check_cancelled(cancel)?;
        self.phase_extracting(task, progress).await;

        check_cancelled(cancel)?;
        if request.include_fact_verification && task.sources.len() >= 2 {
            self.phase_verifying(task, request, progress).await;
            check_cancelled(cancel)?;
        } else {
            debug!(
                "Skipping verification ({} sources, enabled: {})",
                task.sources.len(),
                request.include_fact_verification
            );
        }

        self.phase_synthesizing(task, request, progress).await
    }

    /// Phase 1: Ask the router for sub-questions
    async fn phase_planning(
        &self,
        task: &mut ResearchTask,
        request: &ResearchRequest,
        progress: &dyn ResearchProgressNotifier,
    ) {
        self.begin_phase(task, ResearchState::Planning, 1, progress);

        let llm_request = self.llm_request(
            ResearchPrompt::planning_system(),
            ResearchPrompt::planning_prompt(&task.query),
            TaskKind::Planning,
            request,
        );
        let response = self.router.execute(&llm_request).await;

        let fallback_plan = SubQuestionPlan::single(&task.query);
        let plan = match response.into_result() {
            Ok(text) => parse_structured_or_default(&text, fallback_plan),
            Err(e) => {
                let query = task.query.clone();
                self.partial_failure(task, ResearchState::Planning, &query, &e);
                fallback_plan
            }
        };
        task.sub_questions = plan.into_questions();
        if task.sub_questions.is_empty() {
            task.sub_questions = vec![task.query.clone()];
        }

        let summary = format!("{} sub-question(s)", task.sub_questions.len());
        self.end_phase(task, ResearchState::Planning, &summary, progress);
    }

    /// Phase 2: Search `[query, ...sub_questions]` in concurrent batches
    async fn phase_searching(
        &self,
        task: &mut ResearchTask,
        request: &ResearchRequest,
        progress: &dyn ResearchProgressNotifier,
    ) {
        let queries = task.search_queries();
        self.begin_phase(task, ResearchState::Searching, queries.len(), progress);

        let max_sources = request.max_sources.unwrap_or(self.config.max_sources);
        let batch_size = self.config.search_batch_size.max(1);
        for batch in queries.chunks(batch_size) {
            if task.sources.len() >= max_sources {
                debug!("Source cap {} reached, skipping remaining queries", max_sources);
                break;
            }

            let searches = batch.iter().map(|query| async move {
                let result = self
                    .sources
                    .search(query, self.config.results_per_query)
                    .await;
                (query, result)
            });
            let results = join_all(searches).await;
            task.queries_executed += batch.len();

            // Single-owner merge after the join
            for (query, result) in results {
                match result {
                    Ok(hits) => {
                        progress.on_query_complete(query, true);
                        let primary = *query == task.query;
                        let added = merge_hits(&mut task.sources, hits, primary, max_sources);
                        debug!("Query '{}' added {} source(s)", query, added);
                    }
                    Err(e) => {
                        progress.on_query_complete(query, false);
                        self.partial_failure(task, ResearchState::Searching, query, &e.to_string());
                    }
                }
            }
        }

        rank_sources(&mut task.sources);
        let summary = format!(
            "{} source(s) from {} quer(ies)",
            task.sources.len(),
            task.queries_executed
        );
        self.end_phase(task, ResearchState::Searching, &summary, progress);
    }

    /// Phase 3: Scrape the top sources concurrently
    async fn phase_extracting(&self, task: &mut ResearchTask, progress: &dyn ResearchProgressNotifier) {
        let top_n = self.config.scrape_top_n.min(task.sources.len());
        self.begin_phase(task, ResearchState::Extracting, top_n, progress);

        let urls: Vec<String> = task.sources[..top_n].iter().map(|s| s.url.clone()).collect();
        let scrapes = urls.iter().map(|url| self.sources.scrape(url));
        let results = join_all(scrapes).await;

        let mut scraped = 0;
        for (idx, result) in results.into_iter().enumerate() {
            match result {
                Ok(page) => {
                    progress.on_source_scraped(&urls[idx], true);
                    task.sources[idx].apply_scrape(page);
                    if task.sources[idx].scraped {
                        scraped += 1;
                    }
                }
                Err(e) => {
                    progress.on_source_scraped(&urls[idx], false);
                    self.partial_failure(task, ResearchState::Extracting, &urls[idx], &e.to_string());
                }
            }
        }

        let summary = format!("{}/{} page(s) scraped", scraped, top_n);
        self.end_phase(task, ResearchState::Extracting, &summary, progress);
    }

    /// Phase 4: Cross-check claims across sources
    async fn phase_verifying(
        &self,
        task: &mut ResearchTask,
        request: &ResearchRequest,
        progress: &dyn ResearchProgressNotifier,
    ) {
        self.begin_phase(task, ResearchState::Verifying, 1, progress);

        let llm_request = self.llm_request(
            ResearchPrompt::verification_system(),
            ResearchPrompt::verification_prompt(
                &task.query,
                &task.sources,
                self.config.verification_content_limit,
                self.config.per_source_content_limit,
            ),
            TaskKind::Research,
            request,
        );
        task.verified_facts = match self.router.execute(&llm_request).await.into_result() {
            Ok(text) => parse_structured_or_default(&text, FactReport::default()).into_verified_facts(),
            Err(e) => {
                let query = task.query.clone();
                self.partial_failure(task, ResearchState::Verifying, &query, &e);
                Vec::new()
            }
        };

        let verified = task.verified_facts.iter().filter(|f| f.verified).count();
        let summary = format!("{}/{} fact(s) verified", verified, task.verified_facts.len());
        self.end_phase(task, ResearchState::Verifying, &summary, progress);
    }

    /// Phase 5: Write the cited report
    async fn phase_synthesizing(
        &self,
        task: &mut ResearchTask,
        request: &ResearchRequest,
        progress: &dyn ResearchProgressNotifier,
    ) -> Result<(), ResearchError> {
        self.begin_phase(task, ResearchState::Synthesizing, 1, progress);

        let llm_request = self.llm_request(
            &ResearchPrompt::synthesis_system(request.report_type),
            ResearchPrompt::synthesis_prompt(
                &task.query,
                &task.sources,
                &task.verified_facts,
                self.config.verification_content_limit,
                self.config.per_source_content_limit,
            ),
            TaskKind::Synthesis,
            request,
        );
        let response: LlmResponse = self.router.execute(&llm_request).await;
        let model_used = response.model_used.clone();
        let report = response.into_result().map_err(ResearchError::Synthesis)?;

        let summary = format!(
            "{} chars by {}",
            report.len(),
            model_used.as_ref().map(|m| m.as_str()).unwrap_or("unknown")
        );
        self.end_phase(task, ResearchState::Synthesizing, &summary, progress);
        task.complete(report, model_used);
        Ok(())
    }

    fn llm_request(
        &self,
        system: &str,
        user: String,
        task: TaskKind,
        request: &ResearchRequest,
    ) -> LlmRequest {
        let defaults = self.router.config();
        LlmRequest::from_prompt(system, user)
            .with_task(task)
            .with_prefer_local(request.prefer_local)
            .with_max_tokens(defaults.default_max_tokens)
            .with_temperature(defaults.default_temperature)
    }

    fn begin_phase(
        &self,
        task: &mut ResearchTask,
        phase: ResearchState,
        total_tasks: usize,
        progress: &dyn ResearchProgressNotifier,
    ) {
        task.transition(phase);
        info!("Phase: {}", phase);
        progress.on_phase_start(phase, total_tasks);
        self.events.log(ResearchEvent::new(
            ResearchEvent::PHASE_STARTED,
            json!({ "phase": phase.as_str(), "query": task.query }),
        ));
    }

    fn end_phase(
        &self,
        task: &ResearchTask,
        phase: ResearchState,
        summary: &str,
        progress: &dyn ResearchProgressNotifier,
    ) {
        info!("{} complete: {}", phase, summary);
        progress.on_phase_complete(phase, summary);
        self.events.log(ResearchEvent::new(
            ResearchEvent::PHASE_COMPLETED,
            json!({ "phase": phase.as_str(), "query": task.query, "summary": summary }),
        ));
    }

    fn partial_failure(&self, task: &mut ResearchTask, phase: ResearchState, target: &str, error: &str) {
        warn!("{} failed for '{}': {}", phase, target, error);
        task.record_partial_failure(format!("{}: {}: {}", phase.as_str(), target, error));
        self.events.log(ResearchEvent::new(
            ResearchEvent::PARTIAL_FAILURE,
            json!({ "phase": phase.as_str(), "target": target, "error": error }),
        ));
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), ResearchError> {
    if cancel.is_cancelled() {
        Err(ResearchError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::ports::credentials::StaticCredentials;
    use crate::ports::provider_gateway::ProviderError;
    use crate::ports::source_provider::SourceError;
    use crate::use_cases::test_support::{MockGateway, http_500, reply, three_tier_registry};
    use async_trait::async_trait;
    use deepdive_domain::{CrawledPage, ScrapedPage, SearchHit};
    use std::collections::HashMap;
    use std::sync::Mutex;

    // -- Mock SourceProvider ---------------------------------------------------

    #[derive(Default)]
    struct MockSources {
        hits: HashMap<String, Result<Vec<SearchHit>, SourceError>>,
        pages: HashMap<String, Result<ScrapedPage, SourceError>>,
        searched: Mutex<Vec<String>>,
        scraped: Mutex<Vec<String>>,
    }

    impl MockSources {
        fn search_result(mut self, query: &str, urls: &[&str]) -> Self {
            let hits = urls
                .iter()
                .map(|u| SearchHit::new(*u, format!("Title {u}"), format!("snippet for {u}")))
                .collect();
            self.hits.insert(query.to_string(), Ok(hits));
            self
        }

        fn search_error(mut self, query: &str) -> Self {
            self.hits
                .insert(query.to_string(), Err(SourceError::Http { status: 503 }));
            self
        }

        fn page(mut self, url: &str, content: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                Ok(ScrapedPage {
                    content: content.to_string(),
                    ..Default::default()
                }),
            );
            self
        }

        fn page_error(mut self, url: &str) -> Self {
            self.pages
                .insert(url.to_string(), Err(SourceError::Transport("reset".into())));
            self
        }

        fn searched(&self) -> Vec<String> {
            self.searched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SourceProvider for MockSources {
        async fn search(&self, query: &str, _max: usize) -> Result<Vec<SearchHit>, SourceError> {
            self.searched.lock().unwrap().push(query.to_string());
            self.hits.get(query).cloned().unwrap_or(Ok(vec![]))
        }

        async fn scrape(&self, url: &str) -> Result<ScrapedPage, SourceError> {
            self.scraped.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .unwrap_or_else(|| Ok(ScrapedPage::default()))
        }

        async fn crawl(&self, _: &str, _: usize, _: usize) -> Result<Vec<CrawledPage>, SourceError> {
            Ok(vec![])
        }
    }

    // -- Recording notifiers -----------------------------------------------------

    #[derive(Default)]
    struct RecordingProgress {
        started: Mutex<Vec<ResearchState>>,
    }

    impl ResearchProgressNotifier for RecordingProgress {
        fn on_phase_start(&self, phase: ResearchState, _total: usize) {
            self.started.lock().unwrap().push(phase);
        }
        fn on_phase_complete(&self, _phase: ResearchState, _summary: &str) {}
    }

    #[derive(Default)]
    struct RecordingEvents {
        events: Mutex<Vec<(&'static str, serde_json::Value)>>,
    }

    impl RecordingEvents {
        fn of_type(&self, event_type: &str) -> Vec<serde_json::Value> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(t, _)| *t == event_type)
                .map(|(_, p)| p.clone())
                .collect()
        }
    }

    impl ResearchEventLogger for RecordingEvents {
        fn log(&self, event: ResearchEvent) {
            self.events
                .lock()
                .unwrap()
                .push((event.event_type, event.payload));
        }
    }

    // -- Fixtures ------------------------------------------------------------------

    const QUERY: &str = "How do vector clocks work?";
    const PLAN: &str = r#"{"questions": ["What is a vector clock?", "Vector clocks vs Lamport clocks"]}"#;
    const FACTS: &str = r#"```json
{"facts": [{"claim": "Vector clocks capture causality", "verified": true, "sources": ["a.com", "b.com"], "confidence": 0.9}]}
```"#;

    fn is_phase(req: &LlmRequest, marker: &str) -> bool {
        req.messages[0].content.contains(marker)
    }

    /// Answers planning, verification, and synthesis by system prompt.
    fn pipeline_gateway(plan: &'static str, synthesis: Result<&'static str, ProviderError>) -> MockGateway {
        MockGateway::with_responder(move |_, req| {
            if is_phase(req, "research planner") {
                Ok(reply(plan))
            } else if is_phase(req, "fact checker") {
                Ok(reply(FACTS))
            } else {
                synthesis.clone().map(reply)
            }
        })
    }

    fn standard_sources() -> MockSources {
        MockSources::default()
            .search_result(QUERY, &["https://a.com/vc", "https://b.com/vc"])
            .search_result("What is a vector clock?", &["https://b.com/vc", "https://c.com/intro"])
            .search_result("Vector clocks vs Lamport clocks", &["https://d.com/cmp"])
            .page("https://a.com/vc", "Full article A")
    }

    fn use_case(
        gateway: Arc<MockGateway>,
        sources: Arc<MockSources>,
        config: ResearchConfig,
    ) -> RunResearchUseCase<MockGateway, MockSources> {
        let router = InferenceRouter::new(
            Arc::new(three_tier_registry()),
            gateway,
            Arc::new(StaticCredentials::new()),
            RouterConfig::default(),
        );
        RunResearchUseCase::new(Arc::new(router), sources, config)
    }

    fn completed(response: ResearchResponse) -> ResearchReport {
        match response {
            ResearchResponse::Completed(report) => report,
            ResearchResponse::Failed { error } => panic!("research failed: {error}"),
        }
    }

    // -- Tests ---------------------------------------------------------------------

    #[tokio::test]
    async fn test_full_pipeline() {
        let gateway = Arc::new(pipeline_gateway(PLAN, Ok("# Vector clocks\n\nThey track causality [1].")));
        let sources = Arc::new(standard_sources());
        let progress = RecordingProgress::default();
        let research = use_case(gateway.clone(), sources.clone(), ResearchConfig::default());

        let report = completed(
            research
                .execute_with_progress(ResearchRequest::new(QUERY), &progress)
                .await,
        );

        assert!(report.report.starts_with("# Vector clocks"));
        assert_eq!(report.metadata.queries_executed, 3);
        assert_eq!(report.metadata.total_sources, 4);
        assert_eq!(report.metadata.model_used.as_ref().map(|m| m.as_str()), Some("local"));

        // Deduplicated by URL
        let mut urls: Vec<_> = report.sources.iter().map(|s| s.url.clone()).collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), report.sources.len());

        // Primary query's top hit ranks first and was scraped
        assert_eq!(report.sources[0].url, "https://a.com/vc");
        assert!(report.sources[0].scraped);
        assert_eq!(report.sources[0].extracted_content, "Full article A");

        assert_eq!(report.facts_verified.len(), 1);
        assert!(report.facts_verified[0].supporting_domains.contains("a.com"));

        assert_eq!(
            *progress.started.lock().unwrap(),
            vec![
                ResearchState::Planning,
                ResearchState::Searching,
                ResearchState::Extracting,
                ResearchState::Verifying,
                ResearchState::Synthesizing,
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_plan_json_researches_query_only() {
        let gateway = Arc::new(pipeline_gateway("not valid json", Ok("report")));
        let sources = Arc::new(standard_sources());
        let research = use_case(gateway, sources.clone(), ResearchConfig::default());

        let report = completed(research.execute(ResearchRequest::new(QUERY)).await);

        assert_eq!(sources.searched(), vec![QUERY.to_string()]);
        assert_eq!(report.metadata.queries_executed, 1);
        assert_eq!(report.report, "report");
    }

    #[tokio::test]
    async fn test_verification_skipped_with_fewer_than_two_sources() {
        let gateway = Arc::new(pipeline_gateway("not valid json", Ok("report")));
        let sources = Arc::new(MockSources::default().search_result(QUERY, &["https://only.com"]));
        let research = use_case(gateway.clone(), sources, ResearchConfig::default());

        let report = completed(research.execute(ResearchRequest::new(QUERY)).await);

        assert_eq!(report.sources.len(), 1);
        assert!(report.facts_verified.is_empty());
        let verify_calls = gateway
            .calls()
            .iter()
            .filter(|c| c.messages[0].content.contains("fact checker"))
            .count();
        assert_eq!(verify_calls, 0);
    }

    #[tokio::test]
    async fn test_verification_disabled_by_request() {
        let gateway = Arc::new(pipeline_gateway(PLAN, Ok("report")));
        let research = use_case(gateway.clone(), Arc::new(standard_sources()), ResearchConfig::default());

        let report = completed(
            research
                .execute(ResearchRequest::new(QUERY).with_fact_verification(false))
                .await,
        );

        assert!(report.facts_verified.is_empty());
        assert!(
            gateway
                .calls()
                .iter()
                .all(|c| !c.messages[0].content.contains("fact checker"))
        );
    }

    #[tokio::test]
    async fn test_synthesis_failure_fails_run() {
        let gateway = Arc::new(pipeline_gateway(PLAN, Err(http_500())));
        let events = Arc::new(RecordingEvents::default());
        let research = use_case(gateway, Arc::new(standard_sources()), ResearchConfig::default())
            .with_event_logger(events.clone());

        let response = research.execute(ResearchRequest::new(QUERY)).await;

        assert!(!response.is_success());
        assert!(response.report().is_none());
        assert!(response.error().unwrap().starts_with("Synthesis failed"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("report").is_none());

        let failed = events.of_type(ResearchEvent::RESEARCH_FAILED);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0]["phase"], "synthesizing");
    }

    #[tokio::test]
    async fn test_search_and_scrape_failures_are_partial() {
        let gateway = Arc::new(pipeline_gateway(PLAN, Ok("report")));
        let sources = Arc::new(
            standard_sources()
                .search_error("Vector clocks vs Lamport clocks")
                .page_error("https://b.com/vc"),
        );
        let events = Arc::new(RecordingEvents::default());
        let research = use_case(gateway, sources, ResearchConfig::default())
            .with_event_logger(events.clone());

        let report = completed(research.execute(ResearchRequest::new(QUERY)).await);

        assert_eq!(report.metadata.total_sources, 3);
        let b = report
            .sources
            .iter()
            .find(|s| s.url == "https://b.com/vc")
            .unwrap();
        assert!(!b.scraped);
        assert_eq!(b.extracted_content, "snippet for https://b.com/vc");

        let partial = events.of_type(ResearchEvent::PARTIAL_FAILURE);
        assert_eq!(partial.len(), 2);
        assert_eq!(events.of_type(ResearchEvent::RESEARCH_COMPLETED).len(), 1);
    }

    #[tokio::test]
    async fn test_max_sources_caps_and_stops_search() {
        let gateway = Arc::new(pipeline_gateway(PLAN, Ok("report")));
        let sources = Arc::new(standard_sources());
        let config = ResearchConfig::default().with_search_batch_size(1);
        let research = use_case(gateway, sources.clone(), config);

        let report = completed(
            research
                .execute(ResearchRequest::new(QUERY).with_max_sources(2))
                .await,
        );

        assert_eq!(report.sources.len(), 2);
        assert_eq!(sources.searched(), vec![QUERY.to_string()]);
        assert_eq!(report.metadata.queries_executed, 1);
    }

    #[tokio::test]
    async fn test_configured_max_sources_applies_without_request_cap() {
        let gateway = Arc::new(pipeline_gateway(PLAN, Ok("report")));
        let sources = Arc::new(standard_sources());
        let config = ResearchConfig::default()
            .with_max_sources(2)
            .with_search_batch_size(1);
        let research = use_case(gateway, sources.clone(), config);

        let report = completed(research.execute(ResearchRequest::new(QUERY)).await);

        assert_eq!(report.metadata.total_sources, 2);
        assert_eq!(sources.searched(), vec![QUERY.to_string()]);
    }

    #[tokio::test]
    async fn test_request_max_sources_overrides_config() {
        let gateway = Arc::new(pipeline_gateway(PLAN, Ok("report")));
        let config = ResearchConfig::default().with_max_sources(2);
        let research = use_case(gateway, Arc::new(standard_sources()), config);

        let report = completed(
            research
                .execute(ResearchRequest::new(QUERY).with_max_sources(3))
                .await,
        );

        assert_eq!(report.metadata.total_sources, 3);
    }

    #[tokio::test]
    async fn test_planning_exhaustion_researches_query_only() {
        let gateway = Arc::new(MockGateway::with_responder(|_, req| {
            if is_phase(req, "research planner") {
                Err(http_500())
            } else if is_phase(req, "fact checker") {
                Ok(reply(FACTS))
            } else {
                Ok(reply("report"))
            }
        }));
        let sources = Arc::new(standard_sources());
        let events = Arc::new(RecordingEvents::default());
        let research = use_case(gateway, sources.clone(), ResearchConfig::default())
            .with_event_logger(events.clone());

        let response = research.execute(ResearchRequest::new(QUERY)).await;

        assert!(response.is_success());
        let report = completed(response);
        assert_eq!(report.report, "report");
        assert_eq!(sources.searched(), vec![QUERY.to_string()]);
        assert_eq!(report.metadata.queries_executed, 1);

        let partial = events.of_type(ResearchEvent::PARTIAL_FAILURE);
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0]["phase"], "planning");
        assert_eq!(partial[0]["target"], QUERY);

        let done = events.of_type(ResearchEvent::RESEARCH_COMPLETED);
        assert_eq!(done.len(), 1);
        let recorded = done[0]["partial_failures"].as_array().unwrap();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].as_str().unwrap().starts_with("planning: "));
    }

    #[tokio::test]
    async fn test_scrape_limited_to_top_n() {
        let gateway = Arc::new(pipeline_gateway(PLAN, Ok("report")));
        let sources = Arc::new(standard_sources());
        let research = use_case(
            gateway,
            sources.clone(),
            ResearchConfig::default().with_scrape_top_n(2),
        );

        completed(research.execute(ResearchRequest::new(QUERY)).await);
        assert_eq!(sources.scraped.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_run_fails() {
        let gateway = Arc::new(pipeline_gateway(PLAN, Ok("report")));
        let research = use_case(gateway.clone(), Arc::new(standard_sources()), ResearchConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let response = research
            .execute_with_cancellation(ResearchRequest::new(QUERY), &NoProgress, &cancel)
            .await;

        assert_eq!(response, ResearchResponse::failed("research cancelled"));
        assert!(gateway.calls().is_empty());
    }
}
