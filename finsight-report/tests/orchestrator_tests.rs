//! Orchestrator behavior: step gating, partial-failure isolation, and
//! order-independent merging.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use finsight_model::MockSynthesizer;
use finsight_rag::client::IndexClient;
use finsight_rag::embedder::Embedder;
use finsight_rag::ingest::ChunkIngestor;
use finsight_rag::inmemory::InMemoryIndex;
use finsight_rag::record::Metadata;
use finsight_rag::retrieval::RetrievalAgent;
use finsight_report::error::ReportError;
use finsight_report::financial::{FinancialStore, QuarterlySnapshot, Row};
use finsight_report::orchestrator::{ReportOrchestrator, ReportRequest};
use finsight_report::outcome::StepOutcome;
use finsight_report::web::WebSearch;

struct HashEmbedder;

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> finsight_rag::error::Result<Vec<f32>> {
        let mut v = vec![0.0f32; 8];
        for (i, b) in text.bytes().enumerate() {
            v[i % 8] += b as f32 / 255.0;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        8
    }
}

/// Financial store returning one canned row (and optionally a chart).
struct CannedFinancials {
    chart: Option<Vec<u8>>,
}

#[async_trait]
impl FinancialStore for CannedFinancials {
    async fn quarterly(&self, year: i32, quarter: u8) -> Result<QuarterlySnapshot, ReportError> {
        let mut row = Row::new();
        row.insert("year".into(), json!(year));
        row.insert("quarter".into(), json!(quarter));
        row.insert("marketcap".into(), json!(2_300_000_000_000u64));
        Ok(QuarterlySnapshot { rows: vec![row], chart_png: self.chart.clone() })
    }
}

/// Financial store that always errors.
struct BrokenFinancials;

#[async_trait]
impl FinancialStore for BrokenFinancials {
    async fn quarterly(&self, _: i32, _: u8) -> Result<QuarterlySnapshot, ReportError> {
        Err(ReportError::FinancialError("warehouse unreachable".into()))
    }
}

/// Web search returning canned records.
struct CannedWeb;

#[async_trait]
impl WebSearch for CannedWeb {
    async fn search(
        &self,
        query: &str,
        _: usize,
    ) -> Result<Vec<serde_json::Value>, ReportError> {
        Ok(vec![json!({"title": "result", "query": query})])
    }
}

/// Web search that always errors, as with missing credentials.
struct BrokenWeb;

#[async_trait]
impl WebSearch for BrokenWeb {
    async fn search(&self, _: &str, _: usize) -> Result<Vec<serde_json::Value>, ReportError> {
        Err(ReportError::ConfigError("TAVILY_API_KEY is not set".into()))
    }
}

/// Build an orchestrator over `chunk_count` indexed passages.
async fn orchestrator(
    chunk_count: usize,
    financial: Arc<dyn FinancialStore>,
    web: Arc<dyn WebSearch>,
) -> ReportOrchestrator {
    let index = Arc::new(InMemoryIndex::new());
    let embedder = Arc::new(HashEmbedder);

    let ingestor = ChunkIngestor::new(embedder.clone(), IndexClient::new(index.clone()));
    let chunks: Vec<String> =
        (0..chunk_count).map(|i| format!("indexed filing passage {i}")).collect();
    ingestor.ingest("filing", &chunks, &Metadata::new()).await;

    let retrieval = RetrievalAgent::new(
        IndexClient::new(index),
        embedder,
        Arc::new(MockSynthesizer::new("synthesized answer")),
    );

    ReportOrchestrator::builder()
        .retrieval(retrieval)
        .financial(financial)
        .web(web)
        .build()
        .unwrap()
}

#[tokio::test]
async fn all_steps_succeed_and_merge_into_one_report() {
    let orch = orchestrator(
        6,
        Arc::new(CannedFinancials { chart: Some(vec![1, 2, 3]) }),
        Arc::new(CannedWeb),
    )
    .await;

    let report = orch.run(&ReportRequest::new("How did the quarter go?").with_period(2024, 2)).await;

    let answer = report.historical.as_ref().unwrap().success().unwrap();
    assert_eq!(answer.answer, "synthesized answer");

    let rows = report.financial_summary.as_ref().unwrap().success().unwrap();
    assert_eq!(rows[0].get("quarter"), Some(&json!(2)));
    assert_eq!(report.financial_chart, Some(vec![1, 2, 3]));

    let web = report.web.as_ref().unwrap().success().unwrap();
    assert_eq!(web.len(), 1);
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn financial_without_full_period_is_skipped_not_failed() {
    let orch =
        orchestrator(3, Arc::new(CannedFinancials { chart: None }), Arc::new(CannedWeb)).await;

    let request = ReportRequest::new("metrics?").with_agents(["financial"]);
    let report = orch.run(&request).await;

    assert!(report.financial_summary.is_none());
    assert!(report.financial_chart.is_none());
    assert!(report.historical.is_none(), "retrieval was not requested");
    assert!(report.web.is_none(), "web was not requested");
    assert!(report.warnings.is_empty());
}

#[tokio::test]
async fn web_failure_leaves_other_steps_intact() {
    let orch =
        orchestrator(4, Arc::new(CannedFinancials { chart: None }), Arc::new(BrokenWeb)).await;

    let report = orch.run(&ReportRequest::new("question").with_period(2024, 1)).await;

    assert!(report.historical.as_ref().unwrap().is_success());
    assert!(report.financial_summary.as_ref().unwrap().is_success());

    match report.web.as_ref().unwrap() {
        StepOutcome::Failed { error } => assert!(error.contains("TAVILY_API_KEY")),
        other => panic!("expected failed web outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn financial_failure_is_recorded_without_touching_others() {
    let orch = orchestrator(4, Arc::new(BrokenFinancials), Arc::new(CannedWeb)).await;

    let report = orch.run(&ReportRequest::new("question").with_period(2023, 4)).await;

    assert!(report.historical.as_ref().unwrap().is_success());
    assert!(report.web.as_ref().unwrap().is_success());
    match report.financial_summary.as_ref().unwrap() {
        StepOutcome::Failed { error } => assert!(error.contains("warehouse unreachable")),
        other => panic!("expected failed financial outcome, got {other:?}"),
    }
    assert!(report.financial_chart.is_none());
}

#[tokio::test]
async fn empty_index_yields_empty_historical_outcome() {
    let orch =
        orchestrator(0, Arc::new(CannedFinancials { chart: None }), Arc::new(CannedWeb)).await;

    let report = orch.run(&ReportRequest::new("anything?").with_agents(["rag"])).await;

    match report.historical.as_ref().unwrap() {
        StepOutcome::Empty { reason } => assert!(reason.contains("No relevant content")),
        other => panic!("expected empty historical outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn unrecognized_agent_degrades_to_a_warning() {
    let orch =
        orchestrator(2, Arc::new(CannedFinancials { chart: None }), Arc::new(CannedWeb)).await;

    let request = ReportRequest::new("question").with_agents(["rag", "charts"]);
    let report = orch.run(&request).await;

    assert!(report.historical.is_some());
    assert_eq!(report.warnings, vec!["unrecognized agent 'charts'".to_string()]);
    assert!(report.financial_summary.is_none());
    assert!(report.web.is_none());
}

#[tokio::test]
async fn empty_row_set_is_still_a_successful_outcome() {
    struct EmptyFinancials;

    #[async_trait]
    impl FinancialStore for EmptyFinancials {
        async fn quarterly(&self, _: i32, _: u8) -> Result<QuarterlySnapshot, ReportError> {
            Ok(QuarterlySnapshot::default())
        }
    }

    let orch = orchestrator(0, Arc::new(EmptyFinancials), Arc::new(CannedWeb)).await;
    let request =
        ReportRequest::new("metrics?").with_agents(["financial"]).with_period(2022, 3);
    let report = orch.run(&request).await;

    let rows = report.financial_summary.as_ref().unwrap().success().unwrap();
    assert!(rows.is_empty());
}
