//! # Research Report Example
//!
//! Runs the full report pipeline end to end: ingest a small filing into
//! an in-memory index, then fan a question out to the retrieval,
//! financial, and web steps and print the merged report.
//!
//! Uses `InMemoryIndex`, a deterministic embedder, a scripted
//! synthesizer, and canned collaborators so it runs with **zero API
//! keys**.
//!
//! Run: `cargo run --example research_report -p finsight-report`

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use finsight_model::MockSynthesizer;
use finsight_rag::{ChunkIngestor, Embedder, IndexClient, InMemoryIndex, Metadata, RetrievalAgent};
use finsight_report::{
    FinancialStore, QuarterlySnapshot, ReportError, ReportOrchestrator, ReportRequest, Row,
    WebSearch,
};

// ---------------------------------------------------------------------------
// Deterministic collaborators: no network, no credentials
// ---------------------------------------------------------------------------

struct DemoEmbedder {
    dimensions: usize,
}

#[async_trait]
impl Embedder for DemoEmbedder {
    async fn embed(&self, text: &str) -> finsight_rag::Result<Vec<f32>> {
        // Deterministic embedding: hash the text bytes, then generate a
        // normalised vector whose direction depends on the content.
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

struct DemoFinancials;

#[async_trait]
impl FinancialStore for DemoFinancials {
    async fn quarterly(&self, year: i32, quarter: u8) -> Result<QuarterlySnapshot, ReportError> {
        let mut row = Row::new();
        row.insert("asofdate".into(), json!(format!("{year}-Q{quarter}")));
        row.insert("marketcap".into(), json!(2_300_000_000_000u64));
        row.insert("peratio".into(), json!(64.2));
        Ok(QuarterlySnapshot { rows: vec![row], chart_png: None })
    }
}

struct DemoWeb;

#[async_trait]
impl WebSearch for DemoWeb {
    async fn search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<serde_json::Value>, ReportError> {
        Ok((0..num_results.min(2))
            .map(|i| json!({"title": format!("headline {i}"), "query": query}))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info,finsight_rag=debug").init();

    // -- 1. Ingest a small filing into the in-memory index ----------------
    let index = Arc::new(InMemoryIndex::new());
    let embedder = Arc::new(DemoEmbedder { dimensions: 64 });

    let ingestor = ChunkIngestor::new(embedder.clone(), IndexClient::new(index.clone()));
    let filing = "Data-center revenue reached a record on accelerating demand.\n\n\
                  Gross margin expanded two hundred basis points sequentially.\n\n\
                  Operating expenses grew slower than revenue for the third quarter running.";
    let summary = ingestor.ingest_document("fy24-q1-filing", filing, &Metadata::new()).await;
    println!(
        "ingested {} of {} chunks ({} failed batches)",
        summary.upserted,
        summary.attempted,
        summary.failed_batches.len()
    );

    // -- 2. Wire the orchestrator ------------------------------------------
    let retrieval = RetrievalAgent::new(
        IndexClient::new(index),
        embedder,
        Arc::new(MockSynthesizer::new(
            "Margins and data-center revenue both improved this quarter.",
        )),
    );

    let orchestrator = ReportOrchestrator::builder()
        .retrieval(retrieval)
        .financial(Arc::new(DemoFinancials))
        .web(Arc::new(DemoWeb))
        .build()?;

    // -- 3. Run a report request -------------------------------------------
    let request = ReportRequest::new("How did margins develop?").with_period(2024, 1);
    let report = orchestrator.run(&request).await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
