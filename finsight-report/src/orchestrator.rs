//! The report orchestrator: run requested evidence steps, merge outcomes.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use finsight_rag::record::MetadataFilter;
use finsight_rag::retrieval::{Retrieved, RetrievalAgent};

use crate::error::ReportError;
use crate::financial::{FinancialStore, Row};
use crate::outcome::{Report, StepOutcome};
use crate::web::{DEFAULT_NUM_RESULTS, WebSearch};

/// Default retrieval width requested when the caller does not set one.
pub const DEFAULT_TOP_K: usize = 500;

/// The fixed set of report steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Retrieval-augmented answering over indexed documents.
    Retrieval,
    /// Structured quarterly-metrics query.
    Financial,
    /// Live web search.
    Web,
}

impl Step {
    /// Parse a requested agent name. `rag` is the historical alias the
    /// API accepts for the retrieval step.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "rag" | "retrieval" => Some(Self::Retrieval),
            "financial" => Some(Self::Financial),
            "web" => Some(Self::Web),
            _ => None,
        }
    }
}

/// A report request: the question plus step gating and bounds.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// The research question.
    pub question: String,
    /// Fiscal year gating the financial step.
    pub year: Option<i32>,
    /// Fiscal quarter gating the financial step.
    pub quarter: Option<u8>,
    /// Requested retrieval width; clamped downstream against the live
    /// index size and the hard cap.
    pub top_k: usize,
    /// Names of the agents to run. Unknown names degrade to warnings.
    pub agents: Vec<String>,
    /// Optional metadata filter restricting retrieval to matching
    /// records. Independent of `year`/`quarter`, which gate the
    /// financial step.
    pub filter: Option<MetadataFilter>,
}

impl ReportRequest {
    /// A request for all three steps with the default retrieval width.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            year: None,
            quarter: None,
            top_k: DEFAULT_TOP_K,
            agents: vec!["rag".into(), "financial".into(), "web".into()],
            filter: None,
        }
    }

    /// Set the fiscal period.
    pub fn with_period(mut self, year: i32, quarter: u8) -> Self {
        self.year = Some(year);
        self.quarter = Some(quarter);
        self
    }

    /// Restrict which agents run.
    pub fn with_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agents = agents.into_iter().map(Into::into).collect();
        self
    }

    /// Override the requested retrieval width.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Restrict retrieval to records matching `filter`.
    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Coordinates the report steps.
///
/// Pure coordination: each requested step runs independently (they share
/// no mutable state, so they run concurrently), a step's failure is
/// captured as its own outcome, and the merge is a keyed record that
/// cannot depend on completion order. The orchestrator owns no retry
/// policy: the index client retries ingestion internally, and financial
/// and web calls are single-attempt by design.
pub struct ReportOrchestrator {
    retrieval: RetrievalAgent,
    financial: Arc<dyn FinancialStore>,
    web: Arc<dyn WebSearch>,
    num_web_results: usize,
}

impl ReportOrchestrator {
    /// Create a new [`ReportOrchestratorBuilder`].
    pub fn builder() -> ReportOrchestratorBuilder {
        ReportOrchestratorBuilder::default()
    }

    /// Generate a report for `request`.
    ///
    /// Always returns a report: degraded steps appear as failed or empty
    /// outcomes, skipped or unrequested steps are absent.
    pub async fn run(&self, request: &ReportRequest) -> Report {
        let mut report = Report::default();
        let mut steps = HashSet::new();
        for name in &request.agents {
            match Step::parse(name) {
                Some(step) => {
                    steps.insert(step);
                }
                None => {
                    warn!(agent = %name, "unrecognized agent requested");
                    report.warnings.push(format!("unrecognized agent '{name}'"));
                }
            }
        }

        let retrieval = async {
            if steps.contains(&Step::Retrieval) {
                Some(self.run_retrieval(request).await)
            } else {
                None
            }
        };
        let financial = async {
            if steps.contains(&Step::Financial) { self.run_financial(request).await } else { None }
        };
        let web = async {
            if steps.contains(&Step::Web) { Some(self.run_web(request).await) } else { None }
        };

        let (historical, financial_outcome, web_outcome) = tokio::join!(retrieval, financial, web);

        report.historical = historical;
        if let Some((summary, chart)) = financial_outcome {
            report.financial_summary = Some(summary);
            report.financial_chart = chart;
        }
        report.web = web_outcome;

        info!(
            historical = report.historical.is_some(),
            financial = report.financial_summary.is_some(),
            web = report.web.is_some(),
            warnings = report.warnings.len(),
            "report assembled"
        );
        report
    }

    async fn run_retrieval(
        &self,
        request: &ReportRequest,
    ) -> StepOutcome<finsight_model::SynthesisResult> {
        match self
            .retrieval
            .retrieve_and_answer(&request.question, request.top_k, request.filter.as_ref())
            .await
        {
            Ok(Retrieved::Answer(result)) => StepOutcome::Success(result),
            Ok(Retrieved::NoContent) => {
                StepOutcome::Empty { reason: Retrieved::NO_CONTENT_ANSWER.to_string() }
            }
            Err(err) => {
                error!(error = %err, "retrieval step failed");
                StepOutcome::Failed { error: err.to_string() }
            }
        }
    }

    /// Runs the financial step, or skips it (`None`) when the period is
    /// incomplete. A skip, unlike a failure, leaves no trace in the
    /// report.
    async fn run_financial(
        &self,
        request: &ReportRequest,
    ) -> Option<(StepOutcome<Vec<Row>>, Option<Vec<u8>>)> {
        let (Some(year), Some(quarter)) = (request.year, request.quarter) else {
            debug!("financial step skipped: year and quarter not both set");
            return None;
        };

        match self.financial.quarterly(year, quarter).await {
            Ok(snapshot) => Some((StepOutcome::Success(snapshot.rows), snapshot.chart_png)),
            Err(err) => {
                error!(error = %err, year, quarter, "financial step failed");
                Some((StepOutcome::Failed { error: err.to_string() }, None))
            }
        }
    }

    async fn run_web(&self, request: &ReportRequest) -> StepOutcome<Vec<serde_json::Value>> {
        match self.web.search(&request.question, self.num_web_results).await {
            Ok(results) => StepOutcome::Success(results),
            Err(err) => {
                error!(error = %err, "web step failed");
                StepOutcome::Failed { error: err.to_string() }
            }
        }
    }
}

/// Builder for constructing a [`ReportOrchestrator`].
///
/// All collaborators are required; they are injected once at startup and
/// shared by every request.
#[derive(Default)]
pub struct ReportOrchestratorBuilder {
    retrieval: Option<RetrievalAgent>,
    financial: Option<Arc<dyn FinancialStore>>,
    web: Option<Arc<dyn WebSearch>>,
    num_web_results: Option<usize>,
}

impl ReportOrchestratorBuilder {
    /// Set the retrieval agent.
    pub fn retrieval(mut self, agent: RetrievalAgent) -> Self {
        self.retrieval = Some(agent);
        self
    }

    /// Set the financial store collaborator.
    pub fn financial(mut self, store: Arc<dyn FinancialStore>) -> Self {
        self.financial = Some(store);
        self
    }

    /// Set the web search collaborator.
    pub fn web(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.web = Some(search);
        self
    }

    /// Override how many web results each search requests.
    pub fn num_web_results(mut self, num: usize) -> Self {
        self.num_web_results = Some(num);
        self
    }

    /// Build the orchestrator, validating that every collaborator is set.
    pub fn build(self) -> Result<ReportOrchestrator, ReportError> {
        let retrieval = self
            .retrieval
            .ok_or_else(|| ReportError::ConfigError("retrieval agent is required".into()))?;
        let financial = self
            .financial
            .ok_or_else(|| ReportError::ConfigError("financial store is required".into()))?;
        let web =
            self.web.ok_or_else(|| ReportError::ConfigError("web search is required".into()))?;

        Ok(ReportOrchestrator {
            retrieval,
            financial,
            web,
            num_web_results: self.num_web_results.unwrap_or(DEFAULT_NUM_RESULTS),
        })
    }
}
