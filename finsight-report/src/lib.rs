//! # finsight-report
//!
//! Report orchestration: fan a research question out to independent
//! evidence steps (index retrieval, a structured financial-metrics
//! query, and a live web search) and merge whatever comes back into one
//! [`Report`].
//!
//! Steps are independently requestable and independently
//! failure-tolerant: one step failing is recorded as a failed outcome
//! for that step alone and never stops the others. The caller always
//! gets a report back.
//!
//! ```rust,ignore
//! use finsight_report::{ReportOrchestrator, ReportRequest};
//!
//! let orchestrator = ReportOrchestrator::builder()
//!     .retrieval(agent)
//!     .financial(store)
//!     .web(search)
//!     .build()?;
//!
//! let report = orchestrator
//!     .run(&ReportRequest::new("How did the data-center segment perform?")
//!         .with_period(2024, 1))
//!     .await;
//! ```

pub mod error;
pub mod financial;
pub mod orchestrator;
pub mod outcome;
pub mod web;

pub use error::ReportError;
pub use financial::{FinancialStore, QuarterlySnapshot, RestFinancialStore, Row};
pub use orchestrator::{ReportOrchestrator, ReportOrchestratorBuilder, ReportRequest, Step};
pub use outcome::{Report, StepOutcome};
pub use web::{TavilyClient, WebSearch};
