//! Request → sources → six-agent workflow → report.

pub mod collector;
pub mod generator;
pub mod report;
pub mod request;

pub use collector::{Collector, SourceMaterial};
pub use generator::{ArticleWorkflow, Progress, Step, StepRecord};
pub use report::{Check, Expectations, GenerationReport};
pub use request::{ArticleRequest, CompetitorArticle, DensityRange};
