//! Cortex Engine: the inference orchestrator
//!
//! [`engine::InferenceEngine`] owns a [`cortex_model::GraphAdapter`], a
//! [`cortex_resolver::DependencyResolver`], and a
//! [`strategy::InferenceStrategy`]; [`request::InferenceRequest`] implements
//! the round scanner; [`tracer::Tracer`] is the optional timing/value-
//! transition recorder.

pub mod engine;
pub mod error;
pub mod request;
pub mod strategy;
pub mod tracer;

pub use engine::{EngineOptions, InferenceEngine};
pub use error::{EngineError, Result};
pub use request::InferenceRequest;
pub use strategy::InferenceStrategy;
pub use tracer::{ExecutionTrace, RequestTrace, RoundTrace, Tracer};
