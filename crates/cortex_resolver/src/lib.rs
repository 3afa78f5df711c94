//! Cortex Resolver: dependency-wiring policy
//!
//! A [`resolver::DependencyResolver`] takes a [`cortex_model::GraphAdapter`]
//! and an id, and wires the relevant signals together via
//! `add_dependency`. This crate ships the default
//! [`belief_propagation::BeliefPropagationResolver`] (sum-product message
//! passing) and [`structured::StructuredResolver`] (clustered/structured
//! variational wiring), plus the [`cluster::ClusterReadiness`] helper.

pub mod belief_propagation;
pub mod cluster;
pub mod error;
pub mod resolver;
pub mod structured;

pub use belief_propagation::BeliefPropagationResolver;
pub use cluster::ClusterReadiness;
pub use error::{ResolverError, Result};
pub use resolver::DependencyResolver;
pub use structured::StructuredResolver;
