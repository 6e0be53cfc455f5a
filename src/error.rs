use crate::provider::Provider;
use thiserror::Error;

/// Errors the engine reports to its caller.
///
/// Only translator input can fail. Resolver and comparator misses are
/// ordinary `None`/`false` outcomes, and collaborator failures are caught
/// and counted at the batch-update boundary instead of propagating.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("provider {0} has no catalog query format")]
    UnsupportedProvider(Provider),
    #[error("empty filter value in dimension {dimension}")]
    EmptyFilterValue { dimension: &'static str },
}
