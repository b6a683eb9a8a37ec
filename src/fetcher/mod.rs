use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::models::{Observation, SeriesRequest};

pub mod fred;

/// A backend that can resolve a series request into observations.
///
/// The pipeline only talks to this trait, so tests can substitute a counting
/// mock and alternative statistics sources can be plugged in without touching
/// the engine.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, request: &SeriesRequest) -> Result<Vec<Observation>, UpstreamError>;
}
