use std::collections::HashMap;
use std::sync::Arc;

use futures::future;
use tracing::debug;

use crate::engine::{align, classify, derive};
use crate::error::PipelineError;
use crate::fetcher::SeriesSource;
use crate::models::{AlignedRecord, Observation, SeriesRequest};
use crate::panel::PanelSpec;

/// Orchestrates one fetch-align-derive-classify run for a panel.
///
/// The source is constructor-injected; there is no shared client singleton.
/// Runs hold no cross-call state, so concurrent runs for different panels
/// need no coordination.
pub struct Pipeline {
    source: Arc<dyn SeriesSource>,
}

impl Pipeline {
    pub fn new(source: Arc<dyn SeriesSource>) -> Self {
        Self { source }
    }

    /// Validates the panel, fetches every role concurrently (fail-fast: any
    /// fetch error aborts the run, no partial results), then applies the
    /// pure transforms.
    pub async fn run(&self, panel: &PanelSpec) -> Result<Vec<AlignedRecord>, PipelineError> {
        panel.validate()?;

        let fetches = panel.roles.iter().map(|role| {
            let request = SeriesRequest {
                series: role.series.clone(),
                frequency: role.frequency,
                start: panel.start,
                end: None,
            };
            async move {
                let observations =
                    self.source.fetch(&request).await.map_err(|err| PipelineError::Fetch {
                        role: role.name.clone(),
                        source: err,
                    })?;
                Ok::<_, PipelineError>((role.name.clone(), observations))
            }
        });

        let fetched = future::try_join_all(fetches).await?;

        let raw: HashMap<String, Vec<Observation>> = fetched
            .into_iter()
            .map(|(name, mut observations)| {
                // The join and the moving-average window both binary-search
                // by date.
                observations.sort_by_key(|o| o.date);
                (name, observations)
            })
            .collect();

        let mut records = align::align(panel, &raw);
        debug!(panel = %panel.name, joined = records.len(), "aligned series");

        derive::apply(&mut records, &panel.derived, &raw);

        if panel.require_derived {
            let before = records.len();
            records.retain(|record| {
                panel.derived.iter().all(|field| record.derived.contains_key(field.name()))
            });
            debug!(panel = %panel.name, dropped = before - records.len(), "filtered records missing derived fields");
        }

        classify::apply(&mut records, &panel.rules);

        if panel.decimate > 1 {
            records = records.into_iter().step_by(panel.decimate).collect();
        }

        Ok(records)
    }
}
