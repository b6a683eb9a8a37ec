use std::collections::HashSet;

use chrono::NaiveDate;

use crate::catalog::Catalog;
use crate::engine::classify::ClassificationRule;
use crate::engine::derive::DerivedField;
use crate::error::ConfigError;
use crate::models::Frequency;

/// One series in a panel: a role name the engine joins and derives by,
/// bound to a catalog slug, with optional frequency override and a unit
/// scale applied to joined values (e.g. 0.001 to show thousands as millions).
#[derive(Debug, Clone)]
pub struct SeriesRole {
    pub name: String,
    pub series: String,
    pub frequency: Option<Frequency>,
    pub scale: f64,
}

impl SeriesRole {
    pub fn new(name: impl Into<String>, series: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            series: series.into(),
            frequency: None,
            scale: 1.0,
        }
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Declarative configuration for one chart panel: which series play which
/// role, how they join, what gets derived, and how records are classified.
/// This object replaces per-chart copy-pasted control flow; build it once,
/// hand it to the pipeline.
#[derive(Debug)]
pub struct PanelSpec {
    pub name: String,
    pub base_role: String,
    pub roles: Vec<SeriesRole>,
    /// Join window in days; 0 means exact date match only.
    pub tolerance_days: i64,
    pub derived: Vec<DerivedField>,
    pub rules: Vec<ClassificationRule>,
    /// Drop records missing any configured derived field.
    pub require_derived: bool,
    /// Keep every k-th record, purely to bound renderer density. 1 = all.
    pub decimate: usize,
    /// Overrides the fetcher's default observation start.
    pub start: Option<NaiveDate>,
}

impl PanelSpec {
    pub fn new(name: impl Into<String>, base_role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_role: base_role.into(),
            roles: Vec::new(),
            tolerance_days: 0,
            derived: Vec::new(),
            rules: Vec::new(),
            require_derived: false,
            decimate: 1,
            start: None,
        }
    }

    pub fn role(mut self, role: SeriesRole) -> Self {
        self.roles.push(role);
        self
    }

    pub fn tolerance_days(mut self, days: i64) -> Self {
        self.tolerance_days = days;
        self
    }

    pub fn derive(mut self, field: DerivedField) -> Self {
        self.derived.push(field);
        self
    }

    pub fn rule(mut self, rule: ClassificationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn require_derived(mut self) -> Self {
        self.require_derived = true;
        self
    }

    pub fn decimate(mut self, every: usize) -> Self {
        self.decimate = every;
        self
    }

    pub fn start(mut self, date: NaiveDate) -> Self {
        self.start = Some(date);
        self
    }

    /// Configuration-time validation. A panel that passes never produces a
    /// configuration failure during record processing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names: HashSet<&str> = HashSet::new();
        for role in &self.roles {
            if !names.insert(role.name.as_str()) {
                return Err(ConfigError::DuplicateRole(role.name.clone()));
            }
            if !Catalog::contains(&role.series) {
                return Err(ConfigError::UnknownSeries {
                    role: role.name.clone(),
                    slug: role.series.clone(),
                });
            }
        }

        if !names.contains(self.base_role.as_str()) {
            return Err(ConfigError::MissingBaseRole(self.base_role.clone()));
        }

        for field in &self.derived {
            for role in field.referenced_roles() {
                if !names.contains(role) {
                    return Err(ConfigError::UnknownRole {
                        field: field.name().to_string(),
                        role: role.to_string(),
                    });
                }
            }
            let zero = match field {
                DerivedField::Growth { lookback, .. } => *lookback == 0,
                DerivedField::MovingAverage { window, .. } => *window == 0,
                DerivedField::Ratio { .. } => false,
            };
            if zero {
                return Err(ConfigError::ZeroWindow {
                    field: field.name().to_string(),
                });
            }
        }

        if self.tolerance_days < 0 {
            return Err(ConfigError::NegativeTolerance(self.tolerance_days));
        }

        if self.decimate == 0 {
            return Err(ConfigError::BadDecimation);
        }

        Ok(())
    }
}
