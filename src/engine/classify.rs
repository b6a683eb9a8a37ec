use std::fmt;

use crate::models::AlignedRecord;

/// A named threshold test attached to a panel. Predicates are pure functions
/// of the record's already-computed fields, so flag assignment is
/// deterministic and replayable.
pub struct ClassificationRule {
    tag: String,
    predicate: Box<dyn Fn(&AlignedRecord) -> bool + Send + Sync>,
}

impl ClassificationRule {
    pub fn new(
        tag: impl Into<String>,
        predicate: impl Fn(&AlignedRecord) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            tag: tag.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Tags records whose `key` (series value or derived field) exceeds
    /// `threshold`.
    pub fn value_above(tag: impl Into<String>, key: impl Into<String>, threshold: f64) -> Self {
        let key = key.into();
        Self::new(tag, move |record| {
            record.field(&key).map_or(false, |v| v > threshold)
        })
    }

    /// Tags records whose `key` falls below `threshold`.
    pub fn value_below(tag: impl Into<String>, key: impl Into<String>, threshold: f64) -> Self {
        let key = key.into();
        Self::new(tag, move |record| {
            record.field(&key).map_or(false, |v| v < threshold)
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn applies(&self, record: &AlignedRecord) -> bool {
        (self.predicate)(record)
    }
}

impl fmt::Debug for ClassificationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationRule").field("tag", &self.tag).finish()
    }
}

/// Applies the rules in declaration order. Rules are independent, not
/// mutually exclusive: a record can pick up zero, one, or many flags.
pub fn apply(records: &mut [AlignedRecord], rules: &[ClassificationRule]) {
    for record in records.iter_mut() {
        for rule in rules {
            if rule.applies(record) {
                record.flags.push(rule.tag().to_string());
            }
        }
    }
}
