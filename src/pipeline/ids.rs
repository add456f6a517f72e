// src/pipeline/ids.rs
use crate::feature::{Feature, FeatureId};

/// Нумерует объекты 0, 1, 2, … в порядке списка
#[must_use]
pub fn assign_ids(features: Vec<Feature>) -> Vec<Feature> {
    features
        .into_iter()
        .zip(0u64..)
        .map(|(mut feature, id)| {
            feature.id = Some(FeatureId::from(id));
            feature
        })
        .collect()
}
