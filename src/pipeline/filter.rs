// src/pipeline/filter.rs
use serde_json::{Map, Value};
use tracing::info;

use crate::config::RunOptions;
use crate::feature::{Feature, Properties};

/// Оставляет объекты, у которых хотя бы один тег входит в список.
///
/// Объект без тегов удаляется; пустой список удаляет всё.
#[must_use]
pub fn filter_by_tags(features: Vec<Feature>, allowed: &[String]) -> Vec<Feature> {
    features
        .into_iter()
        .filter(|f| f.properties.has_any_tag(allowed))
        .collect()
}

/// Заменяет свойства каждого объекта одним и тем же набором, ключ в ключ
#[must_use]
pub fn override_properties(features: Vec<Feature>, bundle: &Map<String, Value>) -> Vec<Feature> {
    features
        .into_iter()
        .map(|mut f| {
            f.properties = Properties::verbatim(bundle.clone());
            f
        })
        .collect()
}

/// Фильтр по тегам, затем подмена свойств — каждое только если задано
#[must_use]
pub fn apply_run_options(features: Vec<Feature>, options: &RunOptions) -> Vec<Feature> {
    let mut features = features;

    if let Some(tags) = &options.tags {
        let before = features.len();
        features = filter_by_tags(features, tags);
        info!(kept = features.len(), removed = before - features.len(), "Фильтр по тегам");
    }

    if let Some(bundle) = &options.re_property {
        features = override_properties(features, bundle);
        info!(features = features.len(), "Свойства заменены");
    }

    features
}
