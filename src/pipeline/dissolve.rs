// src/pipeline/dissolve.rs
//! Слияние по ключу с восстановлением стиля
//!
//! Объединение в движке теряет все свойства, кроме ключа. Поэтому перед ним
//! запоминается первый встреченный набор свойств на каждое значение ключа,
//! а после — стиль возвращается на место.

use std::collections::HashMap;

use crate::engine::{DissolveKey, GeometryEngine};
use crate::error::BuildError;
use crate::feature::{Feature, Properties, partition_polygonal};

/// Первый встреченный набор свойств на каждое значение ключа
#[derive(Debug, Clone, Default)]
pub struct StyleSnapshot {
    styles: HashMap<Option<String>, Properties>,
}

impl StyleSnapshot {
    /// Запоминает свойства; повторы того же значения ключа игнорируются
    #[must_use]
    pub fn capture(features: &[Feature], key: DissolveKey<'_>) -> Self {
        let mut styles = HashMap::new();
        for feature in features {
            styles
                .entry(key_of(&feature.properties, key))
                .or_insert_with(|| feature.properties.clone());
        }
        Self { styles }
    }

    /// Возвращает стиль объектам, пришедшим из объединения
    #[must_use]
    pub fn reattach(
        &self,
        features: Vec<Feature>,
        key: DissolveKey<'_>,
        restore: fn(&Properties) -> Properties,
    ) -> Vec<Feature> {
        features
            .into_iter()
            .map(|mut feature| {
                if let Some(style) = self.styles.get(&key_of(&feature.properties, key)) {
                    feature.properties = restore(style);
                }
                feature
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

fn key_of(properties: &Properties, key: DissolveKey<'_>) -> Option<String> {
    match key {
        DissolveKey::All => None,
        DissolveKey::Property(k) => properties.key_value(k),
    }
}

/// `{name, fill, stroke, type, tags}` — набор, который получает страна после слияния
#[must_use]
pub fn country_style(style: &Properties) -> Properties {
    Properties {
        name: style.name.clone(),
        kind: style.kind.clone(),
        fill: style.fill.clone(),
        stroke: style.stroke.clone(),
        tags: style.tags.clone(),
        ..Properties::default()
    }
}

/// `{fill, stroke, type, tags, fill-opacity}` — набор природных слоёв и дорог
#[must_use]
pub fn component_style(style: &Properties) -> Properties {
    Properties {
        kind: style.kind.clone(),
        fill: style.fill.clone(),
        stroke: style.stroke.clone(),
        fill_opacity: style.fill_opacity,
        tags: style.tags.clone(),
        ..Properties::default()
    }
}

/// Снимок стиля → объединение → восстановление
pub fn dissolve_preserving_style<E: GeometryEngine + ?Sized>(
    engine: &E,
    features: Vec<Feature>,
    key: DissolveKey<'_>,
    restore: fn(&Properties) -> Properties,
) -> Result<Vec<Feature>, BuildError> {
    let snapshot = StyleSnapshot::capture(&features, key);
    let dissolved = engine.union_by_key(features, key)?;
    Ok(snapshot.reattach(dissolved, key, restore))
}

/// Сливает полигоны с одинаковым `name` в одну геометрию на страну.
///
/// Результат: слитые страны, затем прочие объекты в прежнем порядке.
pub fn dissolve_countries<E: GeometryEngine + ?Sized>(
    engine: &E,
    features: Vec<Feature>,
) -> Result<Vec<Feature>, BuildError> {
    let (polygons, others) = partition_polygonal(features);
    let mut dissolved =
        dissolve_preserving_style(engine, polygons, DissolveKey::Property("name"), country_style)?;
    dissolved.extend(others);
    Ok(dissolved)
}
