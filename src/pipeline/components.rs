// src/pipeline/components.rs
//! Компоненты карты: природные слои и дороги
//!
//! Природные объекты получают зашитый стиль своего слоя. Осевые линии дорог
//! раздуваются буфером на ширину из `roads/sizes.json` и становятся площадными.
//! Всё вместе сливается по `type` и ставится в начало списка перед странами.

use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ProjectPaths, read_document};
use crate::engine::{DissolveKey, GeometryEngine};
use crate::error::BuildError;
use crate::feature::io::read_collection;
use crate::feature::{Feature, FeatureKind, RoadClass, Terrain};
use crate::pipeline::dissolve::{component_style, dissolve_preserving_style};

/// Ширины дорог: подтип → радиус буфера
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoadWidths(pub HashMap<String, f64>);

impl RoadWidths {
    /// Радиус для подтипа; если подтипа нет (или ширина нулевая) — запасная запись класса
    pub fn radius_for(&self, sub_type: Option<&str>, class: RoadClass) -> Result<f64, BuildError> {
        let fallback = class.fallback_width();
        sub_type
            .and_then(|t| self.0.get(t))
            .copied()
            .filter(|w| *w != 0.0)
            .or_else(|| self.0.get(fallback).copied())
            .ok_or_else(|| BuildError::MissingRoadWidth {
                sub_type: sub_type.unwrap_or_default().to_owned(),
                fallback,
            })
    }
}

/// Исходники компонентов в порядке сборки
#[derive(Debug, Clone, Default)]
pub struct ComponentSources {
    pub terrain: Vec<(Terrain, Vec<Feature>)>,
    pub roads: Vec<(RoadClass, Vec<Feature>)>,
    pub widths: RoadWidths,
}

impl ComponentSources {
    /// Читает `nature/*.geojson`, `roads/*.geojson` и `roads/sizes.json`
    pub fn load(paths: &ProjectPaths) -> Result<Self, BuildError> {
        let terrain = Terrain::ALL
            .into_iter()
            .map(|t| Ok((t, read_collection(&paths.nature_source(t))?)))
            .collect::<Result<Vec<_>, BuildError>>()?;
        let roads = RoadClass::ALL
            .into_iter()
            .map(|r| Ok((r, read_collection(&paths.road_source(r))?)))
            .collect::<Result<Vec<_>, BuildError>>()?;
        let widths = read_document(&paths.road_sizes())?;

        Ok(Self {
            terrain,
            roads,
            widths,
        })
    }
}

/// Ставит слою природы его тип и стиль; прочие свойства (в том числе `tags`) остаются
#[must_use]
pub fn stamp_terrain(terrain: Terrain, features: Vec<Feature>) -> Vec<Feature> {
    features
        .into_iter()
        .map(|mut feature| {
            feature.properties.kind = Some(FeatureKind::Terrain(terrain));
            feature.properties.apply_style(terrain.style());
            feature
        })
        .collect()
}

/// Раздувает осевые линии в площадные объекты.
///
/// Ширина ищется по собственному `type` линии. Полученный полигон наследует
/// свойства линии, `type` заменяется на класс дороги.
pub fn buffer_roads<E: GeometryEngine + ?Sized>(
    engine: &E,
    class: RoadClass,
    centerlines: Vec<Feature>,
    widths: &RoadWidths,
) -> Result<Vec<Feature>, BuildError> {
    #[cfg(feature = "parallel")]
    let iter = centerlines.into_par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = centerlines.into_iter();

    iter.map(|line| {
        let sub_type = line.properties.kind.as_ref().map(ToString::to_string);
        let radius = widths.radius_for(sub_type.as_deref(), class)?;
        let geometry = engine.buffer(&line.geometry, radius)?;

        let mut properties = line.properties;
        properties.kind = Some(FeatureKind::Road(class));
        properties.apply_style(class.style());
        Ok(Feature::new(geometry, properties))
    })
    .collect()
}

/// Готовит все компоненты и сливает их по `type`
pub fn assemble_components<E: GeometryEngine + ?Sized>(
    engine: &E,
    sources: ComponentSources,
) -> Result<Vec<Feature>, BuildError> {
    let mut pool = Vec::new();

    for (terrain, features) in sources.terrain {
        let (areas, rest): (Vec<_>, Vec<_>) =
            features.into_iter().partition(Feature::is_polygonal);
        if !rest.is_empty() {
            warn!(
                layer = terrain.as_str(),
                skipped = rest.len(),
                "Неплощадные объекты в слое природы пропущены"
            );
        }
        pool.extend(stamp_terrain(terrain, areas));
    }

    for (class, centerlines) in sources.roads {
        let count = centerlines.len();
        pool.extend(buffer_roads(engine, class, centerlines, &sources.widths)?);
        debug!(class = class.as_str(), roads = count, "Дороги раздуты");
    }

    dissolve_preserving_style(engine, pool, DissolveKey::Property("type"), component_style)
}

/// Компоненты всегда идут раньше стран
#[must_use]
pub fn prepend_components(components: Vec<Feature>, countries: Vec<Feature>) -> Vec<Feature> {
    let mut features = components;
    features.extend(countries);
    features
}
