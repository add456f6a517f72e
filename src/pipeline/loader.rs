// src/pipeline/loader.rs
//! Загрузка слоёв стран
//!
//! Для каждой страны из `layers.yaml` читается `<страна>.geojson`:
//! - полигоны теряют авторские свойства и получают свойства страны из таблицы и `name`
//! - `MultiPolygon` в исходнике — фатальная ошибка (мультиполигоны собирает сам конвейер)
//! - точки и линии (города, достопримечательности) получают нормализованный `type`
//!
//! Очищенный исходник записывается обратно на место.

use std::path::Path;

use geo::Geometry;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::feature::io::{read_collection, write_collection};
use crate::feature::{Feature, FeatureKind, Properties};

/// Результат подготовки одной страны
#[derive(Debug, Clone)]
pub struct PreparedCountry {
    /// То, что записывается обратно в исходник: полигоны без свойств
    pub sanitized: Vec<Feature>,
    /// То, что уходит в конвейер
    pub features: Vec<Feature>,
}

/// Читает все страны в объявленном порядке и складывает их в один список
pub fn load_countries(config: &BuildConfig) -> Result<Vec<Feature>, BuildError> {
    let mut layers = Vec::with_capacity(config.layers.len());

    for country in &config.layers {
        let path = config.paths.country_source(country);
        let source = read_collection(&path)?;
        let prepared = prepare_country(country, config.countries.get(country), source, &path)?;

        if config.write_back_sources {
            write_collection(&path, &prepared.sanitized)?;
        }

        debug!(country = %country, features = prepared.features.len(), "Страна загружена");
        layers.push(prepared.features);
    }

    let features = stack_layers(layers);
    info!(
        countries = config.layers.len(),
        features = features.len(),
        "Слои стран загружены"
    );
    Ok(features)
}

/// Готовит объекты одной страны.
///
/// Таблица свойств нужна только при наличии полигонов: страна из одних городов
/// может в ней отсутствовать.
pub fn prepare_country(
    country: &str,
    properties: Option<&Properties>,
    source: Vec<Feature>,
    path: &Path,
) -> Result<PreparedCountry, BuildError> {
    if source
        .iter()
        .any(|f| matches!(f.geometry, Geometry::MultiPolygon(_)))
    {
        return Err(BuildError::MultiPolygonSource {
            country: country.to_owned(),
            path: path.to_path_buf(),
        });
    }

    let sanitized = source
        .iter()
        .map(|feature| {
            let mut clean = feature.clone();
            if clean.is_polygonal() {
                clean.properties = Properties::default();
            }
            clean
        })
        .collect();

    let features = source
        .into_iter()
        .map(|mut feature| {
            if feature.is_polygonal() {
                let mut assigned = properties
                    .cloned()
                    .ok_or_else(|| BuildError::UnknownCountry(country.to_owned()))?;
                assigned.name = Some(country.to_owned());
                feature.properties = assigned;
            } else {
                normalize_annotation(&mut feature.properties);
            }
            Ok(feature)
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    Ok(PreparedCountry {
        sanitized,
        features,
    })
}

/// `landmark` → `landmark-0`, отсутствующий или пустой тип → `city`.
///
/// Тип нестрокового значения (`"type": 1`) считается заданным и не трогается.
pub fn normalize_annotation(properties: &mut Properties) {
    match &properties.kind {
        Some(FeatureKind::Other(kind)) if kind == "landmark" => {
            properties.kind = Some(FeatureKind::Landmark(0));
        }
        Some(FeatureKind::Other(kind)) if kind.is_empty() => {
            properties.kind = Some(FeatureKind::City);
        }
        Some(_) => {}
        None if properties.has_kind() => {}
        None => properties.kind = Some(FeatureKind::City),
    }
}

/// Склеивает страны, разворачивает весь список и убирает объекты без имени.
///
/// Разворачивается именно итоговый список, поэтому объекты внутри страны тоже
/// идут в обратном порядке. Точки без собственного `name` здесь отсеиваются.
#[must_use]
pub fn stack_layers(layers: Vec<Vec<Feature>>) -> Vec<Feature> {
    let mut features: Vec<Feature> = layers.into_iter().flatten().collect();
    features.reverse();
    features.retain(|f| f.properties.is_named());
    features
}
