//! Конвейер сборки композитной карты
//!
//! Этапы идут строго друг за другом, каждый владеет списком объектов и отдаёт
//! новый список следующему:
//! загрузка → слияние по имени → мультиполигоны → перекрытия → компоненты →
//! фильтр/подмена свойств → номера → запись.

pub mod aggregate;
pub mod components;
pub mod dissolve;
pub mod filter;
pub mod ids;
pub mod loader;
pub mod overlap;

use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use crate::config::BuildConfig;
use crate::engine::{GeometryEngine, PlanarEngine};
use crate::error::BuildError;
use crate::feature::io::write_collection;
use components::{ComponentSources, assemble_components, prepend_components};

/// Итог прогона
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    /// Объектов в итоговой коллекции
    pub features: usize,
    /// Стран после сборки мультиполигонов
    pub countries: usize,
    pub output: PathBuf,
}

/// Собирает проект с движком по умолчанию
pub fn build(config: &BuildConfig) -> Result<BuildSummary, BuildError> {
    build_with(&PlanarEngine, config)
}

/// Собирает проект и пишет `geo.geojson`.
///
/// Любая ошибка прерывает прогон до записи: результат либо записан целиком, либо нет.
pub fn build_with<E: GeometryEngine + ?Sized>(
    engine: &E,
    config: &BuildConfig,
) -> Result<BuildSummary, BuildError> {
    let total = Instant::now();

    let features = timed("Загрузка стран", || loader::load_countries(config))?;
    let features = timed("Слияние по имени", || dissolve::dissolve_countries(engine, features))?;
    let features = timed("Полигоны в мультиполигоны", || {
        aggregate::aggregate_countries(features)
    });
    let countries = features.iter().filter(|f| f.is_polygonal()).count();

    let features = timed("Разрешение перекрытий", || overlap::resolve_overlaps(engine, features));

    let features = timed("Компоненты карты", || {
        let sources = ComponentSources::load(&config.paths)?;
        let components = assemble_components(engine, sources)?;
        Ok::<_, BuildError>(prepend_components(components, features))
    })?;

    let features = timed("Фильтр и подмена свойств", || {
        filter::apply_run_options(features, &config.options)
    });
    let features = timed("Номера объектов", || ids::assign_ids(features));

    write_collection(&config.paths.output, &features)?;

    info!(
        features = features.len(),
        countries,
        output = %config.paths.output.display(),
        elapsed = ?total.elapsed(),
        "Сборка завершена"
    );

    Ok(BuildSummary {
        features: features.len(),
        countries,
        output: config.paths.output.clone(),
    })
}

fn timed<T>(stage: &'static str, f: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    info!("{stage}...");
    let out = f();
    info!(elapsed = ?started.elapsed(), "{stage}: готово");
    out
}
