// src/config.rs
//! Конфигурация сборки
//!
//! Этот модуль описывает всё, что сборщик читает до начала конвейера:
//! - раскладку каталогов проекта и переопределения путей
//! - порядок слоёв стран (`layers.yaml`)
//! - таблицу свойств стран (`properties.yaml`)
//! - параметры прогона (`config.yaml`: фильтр по тегам и подмена свойств)
//!
//! Документы читаются по расширению: YAML, TOML или JSON.
//! Собранный [`BuildConfig`] неизменяем и передаётся в каждый этап по ссылке.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BuildError;
use crate::feature::{Properties, RoadClass, Terrain};

/// Таблица свойств стран: идентификатор страны → стиль и теги
pub type CountryTable = HashMap<String, Properties>;

/// Пути к исходникам проекта
///
/// По умолчанию всё лежит в `<root>/src`, результат — в `<root>/geo.geojson`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    /// Порядок слоёв стран
    pub layers: PathBuf,
    /// Таблица свойств стран
    pub properties: PathBuf,
    /// Параметры прогона
    pub config: PathBuf,
    /// Каталог `<страна>.geojson`
    pub countries: PathBuf,
    /// Каталог `water/sand/grass.geojson`
    pub nature: PathBuf,
    /// Каталог `white/orange/yellow.geojson` и `sizes.json`
    pub roads: PathBuf,
    /// Итоговая коллекция
    pub output: PathBuf,
}

impl ProjectPaths {
    #[must_use]
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let src = root.join("src");
        Self {
            layers: src.join("layers.yaml"),
            properties: src.join("properties.yaml"),
            config: src.join("config.yaml"),
            countries: src.join("countries"),
            nature: src.join("nature"),
            roads: src.join("roads"),
            output: root.join("geo.geojson"),
            root,
        }
    }

    #[must_use]
    pub fn country_source(&self, country: &str) -> PathBuf {
        self.countries.join(format!("{country}.geojson"))
    }

    #[must_use]
    pub fn nature_source(&self, terrain: Terrain) -> PathBuf {
        self.nature.join(terrain.source_file())
    }

    #[must_use]
    pub fn road_source(&self, class: RoadClass) -> PathBuf {
        self.roads.join(class.source_file())
    }

    #[must_use]
    pub fn road_sizes(&self) -> PathBuf {
        self.roads.join("sizes.json")
    }
}

/// Параметры прогона (`config.yaml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Оставить только объекты, у которых есть хотя бы один из этих тегов
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// Заменить свойства всех оставшихся объектов этим набором, как он записан
    #[serde(rename = "reProperty", default)]
    pub re_property: Option<Map<String, Value>>,
}

/// Порядок слоёв: голый список или таблица с ключом `layers` (для TOML)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LayerList {
    Plain(Vec<String>),
    Table { layers: Vec<String> },
}

impl From<LayerList> for Vec<String> {
    fn from(list: LayerList) -> Self {
        match list {
            LayerList::Plain(layers) | LayerList::Table { layers } => layers,
        }
    }
}

/// Полная конфигурация одного прогона
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub paths: ProjectPaths,
    /// Страны в объявленном порядке
    pub layers: Vec<String>,
    pub countries: CountryTable,
    pub options: RunOptions,
    /// Перезаписывать ли исходники стран очищенной версией
    pub write_back_sources: bool,
}

impl BuildConfig {
    /// Читает порядок слоёв, таблицу свойств и параметры прогона
    ///
    /// # Ошибки
    /// Любой из трёх документов отсутствует или не разбирается.
    pub fn load(paths: ProjectPaths) -> Result<Self, BuildError> {
        let layers: LayerList = read_document(&paths.layers)?;
        let countries: CountryTable = read_document(&paths.properties)?;
        let options: RunOptions = read_optional_document(&paths.config)?;

        Ok(Self {
            paths,
            layers: layers.into(),
            countries,
            options,
            write_back_sources: true,
        })
    }

    #[must_use]
    pub fn with_write_back(mut self, enabled: bool) -> Self {
        self.write_back_sources = enabled;
        self
    }
}

/// Читает документ, выбирая формат по расширению файла
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, BuildError> {
    let contents = read_text(path)?;
    parse_document(&contents, path)
}

/// Как [`read_document`], но пустой документ (или `null`) даёт значение по умолчанию
pub fn read_optional_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T, BuildError> {
    let contents = read_text(path)?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    let value: Option<T> = parse_document(&contents, path)?;
    Ok(value.unwrap_or_default())
}

fn read_text(path: &Path) -> Result<String, BuildError> {
    fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_document<T: DeserializeOwned>(contents: &str, path: &Path) -> Result<T, BuildError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("yaml" | "yml") => serde_yaml::from_str(contents).map_err(|source| BuildError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
        Some("toml") => toml::from_str(contents).map_err(|source| BuildError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        Some("json" | "geojson") => {
            serde_json::from_str(contents).map_err(|source| BuildError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Err(BuildError::UnsupportedFormat(path.to_path_buf())),
    }
}
