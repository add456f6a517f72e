// src/pipeline/overlap.rs
//! Разрешение перекрытий
//!
//! Для каждой упорядоченной пары индексов (g, i) из площадных объектов
//! вычитается `features[i]` из `features[g]`, и результат сразу записывается
//! на место `g`. Каждая неупорядоченная пара посещается дважды, а второй визит
//! видит уже обрезанную геометрию. Итог зависит от порядка слоёв.
//!
//! Природные слои (`water`, `sand`, `grass`) не обрезаются и не режут других.

use tracing::{debug, info, warn};

use crate::engine::GeometryEngine;
use crate::feature::Feature;

/// Счётчики одного прохода
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapStats {
    /// Пары, в которых геометрия `g` заменена разностью
    pub clipped: usize,
    /// Пары с пустой разностью: `g` оставлен как был
    pub swallowed: usize,
    /// Пары, на которых движок вернул ошибку
    pub failed: usize,
}

/// Проходит все упорядоченные пары и вычитает их друг из друга на месте
pub fn resolve_overlaps<E: GeometryEngine + ?Sized>(
    engine: &E,
    features: Vec<Feature>,
) -> Vec<Feature> {
    let (features, stats) = resolve_overlaps_with_stats(engine, features);
    info!(
        clipped = stats.clipped,
        swallowed = stats.swallowed,
        failed = stats.failed,
        "Перекрытия разрешены"
    );
    features
}

/// Как [`resolve_overlaps`], но дополнительно возвращает счётчики
pub fn resolve_overlaps_with_stats<E: GeometryEngine + ?Sized>(
    engine: &E,
    mut features: Vec<Feature>,
) -> (Vec<Feature>, OverlapStats) {
    let mut stats = OverlapStats::default();
    let len = features.len();

    for g in 0..len {
        for i in 0..len {
            if !should_clip(&features[g], &features[i]) || g == i {
                continue;
            }

            match engine.difference(&features[g].geometry, &features[i].geometry) {
                Ok(Some(rest)) => {
                    features[g].geometry = rest;
                    stats.clipped += 1;
                }
                Ok(None) => stats.swallowed += 1,
                Err(err) => {
                    warn!(
                        subject = ?features[g].properties.name,
                        clip = ?features[i].properties.name,
                        error = %err,
                        "Ошибка вычитания, пара пропущена"
                    );
                    stats.failed += 1;
                }
            }
        }
        debug!(index = g, name = ?features[g].properties.name, "Объект обработан");
    }

    (features, stats)
}

fn should_clip(subject: &Feature, clip: &Feature) -> bool {
    !subject.is_terrain() && !clip.is_terrain() && subject.is_polygonal() && clip.is_polygonal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DissolveKey, PlanarEngine};
    use crate::error::GeometryError;
    use crate::test_support::{area, named, point, square, typed};
    use geo::Geometry;
    use std::sync::Mutex;

    /// Запоминает пары (g, i) по площади участников и ничего не режет
    #[derive(Default)]
    struct RecordingEngine {
        visits: Mutex<Vec<(i64, i64)>>,
    }

    impl GeometryEngine for RecordingEngine {
        fn union_by_key(
            &self,
            features: Vec<Feature>,
            _key: DissolveKey<'_>,
        ) -> Result<Vec<Feature>, GeometryError> {
            Ok(features)
        }

        fn buffer(&self, g: &Geometry<f64>, _radius: f64) -> Result<Geometry<f64>, GeometryError> {
            Ok(g.clone())
        }

        fn difference(
            &self,
            a: &Geometry<f64>,
            b: &Geometry<f64>,
        ) -> Result<Option<Geometry<f64>>, GeometryError> {
            self.visits
                .lock()
                .unwrap()
                .push((area(a).round() as i64, area(b).round() as i64));
            Ok(None)
        }

        fn simplify(
            &self,
            features: Vec<Feature>,
            _tolerance: f64,
            _high_quality: bool,
        ) -> Result<Vec<Feature>, GeometryError> {
            Ok(features)
        }
    }

    /// Падает на вычитании из объекта площадью 4
    struct FailingEngine;

    impl GeometryEngine for FailingEngine {
        fn union_by_key(
            &self,
            features: Vec<Feature>,
            key: DissolveKey<'_>,
        ) -> Result<Vec<Feature>, GeometryError> {
            PlanarEngine.union_by_key(features, key)
        }

        fn buffer(&self, g: &Geometry<f64>, radius: f64) -> Result<Geometry<f64>, GeometryError> {
            PlanarEngine.buffer(g, radius)
        }

        fn difference(
            &self,
            a: &Geometry<f64>,
            b: &Geometry<f64>,
        ) -> Result<Option<Geometry<f64>>, GeometryError> {
            if (area(a) - 4.0).abs() < 1e-9 {
                return Err(GeometryError::Panicked {
                    op: "difference",
                    message: "self-intersection".to_owned(),
                });
            }
            PlanarEngine.difference(a, b)
        }

        fn simplify(
            &self,
            features: Vec<Feature>,
            tolerance: f64,
            high_quality: bool,
        ) -> Result<Vec<Feature>, GeometryError> {
            PlanarEngine.simplify(features, tolerance, high_quality)
        }
    }

    #[test]
    fn visits_every_ordered_pair_in_row_major_order() {
        let engine = RecordingEngine::default();
        let features = vec![
            named("A", square(0.0, 0.0, 1.0)),
            named("B", square(0.0, 0.0, 2.0)),
            named("C", square(0.0, 0.0, 3.0)),
        ];
        resolve_overlaps(&engine, features);

        let visits = engine.visits.into_inner().unwrap();
        assert_eq!(visits, vec![(1, 4), (1, 9), (4, 1), (4, 9), (9, 1), (9, 4)]);
    }

    #[test]
    fn terrain_and_points_are_skipped() {
        let engine = RecordingEngine::default();
        let features = vec![
            typed("lake", "water", square(0.0, 0.0, 1.0)),
            named("A", square(0.0, 0.0, 2.0)),
            named("Town", point(0.5, 0.5)),
            typed("dune", "sand", square(0.0, 0.0, 3.0)),
            named("B", square(0.0, 0.0, 4.0)),
        ];
        resolve_overlaps(&engine, features);

        let visits = engine.visits.into_inner().unwrap();
        assert_eq!(visits, vec![(4, 16), (16, 4)]);
    }

    #[test]
    fn later_features_cut_into_earlier_ones() {
        let features = vec![named("A", square(0.0, 0.0, 2.0)), named("B", square(1.0, 0.0, 2.0))];
        let (resolved, stats) = resolve_overlaps_with_stats(&PlanarEngine, features);

        // A теряет правую половину, затем B режется уже обрезанным A и не меняется по площади
        assert!((area(&resolved[0].geometry) - 2.0).abs() < 1e-9);
        assert!((area(&resolved[1].geometry) - 4.0).abs() < 1e-9);
        assert_eq!(stats.clipped, 2);
    }

    #[test]
    fn contained_feature_stays_when_difference_is_empty() {
        let small = named("small", square(1.0, 1.0, 1.0));
        let original = small.geometry.clone();
        let features = vec![small, named("big", square(0.0, 0.0, 4.0))];

        let (resolved, stats) = resolve_overlaps_with_stats(&PlanarEngine, features);
        assert_eq!(resolved[0].geometry, original);
        assert_eq!(stats.swallowed, 1);
        // big получает дыру
        assert!((area(&resolved[1].geometry) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn terrain_is_bit_identical_after_resolution() {
        let lake = typed("lake", "water", square(0.0, 0.0, 3.0));
        let features = vec![
            lake.clone(),
            named("A", square(1.0, 1.0, 3.0)),
            typed("meadow", "grass", square(2.0, 2.0, 3.0)),
        ];
        let resolved = resolve_overlaps(&PlanarEngine, features.clone());
        assert_eq!(resolved[0], lake);
        assert_eq!(resolved[2], features[2]);
        assert_eq!(resolved[1].geometry, features[1].geometry);
    }

    #[test]
    fn failing_pair_is_skipped_and_run_continues() {
        let broken = named("broken", square(0.0, 0.0, 2.0));
        let original = broken.geometry.clone();
        let features = vec![broken, named("B", square(1.0, 0.0, 3.0))];

        let (resolved, stats) = resolve_overlaps_with_stats(&FailingEngine, features);
        assert_eq!(resolved[0].geometry, original);
        assert_eq!(stats.failed, 1);
        // B всё равно обрезан нетронутым A
        assert!((area(&resolved[1].geometry) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_features_keep_their_area() {
        let features = vec![named("A", square(0.0, 0.0, 1.0)), named("B", square(5.0, 5.0, 1.0))];
        let resolved = resolve_overlaps(&PlanarEngine, features);
        assert!((area(&resolved[0].geometry) - 1.0).abs() < 1e-9);
        assert!((area(&resolved[1].geometry) - 1.0).abs() < 1e-9);
    }
}
