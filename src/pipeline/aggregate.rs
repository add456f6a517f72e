// src/pipeline/aggregate.rs
use std::collections::HashMap;

use geo::{Geometry, MultiPolygon};

use crate::feature::{Feature, Properties, partition_polygonal};

/// Собирает все полигоны и мультиполигоны страны в один `MultiPolygon`.
///
/// Порядок стран — порядок первого появления имени; свойства берутся у первого
/// объекта страны. Прочие объекты идут следом без изменений.
#[must_use]
pub fn aggregate_countries(features: Vec<Feature>) -> Vec<Feature> {
    let (polygons, others) = partition_polygonal(features);

    let mut countries: Vec<(Properties, MultiPolygon<f64>)> = Vec::new();
    let mut slots: HashMap<Option<String>, usize> = HashMap::new();

    for feature in polygons {
        let slot = *slots
            .entry(feature.properties.name.clone())
            .or_insert_with(|| {
                countries.push((feature.properties.clone(), MultiPolygon::new(Vec::new())));
                countries.len() - 1
            });

        let parts = &mut countries[slot].1;
        match feature.geometry {
            Geometry::MultiPolygon(multi) => parts.0.extend(multi.0),
            Geometry::Polygon(polygon) => parts.0.push(polygon),
            _ => {}
        }
    }

    countries
        .into_iter()
        .map(|(properties, multi)| Feature::new(multi, properties))
        .chain(others)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{named, point, square};
    use std::collections::HashSet;

    #[test]
    fn one_multipolygon_per_name() {
        let Geometry::Polygon(a1) = square(0.0, 0.0, 1.0) else {
            unreachable!()
        };
        let Geometry::Polygon(a2) = square(3.0, 0.0, 1.0) else {
            unreachable!()
        };

        let features = vec![
            named("A", Geometry::MultiPolygon(MultiPolygon::new(vec![a1, a2]))),
            named("B", square(10.0, 0.0, 1.0)),
            named("Town", point(0.5, 0.5)),
            named("A", square(6.0, 0.0, 1.0)),
        ];
        let aggregated = aggregate_countries(features);

        assert_eq!(aggregated.len(), 3);
        assert_eq!(aggregated[0].properties.name.as_deref(), Some("A"));
        assert_eq!(aggregated[1].properties.name.as_deref(), Some("B"));
        assert_eq!(aggregated[2].properties.name.as_deref(), Some("Town"));
        assert!(matches!(&aggregated[0].geometry, Geometry::MultiPolygon(mp) if mp.0.len() == 3));
        assert!(matches!(&aggregated[1].geometry, Geometry::MultiPolygon(mp) if mp.0.len() == 1));
    }

    #[test]
    fn distinct_names_are_preserved() {
        let features: Vec<Feature> = ["A", "B", "A", "C", "B"]
            .iter()
            .enumerate()
            .map(|(i, name)| named(name, square(i as f64 * 3.0, 0.0, 1.0)))
            .collect();
        let names: HashSet<_> = features.iter().map(|f| f.properties.name.clone()).collect();

        let aggregated = aggregate_countries(features);
        assert_eq!(aggregated.len(), names.len());
    }

    #[test]
    fn first_feature_properties_are_kept() {
        let mut first = named("A", square(0.0, 0.0, 1.0));
        first.properties.fill = Some("#111".to_owned());
        let mut second = named("A", square(2.0, 0.0, 1.0));
        second.properties.fill = Some("#222".to_owned());

        let aggregated = aggregate_countries(vec![first, second]);
        assert_eq!(aggregated[0].properties.fill.as_deref(), Some("#111"));
    }
}
