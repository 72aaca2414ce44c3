use super::{haversine_km, parse_number, Coordinate, GeoError};

/// Anything with a (possibly unparseable) position on the globe
pub trait Located {
    fn position(&self) -> Option<Coordinate>;
}

impl Located for Coordinate {
    fn position(&self) -> Option<Coordinate> {
        Some(*self)
    }
}

/// Parse a search radius in kilometers. Negative and non-numeric values are rejected.
pub fn parse_radius(raw: &str) -> Result<f64, GeoError> {
    match parse_number(raw) {
        Some(radius) if radius >= 0.0 => Ok(radius),
        _ => Err(GeoError::InvalidRadius(raw.trim().to_string())),
    }
}

/// Items within `radius_km` of `origin` (boundary inclusive), in input order.
///
/// Items without a usable position never match. This is a linear scan.
pub fn filter_nearby<'a, T: Located>(items: &'a [T], origin: Coordinate, radius_km: f64) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| {
            item.position()
                .map(|p| haversine_km(origin, p) <= radius_km)
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Spot {
        name: &'static str,
        at: Option<Coordinate>,
    }

    impl Located for Spot {
        fn position(&self) -> Option<Coordinate> {
            self.at
        }
    }

    fn spot(name: &'static str, lat: f64, lon: f64) -> Spot {
        Spot { name, at: Some(Coordinate::new(lat, lon)) }
    }

    #[test]
    fn includes_close_ticket_and_excludes_with_tiny_radius() {
        let items = vec![spot("concert", -6.2, 106.8)];
        let query = Coordinate::new(-6.21, 106.81);

        assert_eq!(filter_nearby(&items, query, 5.0).len(), 1);
        assert!(filter_nearby(&items, query, 0.0001).is_empty());
    }

    #[test]
    fn boundary_is_inclusive() {
        let items = vec![spot("here", 1.0, 1.0)];
        assert_eq!(filter_nearby(&items, Coordinate::new(1.0, 1.0), 0.0).len(), 1);

        let origin = Coordinate::new(0.0, 0.0);
        let exact = haversine_km(origin, Coordinate::new(1.0, 1.0));
        assert_eq!(filter_nearby(&items, origin, exact).len(), 1);
    }

    #[test]
    fn preserves_order_and_leaves_input_untouched() {
        let items = vec![
            spot("a", -6.2, 106.8),
            spot("far", 51.5, -0.12),
            spot("b", -6.25, 106.85),
            Spot { name: "nowhere", at: None },
            spot("c", -6.19, 106.79),
        ];
        let result = filter_nearby(&items, Coordinate::new(-6.2, 106.8), 20.0);
        let names: Vec<_> = result.iter().map(|s| s.name).collect();

        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(items.len(), 5);
    }

    #[test]
    fn growing_the_radius_never_drops_matches() {
        let items: Vec<Coordinate> = (0..40)
            .map(|i| Coordinate::new(-6.0 - i as f64 * 0.05, 106.0 + i as f64 * 0.07))
            .collect();
        let origin = Coordinate::new(-6.5, 106.4);
        let radii = [0.0, 1.0, 5.0, 25.0, 80.0, 250.0, 20_000.0];

        for pair in radii.windows(2) {
            let small = filter_nearby(&items, origin, pair[0]);
            let large = filter_nearby(&items, origin, pair[1]);
            assert!(small.iter().all(|c| large.contains(c)));
        }
    }

    #[test]
    fn radius_parsing() {
        assert_eq!(parse_radius("5"), Ok(5.0));
        assert_eq!(parse_radius(" 0.0001 "), Ok(0.0001));
        assert_eq!(parse_radius("0"), Ok(0.0));
        assert!(matches!(parse_radius("-1"), Err(GeoError::InvalidRadius(_))));
        assert!(matches!(parse_radius("ten"), Err(GeoError::InvalidRadius(_))));
        assert!(matches!(parse_radius(""), Err(GeoError::InvalidRadius(_))));
    }
}
