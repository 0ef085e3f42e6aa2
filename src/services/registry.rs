use crate::error::{AppError, Result};
use crate::models::{Coordinates, RefugeDistance, RefugeZone};
use std::collections::HashSet;
use std::path::Path;

const DEFAULT_REFUGE_RADIUS_M: f64 = 10.0;

/// Partner refuges around Toulouse: (id, name, lat, lng).
const TOULOUSE_REFUGES: &[(&str, &str, f64, f64)] = &[
    // Labège
    ("refuge-1", "Centre Labège", 43.5397, 1.5236),
    ("refuge-2", "Labège Innopole", 43.5450, 1.5180),
    ("refuge-3", "Parc Labège Village", 43.5320, 1.5290),
    // Blagnac
    ("refuge-4", "Centre Blagnac", 43.6360, 1.3890),
    ("refuge-5", "Parc de Blagnac", 43.6420, 1.3750),
    ("refuge-6", "Odyssud Blagnac", 43.6290, 1.3960),
    // Colomiers
    ("refuge-7", "Centre Colomiers", 43.6109, 1.3340),
    ("refuge-8", "Parc du Cabirol", 43.6180, 1.3210),
    ("refuge-9", "Colomiers Lycée", 43.6040, 1.3450),
    // Balma
    ("refuge-10", "Centre Balma", 43.6110, 1.4990),
    ("refuge-11", "Balma Gramont", 43.6200, 1.5080),
    ("refuge-12", "Parc Balma", 43.6050, 1.4890),
    // Castanet-Tolosan
    ("refuge-13", "Centre Castanet", 43.5163, 1.4978),
    ("refuge-14", "Castanet Place", 43.5230, 1.5050),
    ("refuge-15", "Parc Castanet", 43.5100, 1.4890),
    // Tournefeuille
    ("refuge-16", "Centre Tournefeuille", 43.5851, 1.3440),
    ("refuge-17", "Parc du Château", 43.5920, 1.3350),
    ("refuge-18", "Tournefeuille Mairie", 43.5780, 1.3520),
    // Cugnaux
    ("refuge-19", "Centre Cugnaux", 43.5368, 1.3455),
    ("refuge-20", "Parc de Cugnaux", 43.5420, 1.3380),
    ("refuge-21", "Cugnaux Sports", 43.5310, 1.3540),
    // Muret
    ("refuge-22", "Centre Muret", 43.4616, 1.3267),
    ("refuge-23", "Parc de Muret", 43.4690, 1.3180),
    ("refuge-24", "Muret Gare", 43.4550, 1.3340),
    ("refuge-25", "Muret Estantens", 43.4720, 1.3410),
    // Portet-sur-Garonne
    ("refuge-26", "Centre Portet", 43.5220, 1.4080),
    ("refuge-27", "Portet Récébédou", 43.5180, 1.3980),
    ("refuge-28", "Parc Portet", 43.5280, 1.4150),
    // Toulouse centre
    ("refuge-29", "Capitole Toulouse", 43.6047, 1.4410),
    ("refuge-30", "Arnaud-Bernard", 43.5890, 1.4520),
    ("refuge-31", "Compans Caffarelli", 43.6200, 1.4300),
    ("refuge-32", "Saint-Cyprien", 43.5750, 1.4650),
    ("refuge-33", "Jardin des Plantes", 43.6109, 1.4637),
    ("refuge-34", "Place Wilson", 43.5970, 1.4284),
    ("refuge-35", "Quartier Carmes", 43.5844, 1.4390),
];

/// Read-only catalog of refuge zones. Guaranteed non-empty with unique ids,
/// so nearest-refuge queries always have an answer.
#[derive(Debug, Clone)]
pub struct RefugeRegistry {
    zones: Vec<RefugeZone>,
}

impl RefugeRegistry {
    pub fn new(zones: Vec<RefugeZone>) -> Result<Self> {
        if zones.is_empty() {
            return Err(AppError::InvalidRegistry(
                "At least one refuge is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for zone in &zones {
            if !seen.insert(zone.id.as_str()) {
                return Err(AppError::InvalidRegistry(format!(
                    "Duplicate refuge id '{}'",
                    zone.id
                )));
            }
            Coordinates::new(zone.coordinates.lat, zone.coordinates.lng).map_err(|e| {
                AppError::InvalidRegistry(format!("Refuge '{}': {}", zone.id, e))
            })?;
        }

        Ok(RefugeRegistry { zones })
    }

    /// The built-in Toulouse catalog.
    pub fn toulouse() -> Self {
        let zones = TOULOUSE_REFUGES
            .iter()
            .map(|&(id, name, lat, lng)| RefugeZone {
                id: id.to_string(),
                name: name.to_string(),
                coordinates: Coordinates { lat, lng },
                radius_m: DEFAULT_REFUGE_RADIUS_M,
            })
            .collect();
        RefugeRegistry { zones }
    }

    /// Parse a JSON array of refuge zones.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let zones: Vec<RefugeZone> = serde_json::from_str(json)
            .map_err(|e| AppError::InvalidRegistry(format!("Failed to parse catalog: {}", e)))?;
        Self::new(zones)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::InvalidRegistry(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let registry = Self::from_json_str(&json)?;
        tracing::info!(
            refuges = registry.len(),
            "Loaded {} refuges from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Zone closest to `point`. The first zone in catalog order wins ties.
    pub fn nearest(&self, point: &Coordinates) -> &RefugeZone {
        let mut nearest = &self.zones[0];
        let mut min_distance = nearest.distance_from(point);

        for zone in &self.zones[1..] {
            let distance = zone.distance_from(point);
            if distance < min_distance {
                min_distance = distance;
                nearest = zone;
            }
        }

        nearest
    }

    /// Every zone with its distance from `point`, closest first. Equal
    /// distances keep catalog order.
    pub fn sorted_by_distance(&self, point: &Coordinates) -> Vec<RefugeDistance> {
        let mut sorted: Vec<RefugeDistance> = self
            .zones
            .iter()
            .map(|zone| RefugeDistance {
                zone: zone.clone(),
                distance_km: zone.distance_from(point),
            })
            .collect();

        // sort_by is stable
        sorted.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        sorted
    }

    pub fn get(&self, id: &str) -> Option<&RefugeZone> {
        self.zones.iter().find(|zone| zone.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RefugeZone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl Default for RefugeRegistry {
    fn default() -> Self {
        Self::toulouse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(id: &str, lat: f64, lng: f64) -> RefugeZone {
        RefugeZone::new(id, id, lat, lng, 10.0).unwrap()
    }

    fn c(lat: f64, lng: f64) -> Coordinates {
        Coordinates::new(lat, lng).unwrap()
    }

    fn brute_force_nearest<'a>(registry: &'a RefugeRegistry, point: &Coordinates) -> &'a str {
        let mut best: Option<(&RefugeZone, f64)> = None;
        for zone in registry.iter() {
            let d = zone.distance_from(point);
            match best {
                Some((_, min)) if d >= min => {}
                _ => best = Some((zone, d)),
            }
        }
        &best.unwrap().0.id
    }

    #[test]
    fn builtin_catalog_has_35_unique_refuges() {
        let registry = RefugeRegistry::toulouse();
        assert_eq!(registry.len(), 35);
        assert!(RefugeRegistry::new(registry.iter().cloned().collect()).is_ok());
        assert_eq!(registry.get("refuge-29").unwrap().name, "Capitole Toulouse");
    }

    #[test]
    fn nearest_at_capitole_is_capitole() {
        let registry = RefugeRegistry::toulouse();
        let nearest = registry.nearest(&c(43.6047, 1.4410));
        assert_eq!(nearest.id, "refuge-29");
    }

    #[test]
    fn nearest_matches_brute_force_scan() {
        let registry = RefugeRegistry::toulouse();
        for i in 0..20 {
            for j in 0..20 {
                let point = c(43.40 + i as f64 * 0.015, 1.28 + j as f64 * 0.013);
                assert_eq!(
                    registry.nearest(&point).id,
                    brute_force_nearest(&registry, &point),
                    "at {:?}",
                    point
                );
            }
        }
    }

    #[test]
    fn nearest_tie_goes_to_first_in_catalog() {
        // Two zones mirrored around the query point
        let registry = RefugeRegistry::new(vec![
            zone("west", 43.60, -0.5),
            zone("east", 43.60, 0.5),
        ])
        .unwrap();
        assert_eq!(registry.nearest(&c(43.60, 0.0)).id, "west");

        let reversed = RefugeRegistry::new(vec![
            zone("east", 43.60, 0.5),
            zone("west", 43.60, -0.5),
        ])
        .unwrap();
        assert_eq!(reversed.nearest(&c(43.60, 0.0)).id, "east");
    }

    #[test]
    fn sorted_is_non_decreasing() {
        let registry = RefugeRegistry::toulouse();
        let sorted = registry.sorted_by_distance(&c(43.58, 1.40));
        assert_eq!(sorted.len(), 35);
        for pair in sorted.windows(2) {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
    }

    #[test]
    fn sorted_is_stable_for_equal_distances() {
        let registry = RefugeRegistry::new(vec![
            zone("far", 43.70, 1.44),
            zone("same-a", 43.61, 1.44),
            zone("same-b", 43.61, 1.44),
            zone("same-c", 43.61, 1.44),
            zone("near", 43.6001, 1.44),
        ])
        .unwrap();

        let ids: Vec<_> = registry
            .sorted_by_distance(&c(43.60, 1.44))
            .into_iter()
            .map(|r| r.zone.id)
            .collect();
        assert_eq!(ids, vec!["near", "same-a", "same-b", "same-c", "far"]);
    }

    #[test]
    fn rejects_empty_and_duplicate_catalogs() {
        assert!(matches!(
            RefugeRegistry::new(vec![]),
            Err(AppError::InvalidRegistry(_))
        ));
        assert!(matches!(
            RefugeRegistry::new(vec![zone("a", 43.6, 1.4), zone("a", 43.7, 1.5)]),
            Err(AppError::InvalidRegistry(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let bad = RefugeZone {
            id: "bad".to_string(),
            name: "Bad".to_string(),
            coordinates: Coordinates { lat: 120.0, lng: 1.0 },
            radius_m: 10.0,
        };
        assert!(RefugeRegistry::new(vec![bad]).is_err());
    }

    #[test]
    fn loads_catalog_from_json() {
        let json = r#"[
            {"id": "r1", "name": "Gare", "coordinates": {"lat": 43.611, "lng": 1.453}, "radius_m": 15.0},
            {"id": "r2", "name": "Mairie", "coordinates": {"lat": 43.604, "lng": 1.444}, "radius_m": 10.0}
        ]"#;
        let registry = RefugeRegistry::from_json_str(json).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("r1").unwrap().radius_m, 15.0);
        assert!(registry.get("r3").is_none());

        assert!(RefugeRegistry::from_json_str("not json").is_err());
        assert!(RefugeRegistry::from_json_str("[]").is_err());
    }
}
