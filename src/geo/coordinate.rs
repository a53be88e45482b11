//! Coordinates and the map query that carries them

use serde::Serialize;

use crate::microformats::MicroformatItem;
use crate::utils::{SyndicationError, SyndicationResult};

/// One latitude/longitude pair, with the page it was found on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Location of the source page, when known
    pub source: Option<String>,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Read `latitude`/`longitude` off a geo item
    ///
    /// # Errors
    /// Returns `InvalidCoordinates` when either value is missing or not a number.
    pub fn from_item(item: &MicroformatItem) -> SyndicationResult<Self> {
        let read = |name: &str| -> SyndicationResult<f64> {
            let raw = item
                .first_text(name)
                .ok_or_else(|| SyndicationError::InvalidCoordinates(format!("missing {name}")))?;
            raw.trim()
                .parse::<f64>()
                .map_err(|_| SyndicationError::InvalidCoordinates(format!("{name} is not a number: {raw}")))
        };

        Ok(Self::new(read("latitude")?, read("longitude")?))
    }

    pub fn pair(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Encode coordinates as `lat,lon|lat,lon|...` without a trailing delimiter
pub fn encode_map_query(coordinates: &[GeoCoordinate]) -> String {
    coordinates
        .iter()
        .map(|c| format!("{},{}", c.latitude, c.longitude))
        .collect::<Vec<_>>()
        .join("|")
}

/// Parse a map query back into `(lat, lon)` pairs
///
/// # Errors
/// Returns `InvalidCoordinates` for a pair that is not two numbers.
pub fn decode_map_query(query: &str) -> SyndicationResult<Vec<(f64, f64)>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    query
        .split('|')
        .map(|pair| -> SyndicationResult<(f64, f64)> {
            let (lat, lon) = pair
                .split_once(',')
                .ok_or_else(|| SyndicationError::InvalidCoordinates(format!("not a pair: {pair}")))?;
            let parse = |raw: &str| {
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| SyndicationError::InvalidCoordinates(format!("not a number: {raw}")))
            };
            Ok((parse(lat)?, parse(lon)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microformats::{ItemKind, PropertyValue};

    #[test]
    fn query_round_trips() {
        let coordinates = vec![
            GeoCoordinate::new(53.8, -1.5),
            GeoCoordinate::new(51.5, -0.1),
            GeoCoordinate::new(53.8, -1.5),
            GeoCoordinate::new(-33.868_820, 151.209_296),
        ];
        let query = encode_map_query(&coordinates);
        assert!(query.starts_with("53.8,-1.5|51.5,-0.1|"));
        assert!(!query.ends_with('|'));

        let decoded = decode_map_query(&query).unwrap();
        let expected: Vec<_> = coordinates.iter().map(GeoCoordinate::pair).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn empty_list_encodes_to_empty_query() {
        assert_eq!(encode_map_query(&[]), "");
        assert!(decode_map_query("").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_queries() {
        assert!(decode_map_query("1,2|3").is_err());
        assert!(decode_map_query("a,b").is_err());
    }

    #[test]
    fn reads_coordinates_from_items() {
        let item = MicroformatItem::new(ItemKind::Geo)
            .with_property("latitude", PropertyValue::Text(" 53.8 ".into()))
            .with_property("longitude", PropertyValue::Text("-1.5".into()));
        assert_eq!(GeoCoordinate::from_item(&item).unwrap().pair(), (53.8, -1.5));

        let partial = MicroformatItem::new(ItemKind::Geo)
            .with_property("latitude", PropertyValue::Text("1".into()));
        assert!(matches!(
            GeoCoordinate::from_item(&partial),
            Err(SyndicationError::InvalidCoordinates(_))
        ));
    }
}
