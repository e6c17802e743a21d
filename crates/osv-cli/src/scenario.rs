//! Default harbour-to-field voyage and coordinate argument parsing.

use anyhow::{bail, Context};
use osv_core::Coordinate;

/// A named port → rig voyage with its transit waypoints.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub port: Coordinate,
    pub rig: Coordinate,
    pub waypoints: Vec<Coordinate>,
    pub onsite_minutes: usize,
}

impl Scenario {
    /// Mumbai harbour out to the western offshore field, five days on site.
    pub fn mumbai_high() -> Self {
        Self {
            name: "mumbai-high",
            port: Coordinate::new(18.938507, 72.851778),
            rig: Coordinate::new(19.41667, 71.33333),
            waypoints: vec![
                Coordinate::new(18.914154, 72.859088),
                Coordinate::new(18.876627, 72.853813),
                Coordinate::new(18.828721, 72.813187),
                Coordinate::new(18.871908, 72.596080),
                Coordinate::new(18.898423, 72.478823),
            ],
            onsite_minutes: 5 * 24 * 60,
        }
    }
}

/// Parse `"lat,lon"` in decimal degrees.
pub fn parse_coordinate(text: &str) -> anyhow::Result<Coordinate> {
    let Some((lat, lon)) = text.split_once(',') else {
        bail!("expected \"lat,lon\", got {:?}", text);
    };
    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("invalid latitude in {:?}", text))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .with_context(|| format!("invalid longitude in {:?}", text))?;
    let coordinate = Coordinate::new(lat, lon);
    coordinate.validate()?;
    Ok(coordinate)
}
