use proj4rs::{proj::Proj, transform::transform};

use crate::prelude::{CoreError, CoreResult, MapConfig, Origin, ProjectionMode, Projector};

/// Side length of an MGRS grid square in metres.
const MGRS_SQUARE: f64 = 100_000.0;

/// Node coordinates as written in the map file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: f64,
    pub local_x: Option<f64>,
    pub local_y: Option<f64>,
}

/// Builds the projector matching the configured mode.
pub fn projector_for(config: &MapConfig) -> CoreResult<Box<dyn Projector>> {
    Ok(match config.projection {
        ProjectionMode::Mgrs => Box::new(MgrsProjector::new(config.origin)?),
        ProjectionMode::Utm => Box::new(UtmProjector::new(config.origin)?),
        ProjectionMode::Local => Box::new(LocalProjector),
    })
}

fn utm_zone(lon: f64) -> u32 {
    (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32
}

/// Plain UTM easting/northing in the zone containing the origin.
pub struct UtmProjector {
    from: Proj,
    to: Proj,
}

impl UtmProjector {
    pub fn new(origin: Origin) -> CoreResult<Self> {
        let geographic = "+proj=longlat +datum=WGS84 +no_defs +type=crs";
        let from = Proj::from_proj_string(geographic)
            .map_err(|e| CoreError::Projection(format!("source CRS {geographic}: {e:?}")))?;

        let zone = utm_zone(origin.lon);
        let south = if origin.lat < 0.0 { " +south" } else { "" };
        let utm = format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs +type=crs");
        let to = Proj::from_proj_string(&utm)
            .map_err(|e| CoreError::Projection(format!("target CRS {utm}: {e:?}")))?;

        Ok(Self { from, to })
    }
}

impl Projector for UtmProjector {
    fn forward(&self, point: &GeoPoint) -> CoreResult<[f64; 3]> {
        let mut coord = (point.lon.to_radians(), point.lat.to_radians(), 0.0);
        transform(&self.from, &self.to, &mut coord).map_err(|e| {
            CoreError::Projection(format!("({}, {}): {e:?}", point.lat, point.lon))
        })?;
        Ok([coord.0, coord.1, point.ele])
    }
}

/// UTM coordinates folded into the 100 km MGRS grid square.
pub struct MgrsProjector {
    utm: UtmProjector,
}

impl MgrsProjector {
    pub fn new(origin: Origin) -> CoreResult<Self> {
        Ok(Self {
            utm: UtmProjector::new(origin)?,
        })
    }
}

impl Projector for MgrsProjector {
    fn forward(&self, point: &GeoPoint) -> CoreResult<[f64; 3]> {
        let [x, y, z] = self.utm.forward(point)?;
        Ok([x.rem_euclid(MGRS_SQUARE), y.rem_euclid(MGRS_SQUARE), z])
    }
}

/// Uses the `local_x`/`local_y` tags written by Autoware map tools.
pub struct LocalProjector;

impl Projector for LocalProjector {
    fn forward(&self, point: &GeoPoint) -> CoreResult<[f64; 3]> {
        match (point.local_x, point.local_y) {
            (Some(x), Some(y)) => Ok([x, y, point.ele]),
            _ => Err(CoreError::Projection(format!(
                "node at ({}, {}) has no local_x/local_y tags",
                point.lat, point.lon
            ))),
        }
    }
}
