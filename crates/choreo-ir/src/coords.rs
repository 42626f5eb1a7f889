use serde::{Deserialize, Serialize};

use choreo_core::{ChoreoError, ChoreoResult, CoordinatesConfig, Point2D, Rect};

/// Data-space rectangle `[x_min, x_max] x [y_min, y_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DataBounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Affine map between a data-space rectangle and a frame-space rectangle.
///
/// Immutable once configured, so it can be shared freely between readers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateSystem {
    bounds: DataBounds,
    frame: Rect,
    invert_y: bool,
}

impl CoordinateSystem {
    /// Map `bounds` onto `frame` with both axes pointing the same way.
    pub fn configure(bounds: DataBounds, frame: Rect) -> ChoreoResult<Self> {
        Self::with_orientation(bounds, frame, false)
    }

    /// Map `bounds` onto `frame`; with `invert_y` the data y axis points up
    /// while frame y points down.
    pub fn with_orientation(bounds: DataBounds, frame: Rect, invert_y: bool) -> ChoreoResult<Self> {
        let finite = [bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(ChoreoError::Configuration(
                "data bounds must be finite".into(),
            ));
        }
        if !(bounds.width() > 0.0) || !(bounds.height() > 0.0) {
            return Err(ChoreoError::Configuration(format!(
                "data bounds must have positive width and height (got {} x {})",
                bounds.width(),
                bounds.height()
            )));
        }
        if !(frame.width() > 0.0) || !(frame.height() > 0.0) || !frame.origin.is_finite() {
            return Err(ChoreoError::Configuration(format!(
                "frame rectangle must have positive width and height (got {} x {})",
                frame.width(),
                frame.height()
            )));
        }
        Ok(Self {
            bounds,
            frame,
            invert_y,
        })
    }

    /// Build from the `[coordinates]` config section for a frame of the given size.
    pub fn from_config(config: &CoordinatesConfig, frame_width: f64, frame_height: f64) -> ChoreoResult<Self> {
        let frame = match config.region {
            Some(r) => Rect::new(r.x, r.y, r.width, r.height),
            None => Rect::new(0.0, 0.0, frame_width, frame_height),
        };
        Self::with_orientation(
            DataBounds::new(config.x_min, config.x_max, config.y_min, config.y_max),
            frame,
            config.invert_y,
        )
    }

    pub fn bounds(&self) -> DataBounds {
        self.bounds
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Frame units per data unit along x and y.
    pub fn scale(&self) -> (f64, f64) {
        (
            self.frame.width() / self.bounds.width(),
            self.frame.height() / self.bounds.height(),
        )
    }

    pub fn to_frame(&self, p: Point2D) -> Point2D {
        let (sx, sy) = self.scale();
        let x = self.frame.left() + (p.x - self.bounds.x_min) * sx;
        let y = if self.invert_y {
            self.frame.top() + (self.bounds.y_max - p.y) * sy
        } else {
            self.frame.top() + (p.y - self.bounds.y_min) * sy
        };
        Point2D::new(x, y)
    }

    pub fn to_data(&self, p: Point2D) -> Point2D {
        let (sx, sy) = self.scale();
        let x = self.bounds.x_min + (p.x - self.frame.left()) / sx;
        let y = if self.invert_y {
            self.bounds.y_max - (p.y - self.frame.top()) / sy
        } else {
            self.bounds.y_min + (p.y - self.frame.top()) / sy
        };
        Point2D::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> CoordinateSystem {
        CoordinateSystem::configure(
            DataBounds::new(0.0, 10.0, 0.0, 10.0),
            Rect::new(0.0, 0.0, 500.0, 500.0),
        )
        .unwrap()
    }

    #[test]
    fn test_center_maps_to_center() {
        let cs = square();
        let p = cs.to_frame(Point2D::new(5.0, 5.0));
        assert!(p.approx_eq(&Point2D::new(250.0, 250.0), 1e-9));
    }

    #[test]
    fn test_zero_width_bounds_rejected() {
        let err = CoordinateSystem::configure(
            DataBounds::new(3.0, 3.0, 0.0, 10.0),
            Rect::new(0.0, 0.0, 500.0, 500.0),
        )
        .unwrap_err();
        assert!(matches!(err, ChoreoError::Configuration(_)));
    }

    #[test]
    fn test_zero_height_bounds_rejected() {
        let err = CoordinateSystem::configure(
            DataBounds::new(0.0, 10.0, 2.0, 2.0),
            Rect::new(0.0, 0.0, 500.0, 500.0),
        )
        .unwrap_err();
        assert!(matches!(err, ChoreoError::Configuration(_)));
    }

    #[test]
    fn test_inverted_axis() {
        let cs = CoordinateSystem::with_orientation(
            DataBounds::new(-3.0, 5.0, -1.0, 12.0),
            Rect::new(100.0, 50.0, 800.0, 650.0),
            true,
        )
        .unwrap();
        // data y_max sits at the top of the region
        let top = cs.to_frame(Point2D::new(-3.0, 12.0));
        assert!(top.approx_eq(&Point2D::new(100.0, 50.0), 1e-9));
        let bottom = cs.to_frame(Point2D::new(5.0, -1.0));
        assert!(bottom.approx_eq(&Point2D::new(900.0, 700.0), 1e-9));
    }

    #[test]
    fn test_roundtrip_within_bounds() {
        let systems = [
            square(),
            CoordinateSystem::with_orientation(
                DataBounds::new(-3.0, 5.0, -1.0, 12.0),
                Rect::new(40.0, 60.0, 640.0, 360.0),
                true,
            )
            .unwrap(),
        ];
        for cs in systems {
            let b = cs.bounds();
            for i in 0..=10 {
                for j in 0..=10 {
                    let p = Point2D::new(
                        b.x_min + b.width() * i as f64 / 10.0,
                        b.y_min + b.height() * j as f64 / 10.0,
                    );
                    let back = cs.to_data(cs.to_frame(p));
                    assert!(back.approx_eq(&p, 1e-9), "{:?} -> {:?}", p, back);
                }
            }
        }
    }

    #[test]
    fn test_from_config_uses_full_frame() {
        let config = CoordinatesConfig {
            x_min: 0.0,
            x_max: 4.0,
            y_min: 0.0,
            y_max: 2.0,
            region: None,
            invert_y: false,
        };
        let cs = CoordinateSystem::from_config(&config, 400.0, 200.0).unwrap();
        assert_eq!(cs.frame(), Rect::new(0.0, 0.0, 400.0, 200.0));
        assert_eq!(cs.scale(), (100.0, 100.0));
    }
}
