//! Core geometry types and engine configuration.
//!
//! `Position` is a geographic coordinate, `PixelPoint` a projected screen
//! coordinate, and `Bounds` a lat/lng rectangle. `Config` carries the small
//! set of engine tunables and can be loaded from JSON (or TOML with the
//! `toml` feature).

use serde::de::Error;
use serde::{Deserialize, Serialize};

/// A geographic coordinate using a standard system such as WGS 84.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    /// Create a new position.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both coordinates are finite (not NaN or infinite).
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// A projected position on the client display, in pixels at the current zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    /// Create a new pixel point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in lat/lng space.
///
/// Invariant: `min_lat <= max_lat` and `min_lng <= max_lng`. The [`Bounds::new`]
/// constructor normalizes inverted input by swapping the offending pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Bounds covering the entire map.
    pub const FULL_MAP: Bounds = Bounds {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lng: -180.0,
        max_lng: 180.0,
    };

    /// Create bounds, swapping min/max pairs if they arrive inverted.
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        let (min_lat, max_lat) = if min_lat > max_lat {
            (max_lat, min_lat)
        } else {
            (min_lat, max_lat)
        };
        let (min_lng, max_lng) = if min_lng > max_lng {
            (max_lng, min_lng)
        } else {
            (min_lng, max_lng)
        };
        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// Whether all four corners are finite.
    pub fn is_finite(&self) -> bool {
        [self.min_lat, self.max_lat, self.min_lng, self.max_lng]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Inclusive containment test on both axes.
    pub fn contains(&self, position: &Position) -> bool {
        position.lat >= self.min_lat
            && position.lat <= self.max_lat
            && position.lng >= self.min_lng
            && position.lng <= self.max_lng
    }

    /// Pad each axis symmetrically by `ratio` times its extent.
    ///
    /// Used to pre-cluster markers just outside the visible region so small
    /// pans do not make clusters pop in at the edges.
    pub fn extended(&self, ratio: f64) -> Self {
        let lat_buffer = (self.max_lat - self.min_lat).abs() * ratio;
        let lng_buffer = (self.max_lng - self.min_lng).abs() * ratio;
        Self {
            min_lat: self.min_lat - lat_buffer,
            max_lat: self.max_lat + lat_buffer,
            min_lng: self.min_lng - lng_buffer,
            max_lng: self.max_lng + lng_buffer,
        }
    }

    /// Componentwise min/max union with another rectangle.
    pub fn merge(&mut self, other: &Bounds) {
        self.min_lat = self.min_lat.min(other.min_lat);
        self.max_lat = self.max_lat.max(other.max_lat);
        self.min_lng = self.min_lng.min(other.min_lng);
        self.max_lng = self.max_lng.max(other.max_lng);
    }
}

/// Engine configuration.
///
/// Designed to be easily serializable and loadable from JSON or TOML while
/// keeping complexity minimal.
///
/// # Example
///
/// ```rust
/// use gridclust::Config;
///
/// let config = Config::default();
/// assert_eq!(config.size, 166.0);
///
/// let json = r#"{ "size": 120.0, "view_padding": 0.3 }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.view_padding, 0.3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Grid cell edge length in projected pixels.
    #[serde(default = "Config::default_size")]
    pub size: f64,

    /// View padding as a fraction of the viewport extent, applied on each side.
    #[serde(default = "Config::default_view_padding")]
    pub view_padding: f64,

    /// Whether clusters retain the list of their member markers.
    /// Costs memory and time proportional to the population of each view.
    #[serde(default)]
    pub enable_member_list: bool,
}

impl Config {
    const fn default_size() -> f64 {
        166.0
    }

    const fn default_view_padding() -> f64 {
        0.2
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_view_padding(mut self, view_padding: f64) -> Self {
        self.view_padding = view_padding;
        self
    }

    pub fn with_member_list(mut self, enabled: bool) -> Self {
        self.enable_member_list = enabled;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err("Grid cell size must be finite and positive".to_string());
        }

        if !self.view_padding.is_finite() || self.view_padding < 0.0 {
            return Err("View padding must be finite and non-negative".to_string());
        }

        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load configuration from a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a TOML string (requires the `toml` feature).
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size: Self::default_size(),
            view_padding: Self::default_view_padding(),
            enable_member_list: false,
        }
    }
}
