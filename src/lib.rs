//! Incremental grid-anchored clustering of map markers for interactive
//! viewports.
//!
//! Markers registered with an engine are regrouped into visual clusters on
//! every view change, fast enough to run inside a frame budget on tens of
//! thousands of points. Clusters snap to a fixed pixel grid so repeated
//! passes at the same zoom produce congruent bounds, keeping the display
//! stable while panning.
//!
//! ```rust
//! use gridclust::{Bounds, ClusterEngine, HashCounter, Marker, SphericalMercator, SweepEngine};
//!
//! let mut counter = HashCounter::new();
//! let mut engine = SweepEngine::new();
//! engine.register_marker(Marker::new(48.8566, 2.3522, &mut counter)?);
//! engine.register_marker(Marker::new(48.8570, 2.3530, &mut counter)?);
//!
//! let projector = SphericalMercator::new(5);
//! let clusters = engine.process_view(&Bounds::new(48.0, 49.0, 2.0, 3.0), &projector);
//! assert_eq!(clusters.len(), 1);
//! assert_eq!(clusters[0].population, 2);
//! # Ok::<(), gridclust::GridclustError>(())
//! ```
//!
//! Rendering, icon construction and host-map event wiring are out of scope:
//! the caller supplies a [`Projector`] for the current zoom and consumes the
//! cluster list.

pub mod cluster;
pub mod engine;
pub mod error;
pub mod hash;
pub mod marker;
pub mod projection;
pub mod spatial;
pub mod types;

#[cfg(feature = "sync")]
pub mod sync;

pub use cluster::{CATEGORY_COUNT, Cluster};
pub use engine::{Backend, ClusterEngine, EngineBuilder, SweepEngine, TreeEngine};
pub use error::{GridclustError, Result};
pub use hash::{HashCounter, MAX_HASH_CODE};
pub use marker::Marker;
pub use projection::{FnProjector, Projector, SphericalMercator};
pub use types::{Bounds, Config, PixelPoint, Position};

#[cfg(feature = "sync")]
pub use sync::SyncEngine;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Backend, ClusterEngine, EngineBuilder, SweepEngine, TreeEngine};

    pub use crate::{Cluster, HashCounter, Marker};

    pub use crate::{Bounds, Config, PixelPoint, Position};

    pub use crate::{FnProjector, Projector, SphericalMercator};

    pub use crate::{GridclustError, Result};

    #[cfg(feature = "sync")]
    pub use crate::SyncEngine;
}
