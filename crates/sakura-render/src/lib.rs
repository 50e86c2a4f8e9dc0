//! Sakura Render - interchangeable render backends
//!
//! Two strategies implement the same [`RenderBackend`] contract:
//! - [`RasterBackend`] (primary): a retained CPU raster surface cleared and
//!   repainted every tick at a bounded frame rate
//! - [`NodeBackend`] (alternate): one lightweight host node per particle
//!   with randomized animation parameters baked in at creation, interpolated
//!   by the host's own declarative facilities

pub mod backend;
pub mod instance;
pub mod nodes;
pub mod raster;

pub use backend::{BackendMode, RenderBackend};
pub use instance::ParticleInstance;
pub use nodes::{NodeAnimation, NodeBackend, NodeHost, NodeId, NodeSpec};
pub use raster::RasterBackend;
