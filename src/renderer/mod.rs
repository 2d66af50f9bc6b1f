//! Rendering front-end
//!
//! Turns game snapshots into draw lists and a HUD model. Nothing here mutates
//! the state; a backend only has to rasterize circles, rings and text.

pub mod hud;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use hud::Hud;
pub use scene::Scene;
pub use vertex::Vertex;
