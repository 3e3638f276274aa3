//! Software 3D preview of Doom maps for an editor.
//!
//! * [`world`] holds the map / asset side the renderer queries.
//! * [`renderer`] turns a [`renderer::View`] into pixels, or answers
//!   "what is under this pixel" for picking.

pub mod defs;
pub mod renderer;
pub mod world;
