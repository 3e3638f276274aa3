mod builder;
mod camera;
mod geometry;
mod texture;

pub use geometry::{
    Level, Linedef, LinedefFlags, LinedefId, MapGeometry, Sector, SectorId, Side, Sidedef,
    SidedefId, Thing, ThingId, Vertex, VertexId, point_on_line_side,
};

pub use builder::{LevelBuilder, LevelError};

pub use camera::Camera;

pub use texture::{
    AssetQuery, Colormap, Image, NUM_LIGHT_MAPS, Palette, Pixel, TRANS_PIXEL, TextureBank,
    TextureError, is_null_tex,
};
