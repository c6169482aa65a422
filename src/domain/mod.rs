pub mod ai;
pub mod entity;
pub mod geom;
pub mod maze;
pub mod physics;
pub mod tile;
