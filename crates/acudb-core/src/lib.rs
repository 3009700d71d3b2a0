pub mod error;
pub mod filter;
pub mod geom;
pub mod mesh;
pub mod point;
pub mod renderable;
