//! Small collaborators exposed next to the skeleton: a minimum spanning
//! tree over an explicit weighted graph and an oriented bounding box of a
//! 3D point set.

pub mod mst;
pub mod obb;

pub use mst::MinSpanningTree;
pub use obb::{ObbCorners, OrientedBoundingBox3D};
