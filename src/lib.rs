pub mod collab;
pub mod error;
pub mod export;
pub mod math;
pub mod offset;
pub mod polygon;
pub mod skeleton;

pub use error::{Result, RooflineError};
pub use offset::{OffsetContour, OffsetPolygons2D};
pub use polygon::{OrientationPolicy, PolygonWithHoles};
pub use skeleton::{PruneSkeleton2D, SkeletonGraph, SkeletonOptions, StraightSkeleton2D};
