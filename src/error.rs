use thiserror::Error;

/// Top-level error type for roofline operations.
#[derive(Debug, Error)]
pub enum RooflineError {
    #[error(transparent)]
    InvalidPolygon(#[from] PolygonError),

    #[error(transparent)]
    DegenerateSkeleton(#[from] SkeletonError),

    #[error(transparent)]
    OffsetExtraction(#[from] OffsetError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors raised while validating polygon input.
///
/// Always a caller error: the input is malformed, self-intersecting or
/// misoriented. Never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolygonError {
    #[error("ring {ring} has {count} distinct points, at least 3 required")]
    TooFewPoints { ring: usize, count: usize },

    #[error("ring {ring} contains a non-finite coordinate")]
    NonFinite { ring: usize },

    #[error("ring {ring} has zero area")]
    ZeroArea { ring: usize },

    #[error("ring {ring} doubles back on itself at vertex {vertex}")]
    Spike { ring: usize, vertex: usize },

    #[error("ring {ring} intersects itself between edges {first} and {second}")]
    SelfIntersection {
        ring: usize,
        first: usize,
        second: usize,
    },

    #[error("rings {first} and {second} intersect")]
    RingsIntersect { first: usize, second: usize },

    #[error("hole ring {ring} is not strictly inside the outer ring")]
    HoleOutside { ring: usize },

    #[error("hole ring {ring} lies inside hole ring {container}")]
    NestedHole { ring: usize, container: usize },

    #[error("ring {ring} has the wrong orientation (expected {expected})")]
    Orientation { ring: usize, expected: &'static str },

    #[error("invalid polygon encoding: {0}")]
    Encoding(String),
}

/// Errors raised by the wavefront engine when a configuration cannot be
/// resolved within tolerance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkeletonError {
    #[error("degenerate skeleton: {0}")]
    Degenerate(String),

    #[error("event budget of {limit} exhausted before the wavefront collapsed")]
    EventBudgetExhausted { limit: usize },

    #[error("inconsistent skeleton graph: {0}")]
    Inconsistent(String),
}

/// Internal consistency violations found while extracting offset contours.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OffsetError {
    #[error("face {face} has an odd number ({count}) of offset crossings")]
    OddCrossings { face: usize, count: usize },

    #[error("face {face} produced a malformed offset chord")]
    MalformedChord { face: usize },

    #[error("offset loop could not be closed: {0}")]
    OpenLoop(String),
}

/// Errors related to the collaborator operations and flat-array boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`RooflineError`].
pub type Result<T> = std::result::Result<T, RooflineError>;
