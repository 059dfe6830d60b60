use crate::polygon::OrientationPolicy;

/// Tuning knobs for straight skeleton construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonOptions {
    /// Coincidence tolerance relative to the bounding-box diagonal of the
    /// input. Default: 1e-9
    pub tolerance: f64,

    /// How misoriented rings are treated when decoding flat input.
    /// Default: [`OrientationPolicy::Reorient`]
    pub orientation: OrientationPolicy,

    /// Maximum number of processed events. If None, derived from the edge
    /// count.
    pub max_events: Option<usize>,
}

impl Default for SkeletonOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            orientation: OrientationPolicy::default(),
            max_events: None,
        }
    }
}

impl SkeletonOptions {
    /// Sets the relative coincidence tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    /// Sets the ring orientation policy.
    #[must_use]
    pub fn with_orientation(mut self, orientation: OrientationPolicy) -> Self {
        self.orientation = orientation;
        self
    }

    /// Caps the number of processed events.
    #[must_use]
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = Some(max_events);
        self
    }

    /// Event budget for a polygon with `edge_count` edges.
    #[must_use]
    pub fn event_budget(&self, edge_count: usize) -> usize {
        self.max_events
            .unwrap_or_else(|| edge_count.saturating_mul(16).saturating_add(256))
    }
}
