//! Slicing configuration

use crate::error::{Error, Result};

/// Default lattice step for welding cap boundary vertices
pub const DEFAULT_WELD_TOLERANCE: f64 = 1e-6;

/// Default per-loop ear-clipping iteration cap
pub const DEFAULT_MAX_CAP_ITERATIONS: usize = 1_000_000;

/// How boundary loops are triangulated into caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapMethod {
    /// Built-in constrained ear clipping
    #[default]
    EarClipping,
    /// The `earcutr` port of mapbox earcut, on the loop projected to the plane
    #[cfg(feature = "polygon-ops")]
    Earcut,
}

/// Configuration for a [`Slicer`](crate::Slicer)
///
/// # Example
///
/// ```
/// use meshslice::{CapMethod, SliceConfig};
///
/// let config = SliceConfig::new()
///     .with_weld_tolerance(1e-4)
///     .with_cap_method(CapMethod::EarClipping);
///
/// assert_eq!(config.weld_tolerance(), 1e-4);
/// assert!(config.cap_sections());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SliceConfig {
    /// Quantization step used as identity for cap boundary vertices
    weld_tolerance: f64,
    /// Iteration cap for one boundary loop
    max_cap_iterations: usize,
    /// Whether cross-sections get capped at all
    cap_sections: bool,
    /// Triangulation backend for caps
    cap_method: CapMethod,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SliceConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self {
            weld_tolerance: DEFAULT_WELD_TOLERANCE,
            max_cap_iterations: DEFAULT_MAX_CAP_ITERATIONS,
            cap_sections: true,
            cap_method: CapMethod::default(),
        }
    }

    /// Set the lattice step for welding boundary vertices
    ///
    /// Two intersection points whose coordinates round to the same multiple
    /// of `tolerance` become one cap vertex.
    pub fn with_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.weld_tolerance = tolerance;
        self
    }

    /// Set the ear-clipping iteration cap per loop
    pub fn with_max_cap_iterations(mut self, iterations: usize) -> Self {
        self.max_cap_iterations = iterations;
        self
    }

    /// Enable or disable capping of the cross-sections
    pub fn with_capping(mut self, enabled: bool) -> Self {
        self.cap_sections = enabled;
        self
    }

    /// Select the cap triangulation backend
    pub fn with_cap_method(mut self, method: CapMethod) -> Self {
        self.cap_method = method;
        self
    }

    /// Lattice step for welding boundary vertices
    pub fn weld_tolerance(&self) -> f64 {
        self.weld_tolerance
    }

    /// Ear-clipping iteration cap per loop
    pub fn max_cap_iterations(&self) -> usize {
        self.max_cap_iterations
    }

    /// Whether cross-sections get capped
    pub fn cap_sections(&self) -> bool {
        self.cap_sections
    }

    /// Cap triangulation backend
    pub fn cap_method(&self) -> CapMethod {
        self.cap_method
    }

    /// Check that every setting is in range
    pub fn validate(&self) -> Result<()> {
        if !self.weld_tolerance.is_finite() || self.weld_tolerance <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "weld tolerance must be finite and positive, got {}",
                self.weld_tolerance
            )));
        }
        if self.max_cap_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max cap iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
