//! Error taxonomy for rib generation and lofting.

use thiserror::Error;

/// Errors raised while building rib sequences and lofted shapes.
#[derive(Debug, Error)]
pub enum RibloftError {
    /// The plane-intersection envelope could not be determined at a
    /// position. Non-fatal for a rib run; the rib is skipped.
    #[error("no envelope at fraction {fraction}: at least one hull curve missed the plane")]
    UndefinedEnvelope {
        /// Normalized position along the run where the lookup failed.
        fraction: f64,
    },

    /// The edges of a rib do not chain into a single closed or open wire.
    #[error("rib edges do not form a wire")]
    OpenWire,

    /// An end cap could not be built from the boundary wire.
    #[error("cannot build cap face: {0}")]
    UnbuildableFace(String),

    /// Skinning a segment of ribs into a surface failed.
    #[error("loft failed: {0}")]
    LoftFailed(String),

    /// Fewer than two ribs survived generation; nothing can be lofted.
    #[error("need at least 2 ribs to loft, got {0}")]
    EmptyRibSet(usize),

    /// The request is inconsistent and recompute is a no-op.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RibloftError>;
