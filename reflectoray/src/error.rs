/// A scene or trace request that can't be simulated.
///
/// Geometric degeneracies (parallel rays, grazing hits, rays leaving the
/// scene) are never reported through this type, they are regular outcomes
/// of a trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("a scene must contain at least one mirror")]
    NoMirrors,
    #[error("the bounce limit must be a positive integer, got {0}")]
    InvalidBounceLimit(i64),
    #[error("mirror endpoints must be finite and distinct")]
    DegenerateMirror,
}
