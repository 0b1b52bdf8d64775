use thiserror::Error;

/// Top-level error type for the marble ramp compiler.
#[derive(Debug, Error)]
pub enum MarbleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Numerical(#[from] NumericalError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Invalid parameters detected while setting up a build.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("eccentricity must be 0 <= e < 1, got {0}")]
    Eccentricity(f64),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("angle breakpoints must be a non-empty list sorted by time")]
    Breakpoints,

    #[error("post radius {post_radius} is too narrow for tube radius {tube_radius}, wall {wall_thickness}")]
    PostRadius {
        post_radius: f64,
        tube_radius: f64,
        wall_thickness: f64,
    },

    #[error("cannot parse {what} from {input:?}")]
    Parse { what: &'static str, input: String },
}

/// The centerline or a requested constraint is infeasible as specified.
#[derive(Debug, Error)]
pub enum NumericalError {
    #[error("heading is undefined at time step {t}: both derivative components are zero")]
    ZeroDerivative { t: f64 },

    #[error("kink from {start} to {end} has identical headings; straight replacement is not implemented")]
    StraightKink { start: f64, end: f64 },

    #[error("even a 45 degree slope cannot drop {separation} between {start} and {end}")]
    UnreachableSeparation { start: f64, end: f64, separation: f64 },

    #[error("degenerate path: {0}")]
    Degenerate(String),
}

/// A curve or interval was used outside of its valid domain.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("time step {t} is out of range [{min}, {max}]")]
    OutOfRange { t: f64, min: f64, max: f64 },

    #[error("empty interval [{start}, {end}]")]
    EmptyInterval { start: usize, end: usize },
}

/// Convenience type alias for results using [`MarbleError`].
pub type Result<T> = std::result::Result<T, MarbleError>;
