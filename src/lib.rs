//! Dense rectilinear histogram accumulation.
//!
//! This crate consumes a stream of weighted sample points in an
//! N-dimensional coordinate space and accumulates them into fixed-resolution
//! bins. After accumulation the grid can be normalized (to its peak or to
//! unit mass) and serialized as a linear or log density in either a
//! tab-separated text format or a compact binary format.
//!
//! ## Core Types
//!
//! - [`Binner`] — general N-dimensional accumulator over a [`Lattice`]
//! - [`Projection`] — 2-D accumulator binning two chosen axes of a
//!   higher-dimensional sample space
//! - [`Collector`] — broadcast fan-out of one sample stream to many
//!   independent [`Projection`]s
//!
//! ## Concurrency
//!
//! Accumulation is safe from many threads at once: each bin is an atomic
//! [`Cell`] and every increment is a single indivisible read-modify-write.
//! All other operations (clear, normalize, save) require the caller to
//! quiesce producers first.

mod axis;
mod binner;
mod cell;
mod collector;
mod lattice;
mod projection;
mod save;

pub use axis::Axis;
pub use binner::Binner;
pub use binner::Norm;
pub use cell::Cell;
pub use collector::Collector;
pub use lattice::Lattice;
pub use projection::Projection;
pub use save::Encoding;
pub use save::Scale;
pub use save::read_binary;
pub use save::read_header;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Accumulated bin mass and sample weights.
pub type Weight = f64;

// ============================================================================
// SERIALIZATION PARAMETERS
// ============================================================================
/// Offset below the log of the smallest nonzero bin substituted for empty
/// bins in log-density output, standing in for log(0).
pub const LOG_FLOOR_DROP: f64 = 2.0;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing and Monte Carlo sampling.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

// ============================================================================
// ERRORS
// ============================================================================
/// Everything that can go wrong constructing or serializing a grid.
///
/// Out-of-range sample points are not an error: they are silently dropped
/// by `add`, by design. Degenerate normalization of an all-zero grid is a
/// defined (non-finite) numeric outcome, not an error either.
#[derive(Debug)]
pub enum Error {
    /// Zero bin count or inverted bounds on an axis.
    Geometry { lower: f64, upper: f64, bins: usize },
    /// A projection selects a coordinate beyond the sample dimension.
    Selector { select: usize, dimension: usize },
    /// Mismatched per-axis argument lengths, or zero axes.
    Dimension { expected: usize, observed: usize },
    /// A serialized grid file failed validation on read.
    Format(String),
    /// Underlying file I/O failure; never retried.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Geometry { lower, upper, bins } => {
                write!(f, "degenerate axis: [{}, {}] across {} bins", lower, upper, bins)
            }
            Error::Selector { select, dimension } => {
                write!(f, "axis selector {} exceeds sample dimension {}", select, dimension)
            }
            Error::Dimension { expected, observed } => {
                write!(f, "expected {} axes, observed {}", expected, observed)
            }
            Error::Format(what) => {
                write!(f, "malformed grid file: {}", what)
            }
            Error::Io(e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/gridbin.{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
