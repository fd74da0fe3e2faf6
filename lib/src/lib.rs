//! Time-series downsampling for chart rendering.
//!
//! Reduces ordered, timestamped samples to a bounded number of points while
//! keeping the peaks and valleys a reader would notice:
//!
//! - [`lttb`](fn@lttb): largest-triangle-three-buckets over one series.
//! - [`lttb_multi`]: LTTB over several related series, aligned on a shared
//!   timestamp grid so they stay comparable on one chart.
//! - [`min_max`]: cheaper per-bucket extrema.
//!
//! All samplers are pure: they borrow their input and return a new vector of
//! references into it.

pub mod bucket;
mod config;
mod error;
mod lttb;
mod minmax;
mod multi;
mod sample;
pub mod triangle;

pub use config::*;
pub use error::*;
pub use lttb::lttb;
pub use minmax::*;
pub use multi::*;
pub use sample::*;
