//! Region Locator - find where named UI regions land in a composed terminal frame.
//!
//! Renderers tag output with invisible markers, the outermost view scans the
//! final frame once before printing it, and pointer handlers look up the
//! recovered bounds by region name.
//!
//! ```ignore
//! use region_locator::{Locator, LocatorConfig};
//!
//! let locator = Locator::start(LocatorConfig::default())?;
//!
//! let frame = format!("{}\n{}", locator.wrap("navbar", "[pipelines]"), body);
//! print!("{}", locator.scan(&frame));
//!
//! // later, on a mouse event
//! if locator.in_bounds("navbar", mouse.column, mouse.row) {
//!     // ...
//! }
//! ```

pub mod area;
pub mod config;
pub mod error;
pub mod locator;
pub mod marker;
pub mod query;
pub mod registry;
pub mod scanner;
pub mod stats;
pub mod store;
pub mod width;
mod worker;

pub use area::{Area, Coord, Role};
pub use config::LocatorConfig;
pub use error::{LocatorError, LocatorResult};
pub use locator::Locator;
pub use marker::Token;
pub use query::Pointer;
pub use registry::RegionTokens;
pub use stats::LocatorStats;
pub use width::{display_width, AnsiWidth, DisplayWidth};
