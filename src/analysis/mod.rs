//! Analysis modules.
//!
//! Filtering and grouping primitives, the derived dashboard views, color
//! scaling for charts and the interactive session built on top of them.

pub mod aggregator;
pub mod scale;
pub mod session;
pub mod views;

pub use aggregator::*;
pub use scale::ColorScale;
pub use session::{run_interactive, DashboardSession};
pub use views::GenderLabels;
