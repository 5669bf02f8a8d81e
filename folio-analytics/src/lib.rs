//! folio-analytics: performance metrics and categorical aggregations over
//! normalized statement data.

pub mod aggregations;
pub mod metrics;
pub mod xirr;

pub use aggregations::{Aggregations, CategoryTotal, FeeBreakdown, TradeCategory, aggregate};
pub use metrics::{Metrics, compute_metrics};
pub use xirr::xirr;
