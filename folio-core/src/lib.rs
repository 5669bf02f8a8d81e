//! folio-core: data model and pure parsing utilities for brokerage statement analysis.

pub mod date;
pub mod normalize;
pub mod number;
pub mod types;

pub use date::parse_datetime;
pub use normalize::{NormalizeOptions, normalize};
pub use number::parse_number;
pub use types::{
    AccountField, AccountSummary, CashflowEntry, NormalizedData, NormalizedTrade, RawAccount,
    RawStatement, RawTrade, TradeSide,
};
