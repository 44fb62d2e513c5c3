//! Response transformation for survey exports.
//!
//! - **resolve**: raw response to display value, with prompt context
//! - **context**: location, launch context and UTC time decoding
//! - **aggregate**: folding rows into survey-instance records
//! - **warning**: recoverable per-row problems

pub mod aggregate;
pub mod context;
pub mod resolve;
pub mod value;
pub mod warning;

pub use aggregate::{
    AggregateError, AggregatedRecord, Aggregation, AggregatorState, RecordKey, ResponseAggregator,
    aggregate,
};
pub use context::Location;
pub use resolve::{
    DisplayValueResolver, PromptContext, ResolveIssue, ResolvedAnswer, Resolution, RowResolution,
    coerce_numeric, resolve,
};
pub use value::DisplayValue;
pub use warning::RowResolutionWarning;
