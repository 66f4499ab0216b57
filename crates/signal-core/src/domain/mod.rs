//! 도메인 모델.

pub mod bar;
pub mod label;
pub mod signal;
pub mod trade;

pub use bar::{bars_from_prices, merge_bars, validate_series, Bar};
pub use label::Label;
pub use signal::{Side, Signal, SignalSide};
pub use trade::{ExitReason, OpenPosition, Trade};
