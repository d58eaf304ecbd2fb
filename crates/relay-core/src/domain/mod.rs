//! 도메인 타입.

pub mod telemetry;
pub mod views;

pub use telemetry::*;
pub use views::*;
