pub mod alerts;
pub mod calculator;
pub mod period;

pub use alerts::derive_alerts;
pub use calculator::calculate_integrated_credits;
