pub mod alert;
pub mod credits;
pub mod plan;
pub mod stats;
pub mod subscription;
