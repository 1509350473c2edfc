pub mod config_cmd;
pub mod credits_cmd;
pub mod output;
pub mod renderer;
pub mod selector;
pub mod subscription_cmd;
