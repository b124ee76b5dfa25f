//! 配置管理
//!
//! 分层加载：内置默认值 -> config.toml -> config.{APP_ENV}.toml -> LEARNHUB_* 环境变量 -> 显式覆盖。

mod loader;
mod structs;

pub use structs::*;
