//! LearnHub 在线学习平台后端
//!
//! - `cache`: 对象缓存（Moka / Redis）
//! - `config`: 分层配置
//! - `entity`: SeaORM 实体
//! - `errors`: 统一错误类型
//! - `middlewares`: JWT、角色与限流中间件
//! - `models`: 请求、响应与领域类型
//! - `routes`: HTTP 路由
//! - `runtime`: 启动与关闭
//! - `services`: 业务逻辑
//! - `storage`: 存储抽象与 SeaORM 实现
//! - `utils`: 提取器、JWT、密码等工具

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
