//! HWReview - 课堂作业与自动代码审查后端服务
//!
//! 基于 Actix Web 构建。教师发布作业，学生提交 GitHub 仓库链接，
//! 教师可触发自动审查：拉取仓库源码、组装提示词、请求生成式文本服务并保存反馈。
//!
//! # 架构
//! - `cache`: 身份缓存（Moka）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证授权与限流中间件
//! - `models`: 数据模型定义
//! - `review`: 代码审查流程（拉取、组装、请求、编排）
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod review;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
