//! # Loan Portal
//!
//! 贷款申请提交客户端：把自由文本申请发送到贷款处理服务，并展示决策结果
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 唯一发出 HTTP 请求的地方
//! - `LoanApi` - 提交申请 / 健康检查能力，测试中可替换
//! - `ReqwestLoanApi` - 基于 reqwest 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，彼此独立
//! - `error_taxonomy` - 后端错误码 → 面向用户的提示信息
//! - `result_renderer` - 处理结果 → 结果视图
//! - `ProgressAnimator` - 纯展示用的阶段进度
//! - `HealthMonitor` - 后端存活探测
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次申请"的完整生命周期
//! - `LoanController` - 校验 → 提交 → 成功/失败分发，持有会话状态
//! - `PageView` / `SessionState` - 控制器对外暴露的状态快照
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/portal` - 终端输入循环、后台任务管理
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{LoanApi, ReqwestLoanApi};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ApplicationResult, LoanRequest};
pub use orchestrator::App;
pub use workflow::{LoanController, SubmitOutcome};
