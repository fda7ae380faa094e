//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 持有配置、HTTP 客户端和控制器，驱动终端交互；不做任何业务判断。
//!
//! ## 层次关系
//!
//! ```text
//! portal (终端输入循环、后台健康检查、进度输出)
//!     ↓
//! workflow::LoanController (一次申请的完整生命周期)
//!     ↓
//! services (错误翻译 / 结果渲染 / 进度动画 / 健康检查)
//!     ↓
//! clients::LoanApi (HTTP)
//! ```

pub mod command;
pub mod portal;

pub use command::Command;
pub use portal::App;
