//! 终端门户 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：启动日志、构建 HTTP 客户端和控制器
//! 2. **后台任务**：周期性健康检查、进度帧和服务状态输出
//! 3. **输入循环**：逐行读取标准输入，普通文本进入草稿，命令交给控制器
//!
//! 提交过程中按 Ctrl-C 会取消本次提交，表单恢复可用。

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::clients::ReqwestLoanApi;
use crate::config::Config;
use crate::orchestrator::command::{Command, HELP};
use crate::services::{HealthStatus, ProgressFrame};
use crate::utils::logging::log_startup;
use crate::workflow::{LoanController, RetryOutcome, SubmitOutcome};

/// 应用主结构
pub struct App {
    config: Config,
    controller: Arc<LoanController<ReqwestLoanApi>>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let api = Arc::new(ReqwestLoanApi::new(&config).context("创建 HTTP 客户端失败")?);
        let controller = Arc::new(LoanController::from_config(api, &config));

        Ok(Self { config, controller })
    }

    pub fn controller(&self) -> &Arc<LoanController<ReqwestLoanApi>> {
        &self.controller
    }

    /// 运行终端输入循环，直到 `/quit` 或标准输入结束
    pub async fn run(&self) -> Result<()> {
        let background = [
            self.controller
                .health()
                .spawn_polling(self.config.health_poll_interval()),
            spawn_progress_printer(self.controller.progress().subscribe()),
            spawn_health_printer(self.controller.health().subscribe()),
        ];

        println!("{}", HELP);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut draft = String::new();

        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                None => {
                    if !draft.is_empty() {
                        draft.push('\n');
                    }
                    draft.push_str(&line);
                }
                Some(Command::Submit) => self.submit(&mut draft).await,
                Some(Command::Retry) => self.retry().await,
                Some(Command::Reset) => {
                    if self.controller.reset() {
                        draft.clear();
                        println!("Nouvelle demande : saisissez le texte puis /submit.");
                    }
                }
                Some(Command::Details) => self.toggle_details(),
                Some(Command::Status) => println!("{}", self.controller.health().status()),
                Some(Command::Help) => println!("{}", HELP),
                Some(Command::Quit) => break,
            }
        }

        for handle in background {
            handle.abort();
        }
        info!("👋 贷款申请客户端已退出");
        Ok(())
    }

    async fn submit(&self, draft: &mut String) {
        match cancellable(self.controller.submit(draft)).await {
            Some(outcome) => {
                if matches!(outcome, SubmitOutcome::Result(_)) {
                    draft.clear();
                }
                print_outcome(&outcome);
            }
            None => println!("Envoi annulé."),
        }
    }

    async fn retry(&self) {
        match cancellable(self.controller.retry()).await {
            Some(RetryOutcome::Submitted(outcome)) => print_outcome(&outcome),
            Some(RetryOutcome::NothingToRetry) => println!("Aucune demande à renvoyer."),
            None => println!("Envoi annulé."),
        }
    }

    fn toggle_details(&self) {
        if self.controller.toggle_analysis().is_none() {
            println!("Aucun résultat affiché.");
            return;
        }
        if let Some(view) = self.controller.page().result {
            println!("\n{}\n", view);
        }
    }
}

/// 等待 future 完成；期间收到 Ctrl-C 则丢弃它并返回 `None`
async fn cancellable<F: Future>(future: F) -> Option<F::Output> {
    tokio::select! {
        output = future => Some(output),
        _ = tokio::signal::ctrl_c() => {
            warn!("⚠️ 用户取消了本次提交");
            None
        }
    }
}

fn print_outcome(outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Result(view) => println!("\n{}\n", view),
        SubmitOutcome::Invalid(view) => println!("\n{}\n", view),
        SubmitOutcome::Error(view) if view.is_retryable() => {
            println!("\n{}\n(/retry pour renvoyer la demande)\n", view)
        }
        SubmitOutcome::Error(view) => println!("\n{}\n", view),
        SubmitOutcome::Busy => println!("Une demande est déjà en cours de traitement."),
    }
}

fn spawn_progress_printer(mut rx: watch::Receiver<Option<ProgressFrame>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let frame = *rx.borrow_and_update();
            if let Some(frame) = frame {
                println!("{}", frame);
            }
        }
    })
}

/// 只在状态真正变化时输出
fn spawn_health_printer(mut rx: watch::Receiver<HealthStatus>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = *rx.borrow_and_update();
        while rx.changed().await.is_ok() {
            let status = *rx.borrow_and_update();
            if status != last {
                println!("{}", status);
                last = status;
            }
        }
    })
}
