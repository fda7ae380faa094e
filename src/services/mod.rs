pub mod error_taxonomy;
pub mod health;
pub mod progress;
pub mod result_renderer;

pub use error_taxonomy::{translate, translate_with_fault_code, ErrorCode, ErrorOrigin};
pub use health::{HealthMonitor, HealthStatus};
pub use progress::{ProgressAnimator, ProgressFrame, ProgressSequence, STAGES};
pub use result_renderer::{render, DecisionCategory, ExplanationsView, ResultView};
