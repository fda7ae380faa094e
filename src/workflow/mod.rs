pub mod controller;
pub mod session;
pub mod view;

pub use controller::{
    interpret_response, LoanController, Phase, RetryOutcome, SubmitOutcome, MIN_REQUEST_CHARS,
};
pub use session::SessionState;
pub use view::{ErrorView, PageView};
