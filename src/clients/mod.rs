pub mod loan_api;

pub use loan_api::{ApiResponse, LoanApi, ReqwestLoanApi, APPLY_ENDPOINT, HEALTH_ENDPOINT};
