pub mod request;
pub mod response;

pub use request::{extract_client_id, LoanApplicationPayload, LoanRequest, UNKNOWN_CLIENT_ID};
pub use response::{
    ApplicationResult, CreditAssessment, Decision, ErrorEnvelope, Explanations,
    PropertyEvaluation,
};
