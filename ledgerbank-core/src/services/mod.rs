//! Service layer - business logic orchestration

mod account;
pub mod validation;

pub use account::{
    AccountService, AccountView, CreateAccountRequest, CreateAccountResponse, TransactionReceipt,
    TransactionRequest,
};
