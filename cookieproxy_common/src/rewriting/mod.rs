pub mod cookie;
pub mod login;
pub mod request;
pub mod response;
pub mod rewriter;
