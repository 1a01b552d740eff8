pub mod http;
pub mod reporting;
