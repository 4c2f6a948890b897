pub mod http;
pub mod session;
pub mod traits;
