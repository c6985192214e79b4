pub mod client;
pub mod diagnostics;
