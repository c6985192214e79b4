pub mod artifacts;
pub mod layout;
