pub mod monitor;
pub mod pager;
