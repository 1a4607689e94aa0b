pub mod category;
pub mod ranking;
pub mod search;
mod session;
pub mod state;
