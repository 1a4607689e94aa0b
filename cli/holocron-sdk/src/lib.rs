pub mod models;
pub mod utils;

pub use holocron_catalog as catalog;
