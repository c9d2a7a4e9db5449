pub mod aggregate;
pub mod config;
pub mod plot;
pub mod report;
pub mod result;
pub mod util;
