pub mod analyze;
pub mod config_check;
pub mod generate;
pub mod init;
pub mod scrape;
