pub mod config;
mod init;
mod install;
mod list;
mod remove;
mod report;
mod search;

pub use init::init;
pub use install::install;
pub use list::list;
pub use remove::remove;
pub use search::search;

pub use config::Config;
