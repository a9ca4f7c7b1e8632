// Library for tests to access modules

pub mod config;
pub mod detector;
pub mod error;
pub mod logging;
pub mod message;
pub mod models;
pub mod notifier;
pub mod validator_repo;
pub mod worker;
