pub mod config;
pub mod credentials;
pub mod error;
pub mod platform;
pub mod poller;
pub mod report;
pub mod shutdown;

#[cfg(test)]
pub mod test_utils;
