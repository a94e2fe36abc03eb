pub mod config;
pub mod credentials;
pub mod error;
pub mod server;
pub mod upstream;
pub(crate) mod utils;

pub use error::RelayError;
pub use upstream::Dispatcher;
