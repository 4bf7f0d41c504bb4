#![warn(rust_2018_idioms)]

pub mod adapter;
pub mod config;
pub mod diag;
pub mod domain;
pub mod error;
pub mod logger;
pub mod port;
pub mod transport;

pub use config::{LoggerConfig, StorageCredentials, TransportConfig};
pub use domain::{Level, LevelSet, LogValue};
pub use error::{DeliveryFailure, SkylogError, StoreError};
pub use logger::{LocalSink, Logger};
pub use transport::{BufferedTransport, Transport};
