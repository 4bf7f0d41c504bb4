use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkylogError {
    #[error("Invalid transport configuration: {0}")]
    Config(String),

    #[error("Storage delivery failed: {0}")]
    Delivery(#[from] StoreError),
}

/// Error returned by an [`ObjectStore`](crate::port::ObjectStore) write.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Storage rejected object {key}: HTTP {status}")]
    Rejected { key: String, status: u16 },
}

/// A batch that could not be delivered to storage.
///
/// Emitted on the transport's failure-observation channel. The batch is
/// dropped after this report: delivery is at-most-once, and a failed write
/// is never retried or re-buffered.
#[derive(Debug)]
pub struct DeliveryFailure {
    pub bucket: String,
    pub key: String,
    /// Number of entries in the dropped batch.
    pub entries: usize,
    pub error: StoreError,
}
