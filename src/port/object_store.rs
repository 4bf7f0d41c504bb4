use crate::error::StoreError;
use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;

/// Minimal "put object" capability consumed by buffered transports.
///
/// Authentication, request signing, and transport details belong to the
/// implementation. The trait is dyn-compatible by using boxed futures
/// instead of `impl Future`.
pub trait ObjectStore: Send + Sync {
    fn put(
        &self,
        bucket: String,
        key: String,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;
}
