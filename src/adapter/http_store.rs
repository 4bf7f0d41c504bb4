//! HTTP object-store adapter.
//!
//! Writes batch objects with a plain `PUT {endpoint}/{bucket}/{key}` against
//! an S3-compatible gateway, authenticating with basic auth when credentials
//! are configured. Full request signing belongs to an external storage
//! client implementing [`ObjectStore`] directly.

use crate::config::StorageCredentials;
use crate::error::StoreError;
use crate::port::ObjectStore;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
}

impl HttpObjectStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            access_key_id: None,
            secret_access_key: None,
        }
    }

    pub fn from_credentials(credentials: &StorageCredentials) -> Self {
        let mut store = Self::new(credentials.endpoint.clone());
        store.access_key_id = credentials.access_key_id.clone();
        store.secret_access_key = credentials.secret_access_key.clone();
        store
    }
}

impl ObjectStore for HttpObjectStore {
    fn put(
        &self,
        bucket: String,
        key: String,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async move {
            let url = format!("{}/{bucket}/{key}", self.endpoint.trim_end_matches('/'));
            let bytes = body.len();

            let mut request = self
                .client
                .put(&url)
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(body);
            if let Some(access_key) = &self.access_key_id {
                request = request.basic_auth(access_key, self.secret_access_key.as_deref());
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(StoreError::Rejected {
                    key,
                    status: status.as_u16(),
                });
            }

            debug!(%bucket, %key, bytes, "Stored log batch object");
            Ok(())
        })
    }
}
