//! Object-storage backend capability.
//!
//! The gateway never touches object bytes itself; it asks an [`ObjectStore`]
//! for metadata (HEAD) and for a lazily streamed body (GET, optionally a
//! sub-range). The production implementation talks to an S3-compatible HTTP
//! endpoint. Retry and backoff policy belong to the backend side of this
//! seam and are intentionally absent here.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode, Url, header};
use std::{io, pin::Pin, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::debug;

/// Metadata learned from a HEAD request. Fetched once per request and
/// immutable for its duration.
#[derive(Debug, Clone, Copy)]
pub struct ObjectStat {
    /// Total object size in bytes.
    pub size: u64,
}

/// An inclusive byte interval, already validated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes the interval covers.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Render as an HTTP `Range` header value.
    pub fn to_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// A lazily pulled object body. Each chunk is read from the backend only as
/// the consumer drains the previous one, so memory stays bounded regardless
/// of object size.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("object `{key}` not found")]
    NotFound { key: String },
    #[error("upstream object store failure: {0}")]
    Upstream(#[source] anyhow::Error),
}

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// The two capabilities the gateway needs from its backend.
///
/// Implementations must be safe for concurrent use by many simultaneous
/// requests; the gateway shares one handle across all of them.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch object metadata without the body.
    async fn head_object(&self, key: &str) -> ObjectStoreResult<ObjectStat>;

    /// Fetch the object body, or only `range` when given. The returned
    /// stream is request-scoped; dropping it releases the backend read.
    async fn get_object(
        &self,
        key: &str,
        range: Option<ByteRange>,
    ) -> ObjectStoreResult<ByteStream>;
}

/// Shared, long-lived handle to the backend. Cloned per request.
pub type SharedObjectStore = Arc<dyn ObjectStore>;

/// `ObjectStore` backed by an S3-compatible HTTP endpoint, addressed
/// path-style as `{endpoint}/{bucket}/{key}`.
pub struct HttpObjectStore {
    client: Client,
    endpoint: Url,
    bucket: String,
    access_key_id: String,
    secret_access_key: String,
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

impl HttpObjectStore {
    pub fn new(
        endpoint: &str,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        })
    }

    /// Build the upstream URL for `key`. The key is opaque caller input;
    /// pushing it as a path segment percent-encodes it rather than letting
    /// it restructure the URL.
    fn object_url(&self, key: &str) -> ObjectStoreResult<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ObjectStoreError::Upstream(anyhow::anyhow!(
                    "endpoint `{}` cannot carry a path",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .push(&self.bucket)
            .push(key);
        Ok(url)
    }

    fn classify_status(status: StatusCode, key: &str) -> Option<ObjectStoreError> {
        if status == StatusCode::NOT_FOUND {
            Some(ObjectStoreError::NotFound {
                key: key.to_string(),
            })
        } else if !status.is_success() {
            Some(ObjectStoreError::Upstream(anyhow::anyhow!(
                "unexpected upstream status {status}"
            )))
        } else {
            None
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn head_object(&self, key: &str) -> ObjectStoreResult<ObjectStat> {
        let url = self.object_url(key)?;
        let response = self
            .client
            .head(url)
            .basic_auth(&self.access_key_id, Some(&self.secret_access_key))
            .send()
            .await
            .map_err(|err| ObjectStoreError::Upstream(err.into()))?;

        if let Some(err) = Self::classify_status(response.status(), key) {
            return Err(err);
        }

        let size = response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| {
                ObjectStoreError::Upstream(anyhow::anyhow!(
                    "upstream HEAD response missing Content-Length"
                ))
            })?;

        debug!(key, size, "resolved object size via HEAD");
        Ok(ObjectStat { size })
    }

    async fn get_object(
        &self,
        key: &str,
        range: Option<ByteRange>,
    ) -> ObjectStoreResult<ByteStream> {
        let url = self.object_url(key)?;
        let mut request = self
            .client
            .get(url)
            .basic_auth(&self.access_key_id, Some(&self.secret_access_key));
        if let Some(range) = range {
            request = request.header(header::RANGE, range.to_header_value());
        }

        let response = request
            .send()
            .await
            .map_err(|err| ObjectStoreError::Upstream(err.into()))?;

        if let Some(err) = Self::classify_status(response.status(), key) {
            return Err(err);
        }

        let stream = response
            .bytes_stream()
            .map_err(io::Error::other)
            .boxed();
        Ok(stream)
    }
}

/// In-memory backend used by tests: whole objects held as byte vectors,
/// sliced per the same contract the HTTP store honors.
#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct MemoryObjectStore {
        objects: HashMap<String, Bytes>,
        fail_head: bool,
    }

    impl MemoryObjectStore {
        pub fn with_object(key: impl Into<String>, body: impl Into<Bytes>) -> Self {
            let mut store = Self::default();
            store.objects.insert(key.into(), body.into());
            store
        }

        /// A store whose HEAD always fails with an upstream error.
        pub fn broken() -> Self {
            Self {
                fail_head: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryObjectStore {
        async fn head_object(&self, key: &str) -> ObjectStoreResult<ObjectStat> {
            if self.fail_head {
                return Err(ObjectStoreError::Upstream(anyhow::anyhow!(
                    "simulated backend outage"
                )));
            }
            let body = self.objects.get(key).ok_or_else(|| {
                ObjectStoreError::NotFound {
                    key: key.to_string(),
                }
            })?;
            Ok(ObjectStat {
                size: body.len() as u64,
            })
        }

        async fn get_object(
            &self,
            key: &str,
            range: Option<ByteRange>,
        ) -> ObjectStoreResult<ByteStream> {
            let body = self.objects.get(key).ok_or_else(|| {
                ObjectStoreError::NotFound {
                    key: key.to_string(),
                }
            })?;
            let slice = match range {
                Some(range) => body.slice(range.start as usize..=range.end as usize),
                None => body.clone(),
            };
            Ok(futures::stream::once(async move { Ok(slice) }).boxed())
        }
    }
}
