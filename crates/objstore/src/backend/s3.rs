//! Amazon S3 backend.
//!
//! The SDK is async; callers of this crate are not. The store owns a
//! current-thread tokio runtime and blocks on every call, so the async
//! machinery never leaks past this module. Every call runs under a
//! 10-second deadline.

use std::collections::BTreeMap;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::runtime::{Builder, Runtime};

use crate::error::{Error, Result};
use crate::{ObjectMeta, ObjectStore};

const CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Object store backed by a single S3 bucket.
pub struct S3Store {
    bucket: String,
    client: Client,
    runtime: Runtime,
}

impl S3Store {
    /// Build a store for `bucket` in `region` using the default AWS
    /// credential chain.
    pub fn new(bucket: &str, region: &str) -> Result<Self> {
        if bucket.is_empty() {
            return Err(Error::Backend("bucket must not be empty".to_string()));
        }

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Backend(format!("build tokio runtime: {e}")))?;

        let config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.to_string()))
                .load(),
        );

        Ok(Self {
            bucket: bucket.to_string(),
            client: Client::new(&config),
            runtime,
        })
    }

    fn deadline<F, T>(&self, op: &'static str, key: &str, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = T>,
    {
        self.runtime
            .block_on(tokio::time::timeout(CALL_TIMEOUT, fut))
            .map_err(|_| Error::Timeout {
                op,
                key: key.to_string(),
            })
    }
}

impl ObjectStore for S3Store {
    fn put_if_absent(
        &self,
        key: &str,
        body: &[u8],
        metadata: &BTreeMap<String, String>,
    ) -> Result<()> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body.to_vec()))
            .content_type("application/json")
            .set_metadata(Some(metadata.clone().into_iter().collect()))
            .if_none_match("*");

        let result = self.deadline("put", key, request.send())?;
        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                let rendered = DisplayErrorContext(&err).to_string();
                // S3 reports a failed `If-None-Match: *` as 412 PreconditionFailed.
                if rendered.to_lowercase().contains("preconditionfailed") {
                    return Err(Error::AlreadyExists(key.to_string()));
                }
                Err(Error::Backend(format!("put s3://{}/{key}: {rendered}", self.bucket)))
            }
        }
    }

    fn head(&self, key: &str) -> Result<ObjectMeta> {
        let request = self.client.head_object().bucket(&self.bucket).key(key);

        let result = self.deadline("head", key, request.send())?;
        match result {
            Ok(output) => {
                let metadata = output
                    .metadata()
                    .map(|m| {
                        m.iter()
                            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
                            .collect()
                    })
                    .unwrap_or_default();
                Ok(ObjectMeta { metadata })
            }
            Err(err) => {
                if err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false)
                {
                    return Err(Error::NotFound(key.to_string()));
                }
                Err(Error::Backend(format!(
                    "head s3://{}/{key}: {}",
                    self.bucket,
                    DisplayErrorContext(&err)
                )))
            }
        }
    }

    fn delete(&self, key: &str) -> Result<()> {
        let request = self.client.delete_object().bucket(&self.bucket).key(key);

        let result = self.deadline("delete", key, request.send())?;
        result.map(|_| ()).map_err(|err| {
            Error::Backend(format!(
                "delete s3://{}/{key}: {}",
                self.bucket,
                DisplayErrorContext(&err)
            ))
        })
    }
}
