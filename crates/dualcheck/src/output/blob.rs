//! Upload of processed data to blob storage.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::info;

use crate::config::BlobConfig;
use crate::error::{DualcheckError, Result};
use crate::input::Dataset;

use super::{to_csv_bytes, PersistOutcome, Sink};

/// Environment variable holding the SAS token when the config has none.
pub const SAS_ENV_VAR: &str = "DUALCHECK_BLOB_SAS";

/// Uploads CSV bytes as block blobs with a SAS-authorised PUT.
pub struct BlobSink {
    client: Client,
    endpoint: String,
    container: String,
    sas_token: String,
}

impl BlobSink {
    pub fn new(
        endpoint: impl Into<String>,
        container: impl Into<String>,
        sas_token: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| DualcheckError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            container: container.into().trim_matches('/').to_string(),
            sas_token: sas_token.into().trim_start_matches('?').to_string(),
        })
    }

    /// Build from config, reading the token from the environment if the
    /// config does not carry one.
    pub fn from_config(config: &BlobConfig) -> Result<Self> {
        let sas = match &config.sas_token {
            Some(token) => token.clone(),
            None => std::env::var(SAS_ENV_VAR).map_err(|_| {
                DualcheckError::Config(format!(
                    "Blob upload configured but no SAS token given and {} is not set",
                    SAS_ENV_VAR
                ))
            })?,
        };
        Self::new(&config.endpoint, &config.container, sas)
    }

    /// Full request URL for a blob, without the token.
    pub fn blob_url(&self, blob_name: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.container, blob_name)
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        headers.insert("x-ms-blob-type", HeaderValue::from_static("BlockBlob"));
        headers
    }
}

impl Sink for BlobSink {
    fn name(&self) -> &str {
        "blob"
    }

    fn persist(&self, data: &Dataset, file_name: &str) -> Result<PersistOutcome> {
        let bytes = to_csv_bytes(data)?;
        let size = bytes.len();
        let url = self.blob_url(file_name);

        let response = self
            .client
            .put(format!("{}?{}", url, self.sas_token))
            .headers(self.build_headers())
            .body(bytes)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(DualcheckError::Upload(format!(
                "{} rejected upload ({}): {}",
                url, status, error_text
            )));
        }

        info!(url = %url, bytes = size, "uploaded processed data");
        Ok(PersistOutcome {
            sink: self.name().to_string(),
            location: url,
            bytes: size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_url_normalises_parts() {
        let sink = BlobSink::new(
            "https://acct.blob.core.windows.net/",
            "/processed/",
            "?sv=2022&sig=abc",
        )
        .unwrap();
        assert_eq!(
            sink.blob_url("weather_20240101_000000.csv"),
            "https://acct.blob.core.windows.net/processed/weather_20240101_000000.csv"
        );
        assert_eq!(sink.sas_token, "sv=2022&sig=abc");
    }

    #[test]
    fn test_from_config_prefers_explicit_token() {
        let config = BlobConfig {
            endpoint: "https://acct.blob.core.windows.net".into(),
            container: "data".into(),
            sas_token: Some("sig=1".into()),
        };
        let sink = BlobSink::from_config(&config).unwrap();
        assert_eq!(sink.sas_token, "sig=1");
    }
}
