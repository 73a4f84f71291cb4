//! Cloudinary asset store: folder creation and signed image uploads.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use url::Url;

use foreman_core::{AssetStore, FolderOutcome};

use crate::error::{RemoteError, Result};
use crate::notion::check_status;
use crate::retry::{RetryPolicy, HTTP_TIMEOUT};

/// Cloudinary API base URL.
pub const CLOUDINARY_API_URL: &str = "https://api.cloudinary.com/v1_1";

/// Root folder used when `CLOUD_ROOT` is unset.
pub const DEFAULT_CLOUD_ROOT: &str = "Project";

/// Credentials and root folder.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder every path is created under.
    pub root: String,
}

impl CloudinaryConfig {
    /// Read `CLOUD_NAME`, `CLOUD_API_KEY`, `CLOUD_API_SECRET` and `CLOUD_ROOT`.
    ///
    /// Returns `None` unless all three credentials are set.
    pub fn from_env() -> Option<Self> {
        let var = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Some(Self {
            cloud_name: var("CLOUD_NAME")?,
            api_key: var("CLOUD_API_KEY")?,
            api_secret: var("CLOUD_API_SECRET")?,
            root: var("CLOUD_ROOT").unwrap_or_else(|| DEFAULT_CLOUD_ROOT.to_string()),
        })
    }

    /// `root/path`, or just `path` with an empty root.
    pub fn full_path(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        let root = self.root.trim_matches('/');
        match (root.is_empty(), path.is_empty()) {
            (true, _) => path.to_string(),
            (false, true) => root.to_string(),
            (false, false) => format!("{root}/{path}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Signature over the sorted `key=value` pairs followed by the API secret.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by_key(|(k, _)| *k);
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cloudinary-backed [`AssetStore`].
pub struct CloudinaryStore {
    config: CloudinaryConfig,
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> Result<Self> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            config,
            client,
            base_url: CLOUDINARY_API_URL.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &CloudinaryConfig {
        &self.config
    }

    /// Admin API URL for a folder, each segment percent-encoded.
    fn folder_url(&self, full_path: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}/folders", self.base_url, self.config.cloud_name))
            .map_err(|e| RemoteError::Config(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::Config("base URL cannot have a path".into()))?
            .extend(full_path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/image/upload", self.base_url, self.config.cloud_name)
    }
}

#[async_trait]
impl AssetStore for CloudinaryStore {
    fn name(&self) -> &str {
        "cloudinary"
    }

    async fn create_folder(&self, path: &str) -> foreman_core::Result<FolderOutcome> {
        let full = self.config.full_path(path);
        let url = &self.folder_url(&full)?;

        let result = self
            .retry
            .run("cloudinary create_folder", move || async move {
                let response = self
                    .client
                    .post(url.clone())
                    .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
                    .send()
                    .await?;
                check_status(response).await.map(|_| ())
            })
            .await;

        match result {
            Ok(()) => {
                info!(folder = %full, "Cloudinary folder created");
                Ok(FolderOutcome::Created)
            }
            Err(RemoteError::Status { code, body })
                if code == 409 || body.to_lowercase().contains("already exists") =>
            {
                debug!(folder = %full, "Cloudinary folder already exists");
                Ok(FolderOutcome::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn upload_image(&self, bytes: Vec<u8>, folder: &str, name: &str) -> foreman_core::Result<String> {
        let folder = self.config.full_path(folder);
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("folder", folder.as_str()),
                ("public_id", name),
                ("timestamp", timestamp.as_str()),
            ],
            &self.config.api_secret,
        );
        let url = &self.upload_url();
        let (bytes, folder_ref, timestamp, signature) = (&bytes, &folder, &timestamp, &signature);

        let uploaded: UploadResponse = self
            .retry
            .run("cloudinary upload", move || async move {
                let file = Part::bytes(bytes.clone()).file_name(format!("{name}.jpg"));
                let form = Form::new()
                    .part("file", file)
                    .text("api_key", self.config.api_key.clone())
                    .text("timestamp", timestamp.clone())
                    .text("folder", folder_ref.clone())
                    .text("public_id", name.to_string())
                    .text("signature", signature.clone())
                    .text("signature_algorithm", "sha256");
                let response = self.client.post(url).multipart(form).send().await?;
                Ok(check_status(response).await?.json::<UploadResponse>().await?)
            })
            .await?;

        info!(folder = %folder, public_id = name, "Image uploaded to Cloudinary");
        Ok(uploaded.secure_url)
    }
}
