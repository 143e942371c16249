use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::foundation::error::{WelcardError, WelcardResult};

const DEFAULT_USER_AGENT: &str = concat!("welcard/", env!("CARGO_PKG_VERSION"));

/// Resolves an image URL to decoded pixels.
///
/// Sources must be `Sync`: the avatar and background loads of one render run concurrently.
pub trait ImageSource: Sync {
    /// Fetch and decode the image at `url`.
    ///
    /// Every failure is reported as [`WelcardError::ImageAcquisition`].
    fn load(&self, url: &str) -> WelcardResult<PreparedImage>;
}

impl<T: ImageSource + ?Sized + Send> ImageSource for Arc<T> {
    fn load(&self, url: &str) -> WelcardResult<PreparedImage> {
        (**self).load(url)
    }
}

impl<T: ImageSource + ?Sized> ImageSource for &T {
    fn load(&self, url: &str) -> WelcardResult<PreparedImage> {
        (**self).load(url)
    }
}

#[derive(Clone, Debug)]
/// Options for [`HttpImageSource`].
pub struct HttpImageSourceOpts {
    /// Whole-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for HttpImageSourceOpts {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Loads `http(s)://` URLs over the network and `file://` URLs from disk.
pub struct HttpImageSource {
    client: reqwest::blocking::Client,
}

impl HttpImageSource {
    /// Build the HTTP client once; it is reused for every load.
    pub fn new(opts: HttpImageSourceOpts) -> WelcardResult<Self> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(opts.user_agent);
        if let Some(timeout) = opts.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            WelcardError::Other(anyhow::Error::new(e).context("build http client"))
        })?;
        Ok(Self { client })
    }

    fn fetch(&self, url: &url::Url) -> Result<Vec<u8>, String> {
        match url.scheme() {
            "http" | "https" => {
                let response = self
                    .client
                    .get(url.as_str())
                    .send()
                    .map_err(|e| e.to_string())?;
                let status = response.status();
                if !status.is_success() {
                    return Err(format!("http status {}", status.as_u16()));
                }
                let body = response.bytes().map_err(|e| e.to_string())?;
                Ok(body.to_vec())
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| "file URL does not name a local path".to_owned())?;
                std::fs::read(&path).map_err(|e| format!("{}: {e}", path.display()))
            }
            other => Err(format!("unsupported URL scheme '{other}'")),
        }
    }
}

impl ImageSource for HttpImageSource {
    #[tracing::instrument(level = "debug", skip(self))]
    fn load(&self, url: &str) -> WelcardResult<PreparedImage> {
        let parsed = url::Url::parse(url).map_err(|e| WelcardError::image(url, e))?;
        let bytes = self
            .fetch(&parsed)
            .map_err(|reason| WelcardError::image(url, reason))?;
        tracing::debug!(bytes = bytes.len(), "fetched image");
        decode_image(&bytes).map_err(|e| WelcardError::image(url, format!("{e:#}")))
    }
}

/// In-memory URL to encoded-bytes map.
#[derive(Clone, Debug, Default)]
pub struct MemoryImageSource {
    images: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryImageSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded image bytes under `url`, replacing any previous entry.
    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(url.into(), Arc::new(bytes));
    }

    /// Builder form of [`MemoryImageSource::insert`].
    pub fn with_image(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }
}

impl ImageSource for MemoryImageSource {
    fn load(&self, url: &str) -> WelcardResult<PreparedImage> {
        let bytes = self
            .images
            .get(url)
            .ok_or_else(|| WelcardError::image(url, "no image registered for this URL"))?;
        decode_image(bytes).map_err(|e| WelcardError::image(url, format!("{e:#}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
