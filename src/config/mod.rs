use std::env;
use std::path::PathBuf;

/// Upload handling configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Maximum multipart body size in bytes (default: 100 MB)
    pub max_upload_size: usize,

    /// Directory staging directories are created under; `None` means the
    /// system temp dir
    pub staging_dir: Option<PathBuf>,

    /// Charset assumed when the submitter does not name one (default: UTF-8)
    pub default_charset: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 100 * 1024 * 1024, // 100 MB
            staging_dir: None,
            default_charset: "UTF-8".to_string(),
        }
    }
}

impl UploadConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            staging_dir: env::var("STAGING_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),

            default_charset: env::var("DEFAULT_CHARSET").unwrap_or(default.default_charset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UploadConfig::default();
        assert_eq!(config.max_upload_size, 100 * 1024 * 1024);
        assert!(config.staging_dir.is_none());
        assert_eq!(config.default_charset, "UTF-8");
    }
}
