//! Validation of hosted asset URLs.
//!
//! The detector fetches whatever URL the hosting service hands back, so the
//! URL is checked against an allow-list before it leaves the process:
//! - HTTPS only
//! - Host must equal an allowed host or be a subdomain of one
//! - `*` in the allow-list accepts any HTTPS host

use url::Url;

/// Maximum URL length accepted from the hosting service.
const MAX_URL_LENGTH: usize = 2048;

/// Allow-list for hosted asset URLs.
#[derive(Debug, Clone)]
pub struct AssetUrlPolicy {
    allowed_hosts: Vec<String>,
}

impl AssetUrlPolicy {
    pub fn new(allowed_hosts: &[String]) -> Self {
        Self {
            allowed_hosts: allowed_hosts.iter().map(|h| h.to_lowercase()).collect(),
        }
    }

    /// Check a URL, returning the reason it was rejected.
    pub fn check(&self, url: &str) -> Result<(), String> {
        if url.len() > MAX_URL_LENGTH {
            return Err(format!("URL exceeds maximum length of {} characters", MAX_URL_LENGTH));
        }

        let parsed = Url::parse(url.trim()).map_err(|e| format!("Invalid URL format: {}", e))?;

        if parsed.scheme() != "https" {
            return Err(format!("Invalid protocol '{}'. Only HTTPS is allowed.", parsed.scheme()));
        }

        let host = parsed
            .host_str()
            .map(|h| h.to_lowercase())
            .ok_or_else(|| "URL must have a valid host".to_string())?;

        if self.is_host_allowed(&host) {
            Ok(())
        } else {
            Err(format!("Host '{}' is not an allowed asset host", host))
        }
    }

    fn is_host_allowed(&self, host: &str) -> bool {
        self.allowed_hosts.iter().any(|allowed| {
            allowed == "*"
                || host == allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}
