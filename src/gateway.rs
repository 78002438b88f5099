//! Content-addressed locator resolution.
//!
//! Tracks reference their audio and artwork as `ipfs://<cid>/<path>` locators.
//! Those are only fetchable through an HTTP gateway, so every consumer goes
//! through [`GatewayResolver::resolve`] before touching the network.

use crate::config::GatewaySettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResolver {
    base_url: String,
    scheme: String,
}

impl GatewayResolver {
    pub fn new(base_url: impl Into<String>, scheme: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.is_empty() && !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            scheme: scheme.into(),
        }
    }

    pub fn from_settings(settings: &GatewaySettings) -> Self {
        Self::new(settings.base_url.clone(), settings.scheme.clone())
    }

    /// Map a locator to a fetchable URL.
    ///
    /// Returns an empty string when the locator is missing or does not use the
    /// configured scheme; malformed input never produces an error.
    pub fn resolve(&self, locator: Option<&str>) -> String {
        match locator.and_then(|l| l.strip_prefix(self.scheme.as_str())) {
            Some(rest) if !self.scheme.is_empty() => format!("{}{}", self.base_url, rest),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> GatewayResolver {
        GatewayResolver::new("https://gw.example/ipfs/", "ipfs://")
    }

    #[test]
    fn resolve_strips_scheme_and_prefixes_gateway() {
        assert_eq!(
            resolver().resolve(Some("ipfs://bafyabc/track.mp3")),
            "https://gw.example/ipfs/bafyabc/track.mp3"
        );
    }

    #[test]
    fn resolve_returns_empty_for_missing_or_foreign_locators() {
        let r = resolver();
        assert_eq!(r.resolve(None), "");
        assert_eq!(r.resolve(Some("")), "");
        assert_eq!(r.resolve(Some("https://cdn.example/a.mp3")), "");
        assert_eq!(r.resolve(Some("IPFS://bafyabc")), "");
        assert_eq!(r.resolve(Some("ar://tx")), "");
    }

    #[test]
    fn bare_scheme_resolves_to_gateway_root() {
        assert_eq!(resolver().resolve(Some("ipfs://")), "https://gw.example/ipfs/");
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let r = GatewayResolver::new("https://gw.example/ipfs", "ipfs://");
        assert_eq!(r.resolve(Some("ipfs://cid")), "https://gw.example/ipfs/cid");
    }

    #[test]
    fn from_settings_uses_configured_values() {
        let r = GatewayResolver::from_settings(&GatewaySettings::default());
        assert_eq!(r.resolve(Some("ipfs://cid")), "https://ipfs.io/ipfs/cid");
    }
}
