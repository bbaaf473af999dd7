/*
[INPUT]:  Asset URLs (images, models) as returned by the backend
[OUTPUT]: URLs routed through the backend image proxy when the host is a proxied CDN
[POS]:    URL layer - cross-origin workaround for CDN-hosted assets
[UPDATE]: When the CDN domain list or proxy endpoint changes
*/

use url::{Url, form_urlencoded};

use crate::types::GalleryModel;

/// Proxy endpoint path on the backend
pub const DEFAULT_PROXY_PATH: &str = "/api/proxy/image";

/// CDN domains whose assets must go through the proxy
pub const DEFAULT_PROXIED_DOMAINS: [&str; 3] =
    ["*.myqcloud.com", "*.aliyuncs.com", "*.siliconflow.cn"];

/// Rewrites CDN asset URLs to `{proxy_base}?url=<encoded>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageProxy {
    proxy_base: String,
    domains: Vec<String>,
}

impl ImageProxy {
    /// `domains` entries may be written `*.example.com` or `example.com`
    pub fn new(proxy_base: impl Into<String>, domains: &[impl AsRef<str>]) -> Self {
        let domains = domains
            .iter()
            .map(|d| {
                let d = d.as_ref().trim().to_ascii_lowercase();
                d.strip_prefix("*.").map(str::to_string).unwrap_or(d)
            })
            .filter(|d| !d.is_empty())
            .collect();
        Self {
            proxy_base: proxy_base.into(),
            domains,
        }
    }

    /// Proxy on `{api_base}/api/proxy/image` with the default domain list
    pub fn for_api_base(api_base: &str) -> Self {
        let base = format!("{}{}", api_base.trim_end_matches('/'), DEFAULT_PROXY_PATH);
        Self::new(base, &DEFAULT_PROXIED_DOMAINS)
    }

    pub fn proxy_base(&self) -> &str {
        &self.proxy_base
    }

    /// Whether `url` is an absolute URL on a proxied host
    pub fn should_proxy(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            // relative paths and garbage pass through
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    /// Route a URL through the proxy if its host is listed, otherwise return it unchanged
    pub fn rewrite(&self, url: &str) -> String {
        if !self.should_proxy(url) {
            return url.to_string();
        }
        let encoded: String = form_urlencoded::byte_serialize(url.as_bytes()).collect();
        format!("{}?url={}", self.proxy_base, encoded)
    }

    /// Copy of `model` with thumbnail and asset URLs rewritten
    pub fn rewrite_model(&self, model: &GalleryModel) -> GalleryModel {
        GalleryModel {
            thumbnail_url: model.thumbnail_url.as_deref().map(|u| self.rewrite(u)),
            model_url: model.model_url.as_deref().map(|u| self.rewrite(u)),
            ..model.clone()
        }
    }
}
