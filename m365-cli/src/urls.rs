//! SharePoint URL helpers
//!
//! Resolves the site-relative or server-relative paths given on the command
//! line against the site URL.

use anyhow::{Context, Result, bail};
use percent_encoding::percent_decode_str;
use url::Url;

/// Domains SharePoint Online is served from
const SHAREPOINT_DOMAINS: [&str; 4] = [
    ".sharepoint.com",
    ".sharepoint.us",
    ".sharepoint.de",
    ".sharepoint.cn",
];

/// Check whether `input` is the URL of a SharePoint Online site
pub fn is_valid_sharepoint_url(input: &str) -> bool {
    let Ok(url) = Url::parse(input) else {
        return false;
    };

    if url.scheme() != "https" && url.scheme() != "http" {
        return false;
    }

    url.host_str().is_some_and(|host| {
        let host = host.to_lowercase();
        SHAREPOINT_DOMAINS.iter().any(|domain| host.ends_with(domain))
    })
}

/// A parsed site URL
#[derive(Debug, Clone)]
pub struct SiteUrl {
    url: Url,
}

impl SiteUrl {
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input).with_context(|| format!("'{}' is not a valid URL", input))?;

        if url.cannot_be_a_base() || url.host_str().is_none() {
            bail!("'{}' is not a valid site URL", input);
        }

        Ok(Self { url })
    }

    /// URL of the site as given, without trailing slash
    pub fn as_str(&self) -> &str {
        self.url.as_str().trim_end_matches('/')
    }

    /// Scheme and host of the tenant, e.g. `https://contoso.sharepoint.com`
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// Server-relative path of the site, empty for the root site
    pub fn path(&self) -> String {
        decode(self.url.path().trim_end_matches('/'))
    }

    /// Resolve a site- or server-relative path to a server-relative one
    ///
    /// Paths that already start with the site path are kept as they are.
    /// Everything else is taken relative to the site.
    pub fn server_relative(&self, path: &str) -> String {
        let site_path = self.path();
        let path = path.trim().trim_end_matches('/');
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        if !site_path.is_empty()
            && path.to_lowercase().starts_with(&site_path.to_lowercase())
            && matches!(path.as_bytes().get(site_path.len()), None | Some(b'/'))
        {
            return path;
        }

        format!("{}{}", site_path, path)
    }

    /// Resolve a destination to a server-relative path on the tenant
    ///
    /// Unlike `server_relative`, a path starting with `/` is taken as is so
    /// that folders of other sites can be addressed. Absolute URLs must be on
    /// the same tenant. Other paths are relative to the site.
    pub fn tenant_relative(&self, path: &str) -> Result<String> {
        if let Ok(url) = Url::parse(path.trim()) {
            if url.origin() != self.url.origin() {
                bail!("'{}' is not on the tenant {}", path, self.origin());
            }
            return Ok(decode(url.path().trim_end_matches('/')));
        }

        let trimmed = path.trim().trim_end_matches('/');
        if trimmed.starts_with('/') {
            return Ok(trimmed.to_string());
        }

        Ok(self.server_relative(trimmed))
    }

    /// Absolute URL of a server-relative path on the tenant
    pub fn on_tenant(&self, server_relative: &str) -> String {
        format!("{}{}", self.origin(), server_relative)
    }
}

/// Last segment of a path, e.g. the folder name of `/sites/team/Docs/Reports`
pub fn leaf_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

fn decode(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}
