//! Absolute navigation links for paginated endpoints.

use url::Url;

/// Prefixes route templates such as `/users?page=2` with the public base URL.
#[derive(Debug, Clone)]
pub struct PaginationUriBuilder {
    base: Url,
}

impl PaginationUriBuilder {
    /// Parses the configured base URL. An invalid URL is a configuration
    /// error and should be reported at startup.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self { base })
    }

    /// Base URL the links are built from.
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Builds the absolute URL for `route`, which already contains the target
    /// page in its query string. Any path prefix of the base URL is kept.
    pub fn build_uri(&self, target_page: u64, route: &str) -> Url {
        let (path, query) = match route.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (route, None),
        };

        let prefix = self.base.path().trim_end_matches('/');
        let path = path.trim_start_matches('/');

        let mut url = self.base.clone();
        url.set_path(&format!("{prefix}/{path}"));
        url.set_query(query);
        url.set_fragment(None);

        tracing::trace!(target_page, url = %url, "built pagination link");
        url
    }
}
