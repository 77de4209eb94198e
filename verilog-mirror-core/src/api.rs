//! URL construction for the GitHub REST endpoints the pipeline touches.
//!
//! Path segments are percent-encoded individually, so file and directory names
//! containing spaces or `#` survive the round trip.

use reqwest::Url;

use crate::config::ConfigError;
use crate::model::RepoId;

#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    base: Url,
}

impl ApiEndpoints {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base = Url::parse(base_url).map_err(|e| ConfigError::BaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::BaseUrl {
                url: base_url.to_string(),
                message: "URL cannot carry a path".to_string(),
            });
        }
        Ok(Self { base })
    }

    /// `GET /repos/{owner}/{repo}`
    pub fn repository(&self, repo: &RepoId) -> String {
        self.with_segments(["repos", repo.owner.as_str(), repo.name.as_str()])
            .to_string()
    }

    /// `/repos/{owner}/{repo}/contents/{path}`, with `?ref={branch}` when given.
    pub fn contents(&self, owner: &str, repo: &str, path: &str, branch: Option<&str>) -> String {
        let segments = ["repos", owner, repo, "contents"]
            .into_iter()
            .chain(path.split('/').filter(|s| !s.is_empty()));
        let mut url = self.with_segments(segments);
        if let Some(branch) = branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }
        url.to_string()
    }

    /// `GET /search/repositories?q=..&per_page=..&page=..`
    pub fn search(&self, query: &str, per_page: u32, page: u32) -> String {
        let mut url = self.with_segments(["search", "repositories"]);
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &page.to_string());
        url.to_string()
    }

    fn with_segments<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base is rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> ApiEndpoints {
        ApiEndpoints::new("https://api.github.com").unwrap()
    }

    #[test]
    fn builds_repository_url() {
        let repo = RepoId::new("octo", "cores");
        assert_eq!(
            endpoints().repository(&repo),
            "https://api.github.com/repos/octo/cores"
        );
    }

    #[test]
    fn builds_root_and_nested_contents_urls() {
        let api = endpoints();
        assert_eq!(
            api.contents("octo", "cores", "", Some("main")),
            "https://api.github.com/repos/octo/cores/contents?ref=main"
        );
        assert_eq!(
            api.contents("octo", "cores", "rtl/alu", Some("main")),
            "https://api.github.com/repos/octo/cores/contents/rtl/alu?ref=main"
        );
        assert_eq!(
            api.contents("octo", "cores", "rtl/alu.v", None),
            "https://api.github.com/repos/octo/cores/contents/rtl/alu.v"
        );
    }

    #[test]
    fn percent_encodes_path_segments() {
        let url = endpoints().contents("octo", "cores", "my dir/a#b.v", Some("dev"));
        assert_eq!(
            url,
            "https://api.github.com/repos/octo/cores/contents/my%20dir/a%23b.v?ref=dev"
        );
    }

    #[test]
    fn builds_search_url() {
        let url = endpoints().search("language:Verilog", 30, 2);
        assert_eq!(
            url,
            "https://api.github.com/search/repositories?q=language%3AVerilog&per_page=30&page=2"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let api = ApiEndpoints::new("http://127.0.0.1:8080/api/v3/").unwrap();
        assert_eq!(
            api.repository(&RepoId::new("a", "b")),
            "http://127.0.0.1:8080/api/v3/repos/a/b"
        );
    }

    #[test]
    fn rejects_unparseable_base() {
        assert!(ApiEndpoints::new("not a url").is_err());
        assert!(ApiEndpoints::new("mailto:someone@example.com").is_err());
    }
}
