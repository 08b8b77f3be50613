mod fetch;
mod lines;
mod manifest;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use corpus_core::{CorpusConfig, SampleSource, SourceKind, SourceLoadError};
use tracing::debug;
use url::Url;

pub use fetch::{HttpFetcher, UrlFetcher};
pub use lines::{decode_text, split_lines};
pub use manifest::{discover_manifests, load_manifest, load_manifests};

pub const IMPLICIT_SEARCH_ORDER: [SourceKind; 3] =
    [SourceKind::Classpath, SourceKind::File, SourceKind::Url];

const CLASSPATH_PREFIX: &str = "classpath:";
const URL_SCHEMES: [&str; 3] = ["http", "https", "file"];

pub trait SampleResolver: Send + Sync {
    fn resolve(&self, source: &SampleSource) -> Result<Vec<String>, SourceLoadError>;
}

#[derive(Clone)]
pub struct SourceResolver {
    resource_roots: Vec<PathBuf>,
    base_dir: Option<PathBuf>,
    fetcher: Arc<dyn UrlFetcher>,
}

impl SourceResolver {
    pub fn new(fetcher: Arc<dyn UrlFetcher>) -> Self {
        Self {
            resource_roots: Vec::new(),
            base_dir: None,
            fetcher,
        }
    }

    pub fn from_config(config: &CorpusConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(config.url_timeout)?);
        let mut resolver = Self::new(fetcher).with_resource_roots(config.resource_roots.clone());
        if let Some(base_dir) = &config.base_dir {
            resolver = resolver.with_base_dir(base_dir);
        }
        Ok(resolver)
    }

    pub fn with_resource_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.resource_roots = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn resource_roots(&self) -> &[PathBuf] {
        &self.resource_roots
    }

    pub fn resolve_locator(
        &self,
        locator: &str,
        kind: Option<SourceKind>,
    ) -> Result<Vec<String>, SourceLoadError> {
        match kind {
            Some(SourceKind::Inline) => Ok(vec![locator.to_string()]),
            Some(SourceKind::File) => self.read_file(locator, locator),
            Some(SourceKind::Classpath) => self.read_resource(locator),
            Some(SourceKind::Url) => self.read_url(locator),
            None => self.search(locator),
        }
    }

    fn search(&self, locator: &str) -> Result<Vec<String>, SourceLoadError> {
        let path = locator.strip_prefix(CLASSPATH_PREFIX).unwrap_or(locator);
        for kind in IMPLICIT_SEARCH_ORDER {
            let attempt = match kind {
                SourceKind::Classpath => self.read_resource(locator),
                SourceKind::File => self.read_file(locator, path),
                SourceKind::Url if has_url_scheme(locator) => self.read_url(locator),
                _ => continue,
            };

            match attempt {
                Ok(lines) => {
                    debug!(locator, kind = %kind, lines = lines.len(), "sample source located");
                    return Ok(lines);
                }
                Err(err) if err.is_not_found() => {
                    debug!(locator, kind = %kind, "sample source not found, trying next kind");
                }
                Err(err) => return Err(err),
            }
        }

        Err(SourceLoadError::not_found(
            locator,
            "not found in resource roots, on the filesystem or as a url",
        ))
    }

    fn read_resource(&self, locator: &str) -> Result<Vec<String>, SourceLoadError> {
        let name = locator
            .strip_prefix(CLASSPATH_PREFIX)
            .unwrap_or(locator)
            .trim_start_matches('/');
        if name.is_empty() {
            return Err(SourceLoadError::malformed(locator, "empty resource name"));
        }

        let found = self
            .resource_roots
            .iter()
            .map(|root| root.join(name))
            .find(|candidate| candidate.is_file());

        match found {
            Some(path) => read_path(locator, &path),
            None => Err(SourceLoadError::not_found(
                locator,
                format!(
                    "no resource root contains `{name}` (searched {})",
                    self.resource_roots.len()
                ),
            )),
        }
    }

    fn read_file(&self, locator: &str, path: &str) -> Result<Vec<String>, SourceLoadError> {
        let path = Path::new(path);
        let path = match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        };
        read_path(locator, &path)
    }

    fn read_url(&self, locator: &str) -> Result<Vec<String>, SourceLoadError> {
        let url = Url::parse(locator).map_err(|err| {
            SourceLoadError::malformed(locator, format!("invalid url: {err}")).with_source(err)
        })?;

        match url.scheme() {
            "http" | "https" => {
                let body = self.fetcher.fetch(locator, &url)?;
                Ok(split_lines(&decode_text(locator, body)?))
            }
            "file" => {
                let path = url.to_file_path().map_err(|()| {
                    SourceLoadError::malformed(locator, "file url does not name a local path")
                })?;
                read_path(locator, &path)
            }
            other => Err(SourceLoadError::malformed(
                locator,
                format!("unsupported url scheme `{other}`"),
            )),
        }
    }
}

impl SampleResolver for SourceResolver {
    fn resolve(&self, source: &SampleSource) -> Result<Vec<String>, SourceLoadError> {
        match source {
            SampleSource::Inline { samples } => Ok(samples.clone()),
            other => self.resolve_locator(other.locator(), other.kind()),
        }
    }
}

fn read_path(locator: &str, path: &Path) -> Result<Vec<String>, SourceLoadError> {
    let bytes = fs::read(path).map_err(|err| SourceLoadError::from_io(locator, err))?;
    Ok(split_lines(&decode_text(locator, bytes)?))
}

// Anything else with a colon, `classpath:` or a drive letter included, is a path.
fn has_url_scheme(locator: &str) -> bool {
    Url::parse(locator)
        .map(|url| URL_SCHEMES.contains(&url.scheme()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use corpus_core::SourceLoadErrorKind;
    use tempfile::TempDir;

    use super::*;

    struct NoNetwork;

    impl UrlFetcher for NoNetwork {
        fn fetch(&self, locator: &str, _url: &Url) -> Result<Vec<u8>, SourceLoadError> {
            Err(SourceLoadError::io_failure(locator, "network disabled in tests"))
        }
    }

    fn resolver(root: &Path) -> SourceResolver {
        SourceResolver::new(Arc::new(NoNetwork))
            .with_resource_roots([root.join("resources")])
            .with_base_dir(root)
    }

    fn fixture() -> TempDir {
        let tmp = TempDir::new().expect("temp dir");
        fs::create_dir_all(tmp.path().join("resources")).expect("resources dir");
        fs::write(tmp.path().join("resources/alarm.txt"), "from resource\n").expect("write");
        fs::write(tmp.path().join("alarm.txt"), "from file\n").expect("write");
        fs::write(tmp.path().join("only_file.txt"), "file only\n").expect("write");
        tmp
    }

    #[test]
    fn implicit_kind_prefers_resource_roots() {
        let tmp = fixture();
        let lines = resolver(tmp.path()).resolve_locator("alarm.txt", None).unwrap();
        assert_eq!(lines, vec!["from resource"]);
    }

    #[test]
    fn implicit_kind_falls_back_to_filesystem() {
        let tmp = fixture();
        let lines = resolver(tmp.path())
            .resolve_locator("only_file.txt", None)
            .unwrap();
        assert_eq!(lines, vec!["file only"]);
    }

    #[test]
    fn explicit_kind_skips_the_search() {
        let tmp = fixture();
        let lines = resolver(tmp.path())
            .resolve_locator("alarm.txt", Some(SourceKind::File))
            .unwrap();
        assert_eq!(lines, vec!["from file"]);

        let err = resolver(tmp.path())
            .resolve_locator("only_file.txt", Some(SourceKind::Classpath))
            .unwrap_err();
        assert_eq!(err.kind(), SourceLoadErrorKind::NotFound);
    }

    #[test]
    fn missing_locator_is_not_found_with_declared_locator() {
        let tmp = fixture();
        let err = resolver(tmp.path())
            .resolve_locator("missing.txt", None)
            .unwrap_err();
        assert_eq!(err.kind(), SourceLoadErrorKind::NotFound);
        assert_eq!(err.locator(), "missing.txt");
    }

    #[test]
    fn colon_locators_without_url_scheme_are_not_found() {
        let tmp = fixture();
        let r = resolver(tmp.path());
        for locator in [
            "classpath:missing.txt",
            "classpath:/samples/missing.txt",
            "alarm:en.txt",
        ] {
            let err = r.resolve_locator(locator, None).unwrap_err();
            assert_eq!(err.kind(), SourceLoadErrorKind::NotFound, "{locator}");
            assert_eq!(err.locator(), locator);
        }
    }

    #[test]
    fn classpath_prefix_is_stripped_for_the_filesystem_step() {
        let tmp = fixture();
        let lines = resolver(tmp.path())
            .resolve_locator("classpath:only_file.txt", None)
            .unwrap();
        assert_eq!(lines, vec!["file only"]);
    }

    #[test]
    fn classpath_prefix_and_leading_slash_are_ignored() {
        let tmp = fixture();
        let lines = resolver(tmp.path())
            .resolve_locator("classpath:/alarm.txt", Some(SourceKind::Classpath))
            .unwrap();
        assert_eq!(lines, vec!["from resource"]);
    }

    #[test]
    fn file_urls_read_from_disk() {
        let tmp = fixture();
        let url = Url::from_file_path(tmp.path().join("only_file.txt")).unwrap();
        let lines = resolver(tmp.path())
            .resolve_locator(url.as_str(), Some(SourceKind::Url))
            .unwrap();
        assert_eq!(lines, vec!["file only"]);
    }

    #[test]
    fn bad_urls_are_malformed() {
        let tmp = fixture();
        let r = resolver(tmp.path());
        let err = r
            .resolve_locator("not a url", Some(SourceKind::Url))
            .unwrap_err();
        assert_eq!(err.kind(), SourceLoadErrorKind::Malformed);

        let err = r
            .resolve_locator("ftp://example.org/a.txt", Some(SourceKind::Url))
            .unwrap_err();
        assert_eq!(err.kind(), SourceLoadErrorKind::Malformed);
    }

    #[test]
    fn non_not_found_errors_stop_the_search() {
        let tmp = fixture();
        fs::write(tmp.path().join("resources/broken.txt"), [0xff, 0xfe]).expect("write");
        fs::write(tmp.path().join("broken.txt"), "valid\n").expect("write");

        let err = resolver(tmp.path())
            .resolve_locator("broken.txt", None)
            .unwrap_err();
        assert_eq!(err.kind(), SourceLoadErrorKind::Malformed);
    }

    #[test]
    fn url_failures_surface_from_implicit_search() {
        let tmp = fixture();
        let err = resolver(tmp.path())
            .resolve_locator("https://example.org/samples.txt", None)
            .unwrap_err();
        assert_eq!(err.kind(), SourceLoadErrorKind::IoFailure);
        assert_eq!(err.locator(), "https://example.org/samples.txt");
    }

    #[test]
    fn inline_sources_pass_through() {
        let tmp = fixture();
        let lines = resolver(tmp.path())
            .resolve(&SampleSource::Inline {
                samples: vec!["a".into(), " b ".into()],
            })
            .unwrap();
        assert_eq!(lines, vec!["a", " b "]);
    }
}
