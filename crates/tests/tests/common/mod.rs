#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use corpus_core::SourceLoadError;
use corpus_sources::{SourceResolver, UrlFetcher};
use tempfile::TempDir;
use url::Url;

pub struct Fixture {
    _tmp: TempDir,
    pub root: PathBuf,
    pub resources: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        let resources = root.join("resources");
        fs::create_dir_all(&resources).expect("create resources dir");

        Self {
            _tmp: tmp,
            root,
            resources,
        }
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, content).expect("write fixture file");
        path
    }

    pub fn resolver(&self, fetcher: StaticFetcher) -> SourceResolver {
        SourceResolver::new(Arc::new(fetcher))
            .with_resource_roots([self.resources.clone()])
            .with_base_dir(&self.root)
    }
}

#[derive(Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }
}

impl UrlFetcher for StaticFetcher {
    fn fetch(&self, locator: &str, url: &Url) -> Result<Vec<u8>, SourceLoadError> {
        self.bodies
            .get(url.as_str())
            .map(|body| body.as_bytes().to_vec())
            .ok_or_else(|| SourceLoadError::not_found(locator, "server answered 404 Not Found"))
    }
}

pub fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
