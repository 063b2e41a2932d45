//! In-memory package index backed by JSONL files.

use crate::jsonl::{MetaError, read_packages_from_path};
use propagate_kernel::{LoadError, Package, PackageLoader};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Package metadata indexed by import path.
#[derive(Debug, Clone, Default)]
pub struct MetaStore {
    packages: BTreeMap<String, Package>,
    sources: Vec<PathBuf>,
}

impl MetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from fully-materialized packages.
    ///
    /// A path seen twice keeps the later record, so a file loaded after
    /// another overrides it package by package.
    pub fn from_packages(packages: Vec<Package>) -> Self {
        let mut store = Self::new();
        for package in packages {
            store.upsert(package);
        }
        store
    }

    /// Load one JSONL file.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self, MetaError> {
        let mut store = Self::new();
        store.merge_jsonl(path)?;
        Ok(store)
    }

    /// Load several JSONL files in order; later files win on conflicts.
    pub fn load_paths<I, P>(paths: I) -> Result<Self, MetaError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut store = Self::new();
        for path in paths {
            store.merge_jsonl(path)?;
        }
        Ok(store)
    }

    /// Add the packages of one more JSONL file.
    pub fn merge_jsonl(&mut self, path: impl AsRef<Path>) -> Result<usize, MetaError> {
        let path = path.as_ref();
        let packages = read_packages_from_path(path)?;
        let count = packages.len();
        for package in packages {
            self.upsert(package);
        }
        self.sources.push(path.to_path_buf());
        info!(path = %path.display(), packages = count, "loaded package metadata");
        Ok(count)
    }

    /// Insert or replace a package by import path.
    ///
    /// Returns the previous record if present.
    pub fn upsert(&mut self, package: Package) -> Option<Package> {
        let previous = self.packages.insert(package.path.clone(), package);
        if let Some(previous) = &previous {
            debug!(path = %previous.path, "package metadata replaced");
        }
        previous
    }

    pub fn package(&self, path: &str) -> Option<&Package> {
        self.packages.get(path)
    }

    /// Import paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Files this store was loaded from, in load order.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageLoader for MetaStore {
    fn load(&self, path: &str) -> Result<Package, LoadError> {
        self.packages
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propagate_kernel::{InterfaceType, MethodSig, NamedType};
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "propagate-store-{prefix}-{}-{unique}.jsonl",
            std::process::id()
        ))
    }

    fn closer(result: &str) -> Package {
        Package::new("io", "io").with_type(NamedType::interface(
            "Closer",
            InterfaceType::new(vec![MethodSig::new("Close").unnamed_result(result)]),
        ))
    }

    #[test]
    fn later_records_override_earlier_ones() {
        let store = MetaStore::from_packages(vec![closer("error"), closer("bool")]);
        assert_eq!(store.len(), 1);
        let package = store.load("io").expect("io should load");
        let iface = package
            .lookup("Closer")
            .and_then(NamedType::as_interface)
            .expect("Closer should be an interface");
        assert_eq!(iface.methods[0].results[0].ty, "bool");
    }

    #[test]
    fn missing_package_is_not_found() {
        let store = MetaStore::new();
        assert!(store.is_empty());
        assert_eq!(
            store.load("net"),
            Err(LoadError::NotFound("net".to_string()))
        );
    }

    #[test]
    fn load_paths_merges_in_order() {
        let first = temp_path("first");
        let second = temp_path("second");
        fs::write(
            &first,
            "{\"path\":\"io\",\"name\":\"io\"}\n{\"path\":\"net\",\"name\":\"net\"}\n",
        )
        .expect("fixture should write");
        fs::write(&second, "{\"path\":\"io\",\"name\":\"iox\"}\n").expect("fixture should write");

        let store = MetaStore::load_paths([&first, &second]).expect("both files should load");
        assert_eq!(store.paths().collect::<Vec<_>>(), vec!["io", "net"]);
        assert_eq!(store.package("io").map(|p| p.name.as_str()), Some("iox"));
        assert_eq!(store.sources(), &[first.clone(), second.clone()]);

        let _ = fs::remove_file(first);
        let _ = fs::remove_file(second);
    }

    #[test]
    fn failed_merge_leaves_store_untouched() {
        let good = temp_path("good");
        let bad = temp_path("bad");
        fs::write(&good, "{\"path\":\"io\",\"name\":\"io\"}\n").expect("fixture should write");
        fs::write(&bad, "{\"path\":\"net\",\"name\":\"net\"}\nnot json\n")
            .expect("fixture should write");

        let mut store = MetaStore::load_jsonl(&good).expect("good file should load");
        match store.merge_jsonl(&bad) {
            Err(MetaError::Parse(line, _)) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert_eq!(store.paths().collect::<Vec<_>>(), vec!["io"]);
        assert_eq!(store.sources(), &[good.clone()]);

        let _ = fs::remove_file(good);
        let _ = fs::remove_file(bad);
    }
}
