//! The package metadata seam.
//!
//! Generation never reads Go sources itself; it asks a [`PackageLoader`] for
//! the metadata of any external package it needs (the package declaring an
//! optional interface, or one reached through interface embedding).

use crate::error::LoadError;
use crate::model::Package;
use std::collections::BTreeMap;

/// Provides package metadata by import path.
pub trait PackageLoader {
    fn load(&self, path: &str) -> Result<Package, LoadError>;
}

impl<T: PackageLoader + ?Sized> PackageLoader for &T {
    fn load(&self, path: &str) -> Result<Package, LoadError> {
        (**self).load(path)
    }
}

/// An in-memory loader keyed by import path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    packages: BTreeMap<String, Package>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, package: Package) {
        self.packages.insert(package.path.clone(), package);
    }

    pub fn with(mut self, package: Package) -> Self {
        self.insert(package);
        self
    }
}

impl FromIterator<Package> for MemoryLoader {
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        let mut loader = MemoryLoader::new();
        for package in iter {
            loader.insert(package);
        }
        loader
    }
}

impl PackageLoader for MemoryLoader {
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

    #[test]
    fn missing_package_is_not_found() {
        let loader = MemoryLoader::new().with(Package::new("io", "io"));
        assert!(loader.load("io").is_ok());
        assert_eq!(
            loader.load("net"),
            Err(LoadError::NotFound("net".to_string()))
        );
    }
}
