use crate::config::FileConfig;
use propagate_kernel::{Package, PackageLoader};
use propagate_meta::MetaStore;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub fn load_config_or_exit(path: Option<&str>) -> FileConfig {
    let Some(path) = path else {
        return FileConfig::default();
    };
    FileConfig::load(Path::new(path)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn load_store_or_exit(paths: &[PathBuf]) -> MetaStore {
    let mut store = MetaStore::new();
    for path in paths {
        if let Err(e) = store.merge_jsonl(path) {
            eprintln!("error: failed to load {}: {e}", path.display());
            std::process::exit(1);
        }
    }
    store
}

pub fn package_or_exit(store: &MetaStore, path: &str) -> Package {
    store.load(path).unwrap_or_else(|e| {
        let sources: Vec<String> = store
            .sources()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        eprintln!("error: {e} (metadata: {})", sources.join(", "));
        std::process::exit(1);
    })
}

pub fn read_text_or_exit(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: failed to read {path}: {e}");
        std::process::exit(1);
    })
}

pub fn print_json_or_exit(payload: &Value) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error: failed to render json: {e}");
            std::process::exit(1);
        }
    }
}

pub fn sha256_hex(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}
