//! JSONL storage: one line per package.
//!
//! Blank lines and lines starting with `#` are skipped, so extracted
//! metadata can be annotated by hand.

use propagate_kernel::Package;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read packages from a JSONL reader.
pub fn read_packages(reader: impl BufRead) -> Result<Vec<Package>, MetaError> {
    let mut packages = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| MetaError::Io(line_no + 1, e.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let package: Package = serde_json::from_str(trimmed)
            .map_err(|e| MetaError::Parse(line_no + 1, e.to_string()))?;
        if package.path.trim().is_empty() || package.name.trim().is_empty() {
            return Err(MetaError::Parse(
                line_no + 1,
                "package path and name must be non-empty".to_string(),
            ));
        }
        packages.push(package);
    }
    Ok(packages)
}

/// Read packages from a JSONL file path.
pub fn read_packages_from_path(path: impl AsRef<Path>) -> Result<Vec<Package>, MetaError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| MetaError::Io(0, format!("{}: {e}", path.display())))?;
    validate_metadata_bytes(path, &bytes)?;
    read_packages(BufReader::new(bytes.as_slice()))
}

fn validate_metadata_bytes(path: &Path, bytes: &[u8]) -> Result<(), MetaError> {
    if bytes.contains(&0) {
        return Err(MetaError::Corrupt(format!(
            "{}: contains NUL byte(s)",
            path.display()
        )));
    }
    if std::str::from_utf8(bytes).is_err() {
        return Err(MetaError::Corrupt(format!(
            "{}: contains non-UTF-8 byte sequence(s)",
            path.display()
        )));
    }
    Ok(())
}

/// Errors from metadata file operations.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    #[error("line {0}: I/O error: {1}")]
    Io(usize, String),

    #[error("line {0}: parse error: {1}")]
    Parse(usize, String),

    #[error("corrupted metadata: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use propagate_kernel::TypeKind;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "propagate-meta-{prefix}-{}-{unique}.jsonl",
            std::process::id()
        ))
    }

    #[test]
    fn reads_tagged_type_kinds() {
        let input = r#"
# io subset
{"path":"io","name":"io","types":[{"name":"Closer","kind":"interface","methods":[{"name":"Close","results":[{"type":"error"}]}]},{"name":"SeekWhence","kind":"other"}]}

{"path":"example.com/w","name":"w","types":[{"name":"wrapper","kind":"struct","fields":[{"type":"io.Closer","embedded":true}],"declaredMethods":["Close"]}]}
"#;
        let packages = read_packages(input.as_bytes()).expect("metadata should parse");
        assert_eq!(packages.len(), 2);

        let closer = packages[0].lookup("Closer").expect("Closer should exist");
        let iface = closer.as_interface().expect("Closer should be an interface");
        assert_eq!(iface.methods[0].results[0].ty, "error");
        assert_eq!(packages[0].lookup("SeekWhence").map(|t| &t.kind), Some(&TypeKind::Other));

        let wrapper = packages[1].lookup("wrapper").expect("wrapper should exist");
        assert!(wrapper.declares_method("Close"));
        let fields = &wrapper.as_struct().expect("wrapper should be a struct").fields;
        assert_eq!(fields[0].field_name(), Some("Closer"));
    }

    #[test]
    fn parse_errors_carry_line_numbers() {
        let input = "{\"path\":\"io\",\"name\":\"io\"}\n\n{\"path\":\"net\",\n";
        match read_packages(input.as_bytes()) {
            Err(MetaError::Parse(line, _)) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }

        let input = "{\"path\":\"\",\"name\":\"io\"}\n";
        match read_packages(input.as_bytes()) {
            Err(MetaError::Parse(line, message)) => {
                assert_eq!(line, 1);
                assert!(message.contains("non-empty"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn read_packages_from_path_rejects_nul_payload() {
        let path = temp_path("nul");
        fs::write(&path, b"{\"path\":\"io\",\"name\":\"io\"}\n\0garbage")
            .expect("fixture should write");

        match read_packages_from_path(&path) {
            Err(MetaError::Corrupt(message)) => assert!(message.contains("contains NUL")),
            other => panic!("expected corrupt metadata error, got {other:?}"),
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn read_packages_from_path_rejects_non_utf8_payload() {
        let path = temp_path("non-utf8");
        fs::write(&path, [0xff, 0xfe, 0xfd]).expect("fixture should write");

        match read_packages_from_path(&path) {
            Err(MetaError::Corrupt(message)) => assert!(message.contains("non-UTF-8")),
            other => panic!("expected corrupt metadata error, got {other:?}"),
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = temp_path("missing");
        match read_packages_from_path(&path) {
            Err(MetaError::Io(0, message)) => assert!(message.contains("propagate-meta-missing")),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
