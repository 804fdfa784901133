//! # File I/O Module
//!
//! Handles job and settings files:
//! - **Atomic saves**: write to `.tmp`, fsync, rename so an interrupted save
//!   never leaves a half-written job behind
//! - **Version validation**: jobs from a newer schema are rejected
//! - **Settings discovery**: an explicit `--config` path, else
//!   `./estimate.toml` if present, else built-in defaults
//!
//! ## Example
//!
//! ```rust,no_run
//! use estimate_core::file_io::{load_job, save_job};
//! use estimate_core::job::EstimateJob;
//! use std::path::Path;
//!
//! let job = EstimateJob::new("25-001", "Client", "Preparer", 2);
//! let path = Path::new("25-001.estimate.json");
//!
//! save_job(&job, path).unwrap();
//! let loaded = load_job(path).unwrap();
//! assert_eq!(loaded.meta.job_id, "25-001");
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use semver::Version;

use crate::errors::{CalcError, CalcResult};
use crate::job::{EstimateJob, SCHEMA_VERSION};
use crate::settings::EstimatorSettings;

/// Settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "estimate.toml";

/// Write `contents` to `path` atomically.
///
/// 1. Write to a sibling `.tmp` file
/// 2. Sync to disk (fsync)
/// 3. Rename over `path`
pub fn write_atomic(path: &Path, contents: &[u8]) -> CalcResult<()> {
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(contents).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "file written");
    Ok(())
}

/// `job.estimate.json` → `job.estimate.json.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Save a job with atomic write semantics.
///
/// The modified timestamp is written as-is; call
/// [`EstimateJob::touch`] first when saving an edit.
pub fn save_job(job: &EstimateJob, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(job)?;
    write_atomic(path, json.as_bytes())
}

/// Load a job file.
///
/// # Returns
///
/// * `Ok(EstimateJob)` - Successfully loaded job
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_job(path: &Path) -> CalcResult<EstimateJob> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;

    let job: EstimateJob =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&job.meta.version)?;

    tracing::debug!(path = %path.display(), job_id = %job.meta.job_id, "job loaded");
    Ok(job)
}

/// Validate that a file version is compatible with the current schema.
///
/// Major versions must match; within 0.x the file's minor version must not
/// be newer than ours.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file = Version::parse(file_version.trim()).map_err(|_| mismatch())?;
    let current = Version::parse(SCHEMA_VERSION).map_err(|e| CalcError::Internal {
        message: format!("bad schema version constant: {}", e),
    })?;

    if file.major != current.major {
        return Err(mismatch());
    }
    if current.major == 0 && file.minor > current.minor {
        return Err(mismatch());
    }
    Ok(())
}

/// Load settings from a TOML file.
pub fn load_settings(path: &Path) -> CalcResult<EstimatorSettings> {
    let text = fs::read_to_string(path)
        .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
    EstimatorSettings::from_toml_str(&text, &path.display().to_string())
}

/// Resolve settings: the explicit path if given (must exist), else
/// [`DEFAULT_SETTINGS_FILE`] in `dir` if present, else defaults.
pub fn discover_settings(explicit: Option<&Path>, dir: &Path) -> CalcResult<EstimatorSettings> {
    if let Some(path) = explicit {
        return load_settings(path);
    }

    let candidate = dir.join(DEFAULT_SETTINGS_FILE);
    if candidate.is_file() {
        tracing::debug!(path = %candidate.display(), "using settings file");
        load_settings(&candidate)
    } else {
        Ok(EstimatorSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSetId;
    use std::env::temp_dir;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("estimate_test_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(
            tmp_path_for(Path::new("/jobs/25-001.estimate.json")),
            Path::new("/jobs/25-001.estimate.json.tmp")
        );
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_path("roundtrip.estimate.json");

        let mut job = EstimateJob::new("TEST-001", "Test Client", "Test Preparer", 2);
        job.rule_set = Some(RuleSetId::Original);
        save_job(&job, &path).unwrap();

        let loaded = load_job(&path).unwrap();
        assert_eq!(loaded, job);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_path("atomic.estimate.json");
        let tmp_path = tmp_path_for(&path);

        save_job(&EstimateJob::default(), &path).unwrap();

        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_job(&temp_path("missing.estimate.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_invalid_json() {
        let path = temp_path("invalid.estimate.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_job(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_newer_schema_rejected() {
        let path = temp_path("newer.estimate.json");
        let mut job = EstimateJob::default();
        job.meta.version = "0.2.0".to_string();
        save_job(&job, &path).unwrap();

        let err = load_job(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.0").is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("0.0.9").is_ok());

        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("one").is_err());
        assert!(validate_version("").is_err());
    }

    #[test]
    fn test_settings_discovery() {
        let dir = temp_path("settings_dir");
        fs::create_dir_all(&dir).unwrap();

        // Nothing on disk: defaults
        let settings = discover_settings(None, &dir).unwrap();
        assert_eq!(settings, EstimatorSettings::default());

        // File in the directory is picked up
        fs::write(dir.join(DEFAULT_SETTINGS_FILE), "rule_set = \"original\"\n").unwrap();
        let settings = discover_settings(None, &dir).unwrap();
        assert_eq!(settings.rule_set, RuleSetId::Original);

        // Explicit path must exist
        let err = discover_settings(Some(&dir.join("nope.toml")), &dir).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");

        // Malformed file is a config error
        let bad = dir.join("bad.toml");
        fs::write(&bad, "rule_set = [").unwrap();
        let err = discover_settings(Some(&bad), &dir).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");

        let _ = fs::remove_dir_all(&dir);
    }
}
