//! Utility functions for CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use facelog_attendance::LogStore;
use facelog_faceid::FeatureStore;
use facelog_kv::{KVStore, RedbStore};
use tracing::{debug, warn};

use crate::config::{load_config, Config};
use crate::Cli;

/// Gets the configuration with command-line overrides applied.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut cfg = load_config(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        cfg.db_path = Some(PathBuf::from(db));
    }
    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

/// Opens the database, creating it if needed.
pub fn open_backend(cfg: &Config) -> anyhow::Result<Arc<dyn KVStore>> {
    let path = cfg.db_path();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = RedbStore::open(&path).with_context(|| format!("open database {}", path.display()))?;
    Ok(Arc::new(store))
}

pub fn feature_store(cfg: &Config, kv: Arc<dyn KVStore>) -> FeatureStore {
    FeatureStore::new(kv, cfg.dim).with_namespace(cfg.register_namespace.clone())
}

pub fn log_store(cfg: &Config, kv: Arc<dyn KVStore>) -> LogStore {
    LogStore::new(kv).with_list(cfg.log_list.clone())
}

/// Runs a blocking database call on the blocking pool, bounded by `timeout`.
///
/// On timeout the call is abandoned, not cancelled: it may still complete.
pub async fn store_call<T, E, F>(timeout: Duration, what: &str, f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    debug!(what, "store call");
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(joined) => Ok(joined.with_context(|| format!("{what}: task failed"))??),
        Err(_) => {
            warn!(what, timeout = ?timeout, "store call timed out");
            anyhow::bail!("{what}: database did not answer within {timeout:?}")
        }
    }
}

/// Loads a list of embeddings.
///
/// `.jsonl` files hold one JSON array per line; `.json` files hold an array
/// of arrays; anything else is read as YAML.
pub fn load_vectors(path: &str) -> anyhow::Result<Vec<Vec<f32>>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    parse_vectors(&content, path)
}

fn parse_vectors(content: &str, path: &str) -> anyhow::Result<Vec<Vec<f32>>> {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("yaml");

    let result = match ext.to_lowercase().as_str() {
        "jsonl" => content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).with_context(|| format!("{path}:{}", i + 1))
            })
            .collect::<anyhow::Result<Vec<_>>>()?,
        "json" => serde_json::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };

    Ok(result)
}

/// Outputs result as JSON or YAML.
pub fn output_result<T: serde::Serialize>(
    result: &T,
    output_path: Option<&str>,
    as_json: bool,
) -> anyhow::Result<()> {
    let output = if as_json {
        serde_json::to_string_pretty(result)? + "\n"
    } else {
        serde_yaml::to_string(result)?
    };

    match output_path {
        Some(path) => std::fs::write(path, output)?,
        None => print!("{}", output),
    }

    Ok(())
}

/// Prints verbose output if enabled.
pub fn print_verbose(cli: &Cli, msg: &str) {
    if cli.verbose {
        eprintln!("[verbose] {}", msg);
    }
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints error message.
pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m✗\x1b[0m {}", msg);
}

/// Prints info message.
pub fn print_info(msg: &str) {
    eprintln!("\x1b[34mℹ\x1b[0m {}", msg);
}

/// Prints warning message.
pub fn print_warning(msg: &str) {
    eprintln!("\x1b[33m⚠\x1b[0m {}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_json_lines() {
        let v = parse_vectors("[1, 0]\n\n[0.5, 0.5]\n", "s.jsonl").unwrap();
        assert_eq!(v, vec![vec![1.0, 0.0], vec![0.5, 0.5]]);
    }

    #[test]
    fn parse_json_and_yaml() {
        assert_eq!(parse_vectors("[[1, 2]]", "s.json").unwrap(), vec![vec![1.0, 2.0]]);
        assert_eq!(
            parse_vectors("- [1, 2]\n- [3, 4]\n", "s.yaml").unwrap(),
            vec![vec![1.0, 2.0], vec![3.0, 4.0]]
        );
    }

    #[tokio::test]
    async fn store_call_passes_result_through() {
        let v = store_call(Duration::from_secs(5), "load", || Ok::<_, std::io::Error>(7))
            .await
            .unwrap();
        assert_eq!(v, 7);

        let err = store_call(Duration::from_secs(5), "load", || {
            Err::<(), _>(std::io::Error::other("offline"))
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("offline"), "{err}");
    }

    #[tokio::test]
    async fn store_call_times_out() {
        let err = store_call(Duration::from_millis(20), "upsert", || {
            std::thread::sleep(Duration::from_millis(300));
            Ok::<_, std::io::Error>(())
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("upsert: database did not answer"), "{err}");
    }

    #[test]
    fn parse_reports_bad_line() {
        let err = parse_vectors("[1]\nnope\n", "s.jsonl").unwrap_err();
        assert!(err.to_string().contains("s.jsonl:2"), "{err}");
    }
}
