use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::import::import_stores;
use crate::ui::messages::{success, warning};
use std::fs;
use std::path::Path;

/// Handle the `import-stores` command: same importer as the HTTP upload,
/// fed from a local file.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::ImportStores { file } = cmd {
        let path = Path::new(file);
        if !path.exists() {
            return Err(AppError::Import(format!("File not found: {}", file)));
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.clone());
        let bytes = fs::read(path)?;

        let pool = DbPool::new(&cfg.database)?;
        let report = pool.with_conn(|conn| import_stores(conn, &filename, &bytes))?;

        success(report.summary());
        for detail in &report.error_details {
            warning(detail);
        }
    }

    Ok(())
}
