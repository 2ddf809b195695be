use crate::config::Config;
use crate::errors::{AppError, AppResult};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Snapshot the database file to `dest_file`. The extension picks the
    /// format: `.zip`, `.tar.gz`/`.tgz`, anything else is a plain copy.
    pub fn backup(cfg: &Config, dest_file: &str) -> AppResult<PathBuf> {
        let src = Path::new(&cfg.database);
        let dest = Path::new(dest_file);

        // 1️⃣ Check DB exists
        if !src.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Database not found: {}", src.display()),
            )
            .into());
        }

        // 2️⃣ Ensure destination folder exists
        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let dest_name = dest.to_string_lossy().to_lowercase();

        // 3️⃣ Write snapshot in the requested format
        if dest_name.ends_with(".zip") {
            write_zip(src, dest)?;
        } else if dest_name.ends_with(".tar.gz") || dest_name.ends_with(".tgz") {
            write_tar_gz(src, dest)?;
        } else {
            fs::copy(src, dest)?;
        }

        println!("✅ Backup created: {}", dest.display());
        Ok(dest.to_path_buf())
    }
}

fn write_zip(src: &Path, dest: &Path) -> AppResult<()> {
    let file = fs::File::create(dest)?;
    let mut zip = ZipWriter::new(file);

    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let entry_name = src
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "database.sqlite".to_string());

    zip.start_file(entry_name, options)
        .map_err(std::io::Error::other)?;

    let mut f = fs::File::open(src)?;
    std::io::copy(&mut f, &mut zip)?;
    zip.finish().map_err(std::io::Error::other)?;

    Ok(())
}

fn write_tar_gz(src: &Path, dest: &Path) -> AppResult<()> {
    let file = fs::File::create(dest)?;
    let enc = GzEncoder::new(file, Compression::default());
    let mut archive = tar::Builder::new(enc);

    let entry_name = src
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "database.sqlite".to_string());

    archive
        .append_path_with_name(src, entry_name)
        .map_err(|e| AppError::Other(format!("tar backup failed: {}", e)))?;
    archive
        .into_inner()
        .and_then(|gz| gz.finish())
        .map_err(|e| AppError::Other(format!("tar backup failed: {}", e)))?;

    Ok(())
}
