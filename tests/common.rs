#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn flg() -> Command {
    cargo_bin_cmd!("fieldlogger")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_fieldlogger.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    // WAL sidecar files from a previous run
    fs::remove_file(format!("{}-wal", db_path)).ok();
    fs::remove_file(format!("{}-shm", db_path)).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize the DB schema through the CLI (creates tables + admin seed)
pub fn init_db(db_path: &str) {
    flg()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Write a small store catalog CSV and return its path
pub fn write_store_csv(name: &str) -> String {
    let p = temp_out(name, "csv");
    fs::write(
        &p,
        "store_code,store_name,city,address,longitude,latitude\n\
         HZ001,West Lake Store,Hangzhou,100 Wensan Rd,120.1552,30.2741\n\
         HZ002,Xiaoshan Store,Hangzhou,50 Shixin Rd,120.4342,30.2295\n\
         SH001,Xuhui Store,Shanghai,88 Caoxi Rd,121.4737,31.2304\n",
    )
    .expect("write store csv");
    p
}
