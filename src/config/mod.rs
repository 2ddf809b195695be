use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;

pub mod migrate; // use submodule at src/config/migrate.rs

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Primary mapping provider key (Amap-compatible). Empty → provider
    /// disabled, route estimation only.
    #[serde(default)]
    pub amap_key: String,
    /// Secondary mapping provider key (Tencent-compatible).
    #[serde(default)]
    pub tencent_key: String,
    #[serde(default = "default_tencent_daily_limit")]
    pub tencent_daily_limit: u32,
    #[serde(default = "default_search_cache_cap")]
    pub search_cache_cap: usize,
    /// Brand names used by the relevance scorer and the budget heuristics.
    #[serde(default = "default_brands")]
    pub brands: Vec<String>,
    /// Departments a registering auditor may pick from.
    #[serde(default = "default_departments")]
    pub departments: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8081
}
fn default_tencent_daily_limit() -> u32 {
    200
}
fn default_search_cache_cap() -> usize {
    100
}
fn default_brands() -> Vec<String> {
    ["Goodme", "Starbucks", "McDonald's", "KFC", "Pizza Hut"]
        .map(String::from)
        .to_vec()
}
fn default_departments() -> Vec<String> {
    [
        "Audit Group 1",
        "Audit Group 2",
        "Audit Group 3",
        "Audit Group 4",
    ]
    .map(String::from)
    .to_vec()
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            host: default_host(),
            port: default_port(),
            amap_key: String::new(),
            tencent_key: String::new(),
            tencent_daily_limit: default_tencent_daily_limit(),
            search_cache_cap: default_search_cache_cap(),
            brands: default_brands(),
            departments: default_departments(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("fieldlogger")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".fieldlogger")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("fieldlogger.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("fieldlogger.sqlite")
    }

    /// Load configuration from file (or defaults if not found), then apply
    /// environment overrides used in deployment.
    pub fn load() -> Self {
        let path = Self::config_file();

        let mut cfg = if path.exists() {
            let content = fs::read_to_string(&path).expect("❌ Failed to read configuration file");
            serde_yaml::from_str(&content).expect("❌ Failed to parse configuration file")
        } else {
            Config::default()
        };

        cfg.apply_env();
        cfg.database = crate::utils::path::expand_tilde(&cfg.database)
            .to_string_lossy()
            .to_string();
        cfg
    }

    /// Deployment overrides: PORT, FIELDLOGGER_DB, AMAP_API_KEY, TENCENT_API_KEY.
    pub fn apply_env(&mut self) {
        if let Ok(port) = env::var("PORT")
            && let Ok(p) = port.parse::<u16>()
        {
            self.port = p;
        }
        if let Ok(db) = env::var("FIELDLOGGER_DB")
            && !db.is_empty()
        {
            self.database = db;
        }
        if let Ok(key) = env::var("AMAP_API_KEY")
            && !key.is_empty()
        {
            self.amap_key = key;
        }
        if let Ok(key) = env::var("TENCENT_API_KEY")
            && !key.is_empty()
        {
            self.tencent_key = key;
        }
    }

    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> io::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("bad bind addr: {e}")))
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> io::Result<()> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_name {
            let p = std::path::Path::new(&name);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        } else {
            Self::database_file()
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| io::Error::other(format!("serialize config: {e}")))?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(())
    }
}
