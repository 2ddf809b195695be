use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::info;
use crate::web::{AppState, router};
use tracing_subscriber::EnvFilter;

/// Handle the `serve` command: bring up the HTTP server on a dedicated
/// tokio runtime. The rest of the CLI stays synchronous.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Serve { host, port } = cmd {
        let mut cfg = cfg.clone();
        if let Some(host) = host {
            cfg.host = host.clone();
        }
        if let Some(port) = port {
            cfg.port = *port;
        }

        init_tracing();

        // schema first, so a fresh DB file works without a separate `init`
        let pool = DbPool::new(&cfg.database)?;
        pool.with_conn(|conn| init_db(conn))?;

        let addr = cfg.bind_addr()?;
        let state = AppState::new(pool, cfg);
        let app = router(state);

        info(format!("fieldlogger listening on http://{}", addr));

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app)
                .await
                .map_err(|e| AppError::Other(format!("server error: {}", e)))
        })?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));

    // ignore the error when a test harness initializes twice
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
