use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::backup::BackupLogic;
use crate::db::db_utils::{integrity_check, print_db_info, require_db_file, vacuum};
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check,
        vacuum: do_vacuum,
        info: show_info,
        backup,
    } = cmd
    {
        require_db_file(&cfg.database)?;
        let pool = DbPool::new(&cfg.database)?;

        //
        // 1) MIGRATE
        //
        if *migrate {
            info("Running migrations…");
            pool.with_conn(|conn| {
                run_pending_migrations(conn)?;
                Ok(())
            })?;
            success("Migration completed.");
        }

        //
        // 2) INFO
        //
        if *show_info {
            print_db_info(&pool, &cfg.database)?;
        }

        //
        // 3) CHECK
        //
        if *check {
            info("Running integrity check…");
            if integrity_check(&pool)? {
                success("Integrity check passed.");
            } else {
                error("Integrity check failed.");
            }
        }

        //
        // 4) VACUUM
        //
        if *do_vacuum {
            info("Running VACUUM…");
            vacuum(&pool)?;
            success("Vacuum completed.");
        }

        //
        // 5) BACKUP
        //
        if let Some(dest) = backup {
            let final_path = BackupLogic::backup(cfg, dest)?;
            pool.with_conn(|conn| {
                crate::db::log::audit(
                    conn,
                    "backup",
                    &final_path.to_string_lossy(),
                    "Database snapshot created",
                )
            })?;
        }
    }

    Ok(())
}
