use redb_bincode::ReadableTable as _;
use redb_bincode::WriteTransaction;
use tracing::{debug, info};

use crate::{
    Database, DbResult, DbVersionTooHighSnafu, LOG_TARGET, communities, db_version, ids_seq,
    posts, posts_by_community,
};

impl Database {
    pub(crate) fn init_tables_tx(tx: &WriteTransaction) -> DbResult<()> {
        tx.open_table(&db_version::TABLE)?;
        tx.open_table(&ids_seq::TABLE)?;

        tx.open_table(&communities::TABLE)?;
        tx.open_table(&posts::TABLE)?;
        tx.open_table(&posts_by_community::TABLE)?;
        Ok(())
    }

    pub(crate) fn handle_db_ver_migrations(dbtx: &WriteTransaction) -> DbResult<()> {
        const DB_VER: u64 = 0;

        let mut table_db_ver = dbtx.open_table(&db_version::TABLE)?;

        let Some(cur_db_ver) = table_db_ver.get(&())?.map(|g| g.value()) else {
            info!(target: LOG_TARGET, "Initializing new database");
            table_db_ver.insert(&(), &DB_VER)?;

            return Ok(());
        };

        if DB_VER < cur_db_ver {
            return DbVersionTooHighSnafu {
                db_ver: cur_db_ver,
                code_ver: DB_VER,
            }
            .fail();
        }

        debug!(target: LOG_TARGET, db_ver = cur_db_ver, "Db version");

        Ok(())
    }
}
