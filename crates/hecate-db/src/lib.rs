mod community_ops;
mod migration_ops;
mod paginate;
mod post_ops;
mod tables;

use std::io;
use std::path::{Path, PathBuf};

use redb_bincode::{ReadTransaction, ReadableTable as _, WriteTransaction};
use snafu::{Location, ResultExt as _, Snafu};
use tokio::task::JoinError;
use tracing::{debug, instrument};

pub use self::tables::*;

const LOG_TARGET: &str = "hecate::db";

pub const DB_FILE_NAME: &str = "hecate.redb";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DbError {
    Database {
        source: redb::DatabaseError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(transparent)]
    Table {
        source: redb::TableError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(transparent)]
    Storage {
        source: redb::StorageError,
        #[snafu(implicit)]
        location: Location,
    },
    Transaction {
        source: redb::TransactionError,
        #[snafu(implicit)]
        location: Location,
    },
    Commit {
        source: redb::CommitError,
        #[snafu(implicit)]
        location: Location,
    },
    DbVersionTooHigh {
        db_ver: u64,
        code_ver: u64,
        #[snafu(implicit)]
        location: Location,
    },
    Join {
        source: JoinError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Post references unknown community {community}"))]
    UnknownCommunity {
        community: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Invalid record: {reason}"))]
    InvalidRecord {
        reason: &'static str,
        #[snafu(implicit)]
        location: Location,
    },
    Overflow,
}
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Local store of communities and their posts
///
/// Every write is an upsert keyed by a natural key (community name, post
/// id), so re-ingesting the same content never creates duplicates.
#[derive(Debug)]
pub struct Database {
    inner: redb_bincode::Database,
}

impl Database {
    pub async fn mk_db_path(data_dir: &Path) -> std::result::Result<PathBuf, io::Error> {
        tokio::fs::create_dir_all(&data_dir).await?;
        Ok(data_dir.join(DB_FILE_NAME))
    }

    #[instrument(skip_all)]
    pub async fn open(path: impl Into<PathBuf>) -> DbResult<Database> {
        let path = path.into();
        debug!(target: LOG_TARGET, path = %path.display(), "Opening database");
        let inner = tokio::task::spawn_blocking(move || redb_bincode::Database::create(path))
            .await
            .context(JoinSnafu)?
            .context(DatabaseSnafu)?;

        Self::write_with_inner(&inner, |tx| {
            Self::init_tables_tx(tx)?;
            Self::handle_db_ver_migrations(tx)?;
            Ok(())
        })
        .await?;

        Ok(Self { inner })
    }

    pub async fn write_with_inner<T>(
        inner: &redb_bincode::Database,
        f: impl FnOnce(&'_ WriteTransaction) -> DbResult<T>,
    ) -> DbResult<T> {
        tokio::task::block_in_place(|| {
            let dbtx = inner.begin_write().context(TransactionSnafu)?;
            let res = f(&dbtx)?;

            dbtx.commit().context(CommitSnafu)?;

            Ok(res)
        })
    }

    /// Run `f` in a write transaction, committing only if it returns `Ok`
    pub async fn write_with<T>(
        &self,
        f: impl FnOnce(&'_ WriteTransaction) -> DbResult<T>,
    ) -> DbResult<T> {
        Self::write_with_inner(&self.inner, f).await
    }

    pub async fn read_with_inner<T>(
        inner: &redb_bincode::Database,
        f: impl FnOnce(&'_ ReadTransaction) -> DbResult<T>,
    ) -> DbResult<T> {
        tokio::task::block_in_place(|| {
            let dbtx = inner.begin_read().context(TransactionSnafu)?;

            f(&dbtx)
        })
    }

    pub async fn read_with<T>(
        &self,
        f: impl FnOnce(&'_ ReadTransaction) -> DbResult<T>,
    ) -> DbResult<T> {
        Self::read_with_inner(&self.inner, f).await
    }

    pub(crate) fn next_id_tx(ids_seq_t: &mut ids_seq::Table) -> DbResult<u64> {
        let next = ids_seq_t.get(&())?.map(|g| g.value()).unwrap_or_default();
        let following = next.checked_add(1).ok_or(DbError::Overflow)?;
        ids_seq_t.insert(&(), &following)?;
        Ok(next)
    }
}
