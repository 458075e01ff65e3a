//! Keyed persistent store backed by RocksDB.
//!
//! One store holds every durable record (balances, player profiles) under
//! prefixed string keys, so a settlement can commit all of its effects in a
//! single atomic `WriteBatch`.

use crate::errors::EngineResult;
use rocksdb::{Options, WriteBatch, WriteOptions, DB};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct KeyedStore {
    db: Arc<DB>,
    sync_writes: bool,
}

impl KeyedStore {
    pub fn open<P: AsRef<Path>>(path: P, sync_writes: bool) -> EngineResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(32 * 1024 * 1024);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DB::open(&opts, path)?;
        Ok(Self {
            db: Arc::new(db),
            sync_writes,
        })
    }

    fn write_opts(&self) -> WriteOptions {
        let mut opts = WriteOptions::default();
        opts.set_sync(self.sync_writes);
        opts
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> EngineResult<Option<T>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> EngineResult<()> {
        let bytes = bincode::serialize(value)?;
        self.db.put_opt(key.as_bytes(), bytes, &self.write_opts())?;
        Ok(())
    }

    /// Commit a batch atomically. Durability follows the `sync_writes`
    /// setting: with it on, the write is fsync'd before this returns.
    pub fn commit(&self, batch: StoreBatch) -> EngineResult<()> {
        self.db.write_opt(batch.inner, &self.write_opts())?;
        Ok(())
    }
}

/// Staged writes applied atomically by [`KeyedStore::commit`].
pub struct StoreBatch {
    inner: WriteBatch,
}

impl StoreBatch {
    pub fn new() -> Self {
        Self {
            inner: WriteBatch::default(),
        }
    }

    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) -> EngineResult<()> {
        let bytes = bincode::serialize(value)?;
        self.inner.put(key.as_bytes(), bytes);
        Ok(())
    }
}

impl Default for StoreBatch {
    fn default() -> Self {
        Self::new()
    }
}
