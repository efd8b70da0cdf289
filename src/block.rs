//! Content-addressed block store: immutable records on disk, keyed by the
//! sha-256 of their canonical bytes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::trace;

use crate::record::Record;
use crate::types::{Cid, GraphError, Result};

const BLOCKS_DIR: &str = "blocks";

/// File-backed content-addressed store under `{base_path}/blocks`.
///
/// Records are written once; a second `put` of identical content finds the
/// block already present and returns the same address. Nothing is ever
/// overwritten or erased here; logical deletion happens in the indices.
pub struct BlockStore {
    blocks_dir: PathBuf,
}

impl BlockStore {
    /// Prepares the storage location. Idempotent.
    pub fn open(base_path: &Path) -> Result<Self> {
        let blocks_dir = base_path.join(BLOCKS_DIR);
        fs::create_dir_all(&blocks_dir)?;
        Ok(Self { blocks_dir })
    }

    // Two-character fan-out keeps directory listings bounded.
    fn block_path(&self, cid: &Cid) -> PathBuf {
        let (fan, rest) = cid.as_str().split_at(2);
        self.blocks_dir.join(fan).join(format!("{rest}.json"))
    }

    /// Persists a record and returns its deterministic address.
    pub fn put(&self, record: &Record) -> Result<Cid> {
        let bytes = serde_json::to_vec(record)
            .map_err(|err| GraphError::Serialization(err.to_string()))?;
        let cid = Cid::from_digest(&Sha256::digest(&bytes));
        let path = self.block_path(&cid);
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &bytes)?;
            trace!(cid = %cid, len = bytes.len(), "block written");
        }
        Ok(cid)
    }

    /// Retrieves a previously stored record; `None` when the address does
    /// not resolve.
    pub fn get(&self, cid: &Cid) -> Result<Option<Record>> {
        if cid.as_str().len() < 3 {
            return Ok(None);
        }
        let bytes = match fs::read(self.block_path(cid)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| GraphError::Corruption(format!("block {cid} undecodable: {err}")))
    }
}
