//! Persistent radix trie index over the block store.
//!
//! Every trie page is itself a content-addressed record, so each mutation
//! path-copies from leaf to root and yields a new root address while
//! sharing every untouched subtree with prior revisions. The current root
//! (plus entry count) is the only mutable state, persisted as a small
//! pointer file under `{base_path}/roots`.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::block::BlockStore;
use crate::record::{Record, RecordMeta};
use crate::types::{Cid, GraphError, Result};

const ROOTS_DIR: &str = "roots";

/// Index totals.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TrieStats {
    /// Number of keys currently present.
    pub total_entries: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct TriePage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    // child edge label -> child page address; sibling labels never share
    // a first character
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, Cid>,
}

#[derive(Serialize, Deserialize)]
struct RootPointer {
    root: Option<Cid>,
    entries: u64,
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    let mut len = 0;
    let mut ai = a.chars();
    let mut bi = b.chars();
    loop {
        match (ai.next(), bi.next()) {
            (Some(x), Some(y)) if x == y => len += x.len_utf8(),
            _ => return len,
        }
    }
}

/// A persistent associative index over string keys.
pub struct TrieIndex {
    store: Arc<BlockStore>,
    pointer_path: PathBuf,
    root: Option<Cid>,
    entries: u64,
}

impl TrieIndex {
    /// Opens the named index, reloading a previously persisted root when
    /// one exists. Idempotent.
    pub fn open(store: Arc<BlockStore>, base_path: &Path, name: &str) -> Result<Self> {
        let roots_dir = base_path.join(ROOTS_DIR);
        fs::create_dir_all(&roots_dir)?;
        let pointer_path = roots_dir.join(format!("{name}.json"));
        let (root, entries) = match fs::read(&pointer_path) {
            Ok(bytes) => {
                let pointer: RootPointer = serde_json::from_slice(&bytes).map_err(|err| {
                    GraphError::Corruption(format!("root pointer {name} undecodable: {err}"))
                })?;
                (pointer.root, pointer.entries)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => (None, 0),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            store,
            pointer_path,
            root,
            entries,
        })
    }

    /// Current root address, if any key has ever been written.
    pub fn root(&self) -> Option<&Cid> {
        self.root.as_ref()
    }

    /// Index totals.
    pub fn stats(&self) -> TrieStats {
        TrieStats {
            total_entries: self.entries,
        }
    }

    /// Looks a key up.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(root) = &self.root else {
            return Ok(None);
        };
        let mut page = self.read_page(root)?;
        let mut rest = key;
        loop {
            if rest.is_empty() {
                return Ok(page.value.clone());
            }
            let mut next = None;
            for (label, cid) in &page.children {
                if rest.starts_with(label.as_str()) {
                    next = Some((label.len(), cid.clone()));
                    break;
                }
            }
            match next {
                Some((consumed, cid)) => {
                    page = self.read_page(&cid)?;
                    rest = &rest[consumed..];
                }
                None => return Ok(None),
            }
        }
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Inserts or replaces a key. Replacement does not change the count.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let page = match &self.root {
            Some(cid) => self.read_page(cid)?,
            None => TriePage::default(),
        };
        let (new_root, inserted) = self.insert_rec(page, key, value)?;
        self.root = Some(new_root);
        if inserted {
            self.entries += 1;
        }
        trace!(key, inserted, "trie set");
        self.persist_pointer()
    }

    /// Removes a key; `false` when it was not present.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let Some(root) = self.root.clone() else {
            return Ok(false);
        };
        let (new_root, removed) = self.remove_rec(&root, key)?;
        if removed {
            self.root = new_root;
            self.entries = self.entries.saturating_sub(1);
            self.persist_pointer()?;
        }
        Ok(removed)
    }

    /// Walks the whole index, yielding `(key, value)` pairs in key order.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            self.collect(root, String::new(), &mut out)?;
        }
        Ok(out)
    }

    fn collect(&self, cid: &Cid, prefix: String, out: &mut Vec<(String, String)>) -> Result<()> {
        let page = self.read_page(cid)?;
        if let Some(value) = &page.value {
            out.push((prefix.clone(), value.clone()));
        }
        for (label, child) in &page.children {
            self.collect(child, format!("{prefix}{label}"), out)?;
        }
        Ok(())
    }

    fn insert_rec(&self, mut page: TriePage, rest: &str, value: &str) -> Result<(Cid, bool)> {
        if rest.is_empty() {
            let inserted = page.value.is_none();
            page.value = Some(value.to_string());
            return Ok((self.write_page(&page)?, inserted));
        }
        let mut matched: Option<(String, Cid, usize)> = None;
        for (label, cid) in &page.children {
            let common = common_prefix_len(label, rest);
            if common > 0 {
                matched = Some((label.clone(), cid.clone(), common));
                break;
            }
        }
        let (child_label, child_cid, inserted) = match matched {
            None => {
                let leaf = TriePage {
                    value: Some(value.to_string()),
                    children: BTreeMap::new(),
                };
                (rest.to_string(), self.write_page(&leaf)?, true)
            }
            Some((label, cid, common)) if common == label.len() => {
                let child = self.read_page(&cid)?;
                let (new_cid, inserted) = self.insert_rec(child, &rest[common..], value)?;
                (label, new_cid, inserted)
            }
            Some((label, cid, common)) => {
                // split the edge: keep the shared prefix, push the old
                // subtree one level down
                let mut mid = TriePage::default();
                mid.children.insert(label[common..].to_string(), cid);
                let tail = &rest[common..];
                let (mid_cid, inserted) = if tail.is_empty() {
                    mid.value = Some(value.to_string());
                    (self.write_page(&mid)?, true)
                } else {
                    self.insert_rec(mid, tail, value)?
                };
                page.children.remove(&label);
                (label[..common].to_string(), mid_cid, inserted)
            }
        };
        page.children.insert(child_label, child_cid);
        Ok((self.write_page(&page)?, inserted))
    }

    // Returns the rewritten subtree (None once empty) and whether the key
    // was removed. A miss returns the original address untouched, keeping
    // structural sharing intact.
    fn remove_rec(&self, cid: &Cid, rest: &str) -> Result<(Option<Cid>, bool)> {
        let mut page = self.read_page(cid)?;
        if rest.is_empty() {
            if page.value.take().is_none() {
                return Ok((Some(cid.clone()), false));
            }
            if page.children.is_empty() {
                return Ok((None, true));
            }
            return Ok((Some(self.write_page(&page)?), true));
        }
        let mut matched = None;
        for (label, child) in &page.children {
            if rest.starts_with(label.as_str()) {
                matched = Some((label.clone(), child.clone()));
                break;
            }
        }
        let Some((label, child_cid)) = matched else {
            return Ok((Some(cid.clone()), false));
        };
        let (new_child, removed) = self.remove_rec(&child_cid, &rest[label.len()..])?;
        if !removed {
            return Ok((Some(cid.clone()), false));
        }
        match new_child {
            Some(child) => {
                page.children.insert(label, child);
            }
            None => {
                page.children.remove(&label);
            }
        }
        if page.value.is_none() && page.children.is_empty() {
            return Ok((None, true));
        }
        Ok((Some(self.write_page(&page)?), true))
    }

    fn write_page(&self, page: &TriePage) -> Result<Cid> {
        let data = serde_json::to_value(page)
            .map_err(|err| GraphError::Serialization(err.to_string()))?;
        self.store.put(&Record {
            data,
            links: Vec::new(),
            metadata: RecordMeta::trie(),
        })
    }

    fn read_page(&self, cid: &Cid) -> Result<TriePage> {
        let Some(record) = self.store.get(cid)? else {
            return Err(GraphError::Corruption(format!(
                "trie page {cid} missing from block store"
            )));
        };
        serde_json::from_value(record.data)
            .map_err(|err| GraphError::Corruption(format!("trie page {cid} undecodable: {err}")))
    }

    fn persist_pointer(&self) -> Result<()> {
        let pointer = RootPointer {
            root: self.root.clone(),
            entries: self.entries,
        };
        let bytes = serde_json::to_vec(&pointer)
            .map_err(|err| GraphError::Serialization(err.to_string()))?;
        fs::write(&self.pointer_path, bytes)?;
        Ok(())
    }
}
