use super::lock::StoreLock;
use super::memory::{apply_batch, scan_prefix};
use crate::domain::errors::KVStoreError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// File-backed ordered key-value store.
///
/// The whole map lives in memory and is rewritten to disk after every
/// mutation, through a temp file and rename so a crash leaves either the old
/// or the new file.
///
/// Each commit rewrites the file from this handle's copy, so only one handle
/// may have it open: `open` takes an exclusive lock on `<path>.lock`, held
/// until the store is dropped.
///
/// File format: `[key_len:u32 LE][key][value_len:u32 LE][value]...`
pub struct FileBackedKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
    _lock: StoreLock,
}

impl FileBackedKVStore {
    /// Open the store at `path`, creating it on first write.
    ///
    /// Fails with `IOError` while another handle, in this or any other
    /// process, has the same path open.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let lock = StoreLock::acquire(&path)?;

        let data = if path.exists() {
            let data = Self::load_from_file(&path)?;
            tracing::info!(
                "[al-01] 💾 Loaded {} keys from {}",
                data.len(),
                path.display()
            );
            data
        } else {
            tracing::info!("[al-01] 📁 No existing storage file at {}", path.display());
            BTreeMap::new()
        };

        Ok(Self {
            data,
            path,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, KVStoreError> {
        let mut bytes = Vec::new();
        std::fs::File::open(path)
            .and_then(|mut file| file.read_to_end(&mut bytes))
            .map_err(io_error)?;

        let mut data = BTreeMap::new();
        let mut cursor = 0;
        while cursor < bytes.len() {
            let key = read_chunk(&bytes, &mut cursor)?;
            let value = read_chunk(&bytes, &mut cursor)?;
            data.insert(key, value);
        }
        Ok(data)
    }

    fn save_to_file(&self, data: &BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        let mut bytes = Vec::new();
        for (key, value) in data {
            write_chunk(&mut bytes, key)?;
            write_chunk(&mut bytes, value)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        file.sync_all().map_err(io_error)?;
        std::fs::rename(&temp_path, &self.path).map_err(io_error)?;

        Ok(())
    }

    /// Persist `next` and only then make it the live map.
    fn commit(&mut self, next: BTreeMap<Vec<u8>, Vec<u8>>) -> Result<(), KVStoreError> {
        self.save_to_file(&next)?;
        self.data = next;
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.atomic_batch_write(vec![BatchOperation::put(key, value)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let mut next = self.data.clone();
        apply_batch(&mut next, operations);
        self.commit(next)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan_prefix(&self.data, prefix))
    }
}

fn io_error(e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: e.to_string(),
    }
}

fn read_chunk(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, KVStoreError> {
    let truncated = |what: &str| KVStoreError::CorruptionError {
        message: format!("truncated {} at offset {}", what, *cursor),
    };

    let len_bytes: [u8; 4] = bytes
        .get(*cursor..*cursor + 4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| truncated("length prefix"))?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    let start = *cursor + 4;

    let chunk = bytes
        .get(start..start + len)
        .ok_or_else(|| truncated("entry"))?
        .to_vec();
    *cursor = start + len;
    Ok(chunk)
}

fn write_chunk(out: &mut Vec<u8>, chunk: &[u8]) -> Result<(), KVStoreError> {
    let len = u32::try_from(chunk.len()).map_err(|_| KVStoreError::IOError {
        message: format!("entry of {} bytes exceeds u32 length prefix", chunk.len()),
    })?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(chunk);
    Ok(())
}
