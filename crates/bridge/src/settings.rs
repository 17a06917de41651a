//! Persisted aiming sensitivity.
//!
//! Layout of the non-volatile image:
//!
//! | Offset | Size | Content                          |
//! |--------|------|----------------------------------|
//! | 0      | 1    | magic `0xAB` once initialised    |
//! | 1      | 2    | sensitivity divisor, little-endian |
//!
//! Erased storage reads as `0xFF`.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StorageError;
use crate::ports::NonVolatile;

/// Marks an initialised image.
pub const SETTINGS_MAGIC: u8 = 0xAB;

/// Size of the emulated storage image.
pub const DEFAULT_CAPACITY: usize = 1024;

const MAGIC_OFFSET: usize = 0;
const SENSITIVITY_OFFSET: usize = 1;
const ERASED: u8 = 0xFF;

fn check_range(offset: usize, len: usize, capacity: usize) -> Result<(), StorageError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(StorageError::OutOfRange {
            offset,
            len,
            capacity,
        }),
    }
}

/// Storage image held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNonVolatile {
    bytes: Vec<u8>,
}

impl MemoryNonVolatile {
    /// Erased image of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![ERASED; capacity],
        }
    }

    /// Raw image.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for MemoryNonVolatile {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl NonVolatile for MemoryNonVolatile {
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        check_range(offset, buf.len(), self.bytes.len())?;
        buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        check_range(offset, data.len(), self.bytes.len())?;
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }
}

/// Storage image backed by a file. The whole image is rewritten on every
/// store; a missing file reads as erased.
#[derive(Debug)]
pub struct FileNonVolatile {
    path: PathBuf,
    image: MemoryNonVolatile,
}

impl FileNonVolatile {
    /// Open `path`, or start from an erased image if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read.
    pub fn open(path: &Path, capacity: usize) -> Result<Self, StorageError> {
        let mut image = MemoryNonVolatile::new(capacity);
        match std::fs::read(path) {
            Ok(bytes) => {
                let len = bytes.len().min(capacity);
                image.bytes[..len].copy_from_slice(&bytes[..len]);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings image, starting erased");
            }
            Err(err) => return Err(err.into()),
        }
        Ok(Self {
            path: path.to_path_buf(),
            image,
        })
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NonVolatile for FileNonVolatile {
    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<(), StorageError> {
        self.image.read(offset, buf)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StorageError> {
        self.image.write(offset, data)?;
        std::fs::write(&self.path, self.image.as_bytes())?;
        Ok(())
    }
}

/// The persisted sensitivity setting on top of a storage image.
#[derive(Debug)]
pub struct PersistentSettings<S: NonVolatile> {
    storage: S,
    sensitivity: u16,
}

impl<S: NonVolatile> PersistentSettings<S> {
    /// Read the setting, initialising the image with `default` on first run.
    ///
    /// A stored divisor of zero cannot be used and is replaced by `default`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or initialised.
    pub fn load(mut storage: S, default: u16) -> Result<Self, StorageError> {
        let mut magic = [0u8; 1];
        storage.read(MAGIC_OFFSET, &mut magic)?;
        if magic[0] != SETTINGS_MAGIC {
            info!(sensitivity = default, "initialising settings storage");
            storage.write(MAGIC_OFFSET, &[SETTINGS_MAGIC])?;
            storage.write(SENSITIVITY_OFFSET, &default.to_le_bytes())?;
            return Ok(Self {
                storage,
                sensitivity: default,
            });
        }

        let mut raw = [0u8; 2];
        storage.read(SENSITIVITY_OFFSET, &mut raw)?;
        let sensitivity = match u16::from_le_bytes(raw) {
            0 => {
                debug!(default, "stored sensitivity is zero, using default");
                default
            }
            value => value,
        };
        Ok(Self {
            storage,
            sensitivity,
        })
    }

    /// Current sensitivity divisor.
    pub fn sensitivity(&self) -> u16 {
        self.sensitivity
    }

    /// Store a new divisor. Returns `false` without writing if it is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; the in-memory value is then
    /// left unchanged.
    pub fn set_sensitivity(&mut self, value: u16) -> Result<bool, StorageError> {
        if value == self.sensitivity {
            return Ok(false);
        }
        self.storage.write(SENSITIVITY_OFFSET, &value.to_le_bytes())?;
        self.sensitivity = value;
        Ok(true)
    }

    /// Underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}
