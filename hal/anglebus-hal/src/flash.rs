//! Flash storage abstractions
//!
//! A node persists a single byte, its bus address, but the storage is
//! keyed so the on-flash layout can grow without a format change.

/// Keys of the items kept in the node partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Bus address of this node (single byte, 0xFF = not configured)
    NodeAddress = 0,
}

impl From<StorageKey> for u8 {
    fn from(key: StorageKey) -> Self {
        key as u8
    }
}

impl TryFrom<u8> for StorageKey {
    type Error = FlashError;

    fn try_from(value: u8) -> Result<Self, FlashError> {
        match value {
            0 => Ok(StorageKey::NodeAddress),
            _ => Err(FlashError::Corrupted),
        }
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// The flash peripheral reported an error
    Flash,
    /// The storage layer failed for another reason
    Storage,
    /// No item stored under the key
    NotFound,
    /// Caller's buffer cannot hold the stored item
    BufferTooSmall,
    /// Stored data does not decode
    Corrupted,
    /// No room left in the partition
    Full,
}

/// Keyed persistent storage
///
/// Implementations own a flash partition and are expected to spread
/// writes across it.
pub trait FlashStorage {
    /// Copy the item stored under `key` into `buffer`, returning its length
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Replace the item stored under `key`
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Check whether an item is stored under `key`
    fn exists(&mut self, key: StorageKey) -> impl core::future::Future<Output = bool>;

    /// Erase the whole partition
    fn erase_all(&mut self) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        let slot = buffer
            .first_mut()
            .ok_or(sequential_storage::map::SerializationError::BufferTooSmall)?;
        *slot = u8::from(*self);
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        let byte = *buffer
            .first()
            .ok_or(sequential_storage::map::SerializationError::BufferTooSmall)?;
        let key = StorageKey::try_from(byte)
            .map_err(|_| sequential_storage::map::SerializationError::InvalidFormat)?;
        Ok((key, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_byte_roundtrip() {
        let key = StorageKey::NodeAddress;
        assert_eq!(StorageKey::try_from(u8::from(key)), Ok(key));
        assert_eq!(StorageKey::try_from(0x7F), Err(FlashError::Corrupted));
    }
}
