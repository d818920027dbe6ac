//! Persisted node address
//!
//! The address is stored as a single byte under [`StorageKey::NodeAddress`].
//! Erased flash reads back as 0xFF, so that value means "not configured"
//! and the configured fallback is used instead.

use anglebus_hal::{FlashError, FlashStorage, StorageKey};

/// Stored value meaning no address has been assigned
pub const UNCONFIGURED_ADDRESS: u8 = 0xFF;

/// Pick the address to run with from the stored value
pub fn resolve_address(stored: Option<u8>, fallback: u8) -> u8 {
    match stored {
        Some(address) if address != UNCONFIGURED_ADDRESS => address,
        _ => fallback,
    }
}

/// Read the stored address
///
/// Returns `Ok(None)` if nothing usable is stored.
pub async fn read_address<S: FlashStorage>(storage: &mut S) -> Result<Option<u8>, FlashError> {
    let mut buffer = [0u8; 1];
    match storage.read(StorageKey::NodeAddress, &mut buffer).await {
        Ok(1) => Ok(Some(buffer[0]).filter(|&a| a != UNCONFIGURED_ADDRESS)),
        Ok(_) => Err(FlashError::Corrupted),
        Err(FlashError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Load the address to run with, falling back on any storage problem
pub async fn load_address<S: FlashStorage>(storage: &mut S, fallback: u8) -> u8 {
    resolve_address(read_address(storage).await.ok().flatten(), fallback)
}

/// Persist a new address
pub async fn store_address<S: FlashStorage>(
    storage: &mut S,
    address: u8,
) -> Result<(), FlashError> {
    storage.write(StorageKey::NodeAddress, &[address]).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use embassy_futures::block_on;

    /// In-memory stand-in for the flash partition
    #[derive(Default)]
    pub(crate) struct MemFlash {
        pub value: Option<heapless::Vec<u8, 4>>,
        pub fail_writes: bool,
    }

    impl FlashStorage for MemFlash {
        async fn read(&mut self, _key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
            let data = self.value.as_ref().ok_or(FlashError::NotFound)?;
            if buffer.len() < data.len() {
                return Err(FlashError::BufferTooSmall);
            }
            buffer[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }

        async fn write(&mut self, _key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
            if self.fail_writes {
                return Err(FlashError::Storage);
            }
            let mut value = heapless::Vec::new();
            value
                .extend_from_slice(data)
                .map_err(|_| FlashError::Full)?;
            self.value = Some(value);
            Ok(())
        }

        async fn exists(&mut self, _key: StorageKey) -> bool {
            self.value.is_some()
        }

        async fn erase_all(&mut self) -> Result<(), FlashError> {
            self.value = None;
            Ok(())
        }
    }

    #[test]
    fn test_resolve_address() {
        assert_eq!(resolve_address(Some(7), 0xA0), 7);
        assert_eq!(resolve_address(Some(UNCONFIGURED_ADDRESS), 0xA0), 0xA0);
        assert_eq!(resolve_address(None, 0xA0), 0xA0);
    }

    #[test]
    fn test_empty_storage_uses_fallback() {
        let mut flash = MemFlash::default();
        assert_eq!(block_on(read_address(&mut flash)), Ok(None));
        assert_eq!(block_on(load_address(&mut flash, 0xA0)), 0xA0);
    }

    #[test]
    fn test_erased_sentinel_uses_fallback() {
        let mut flash = MemFlash::default();
        block_on(store_address(&mut flash, UNCONFIGURED_ADDRESS)).unwrap();
        assert_eq!(block_on(read_address(&mut flash)), Ok(None));
        assert_eq!(block_on(load_address(&mut flash, 0x10)), 0x10);
    }

    #[test]
    fn test_store_then_load() {
        let mut flash = MemFlash::default();
        block_on(store_address(&mut flash, 150)).unwrap();
        assert_eq!(block_on(load_address(&mut flash, 0xA0)), 150);
    }

    #[test]
    fn test_oversized_item_falls_back() {
        let mut flash = MemFlash::default();
        block_on(flash.write(StorageKey::NodeAddress, &[1, 2])).unwrap();
        assert_eq!(
            block_on(read_address(&mut flash)),
            Err(FlashError::BufferTooSmall)
        );
        assert_eq!(block_on(load_address(&mut flash, 0xA0)), 0xA0);
    }

    #[test]
    fn test_empty_item_is_corrupted() {
        let mut flash = MemFlash::default();
        block_on(flash.write(StorageKey::NodeAddress, &[])).unwrap();
        assert_eq!(
            block_on(read_address(&mut flash)),
            Err(FlashError::Corrupted)
        );
        assert_eq!(block_on(load_address(&mut flash, 0xA0)), 0xA0);
    }

    #[test]
    fn test_erase_all_forgets_address() {
        let mut flash = MemFlash::default();
        block_on(store_address(&mut flash, 150)).unwrap();
        assert!(block_on(flash.exists(StorageKey::NodeAddress)));
        block_on(flash.erase_all()).unwrap();
        assert_eq!(block_on(load_address(&mut flash, 0xA0)), 0xA0);
    }
}
