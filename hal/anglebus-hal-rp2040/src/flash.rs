//! Flash storage driver for RP2040
//!
//! Uses sequential-storage for wear-leveled key-value storage
//! in the last two sectors of flash. The only item stored is the node
//! address, so the partition and the item buffers are small.
//!
//! Implements the `FlashStorage` trait from `anglebus-hal`.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

// Re-export shared types from anglebus-hal
pub use anglebus_hal::flash::{FlashError, StorageKey};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the Pico
/// sequential-storage needs at least two erase sectors for a map
pub const NODE_PARTITION_SIZE: usize = 2 * ERASE_SIZE;
pub const NODE_PARTITION_START: usize = FLASH_SIZE - NODE_PARTITION_SIZE;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: usize = ERASE_SIZE;

/// Flash range for the node partition
pub const NODE_RANGE: core::ops::Range<u32> = (NODE_PARTITION_START as u32)..(FLASH_SIZE as u32);

/// Scratch buffer for one stored item (key, length header and value)
const ITEM_BUFFER_SIZE: usize = 32;

/// RP2040 Flash storage implementation
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Create a new flash storage instance
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Look up `key` and hand the stored bytes to `f`
    async fn with_item<R>(
        &mut self,
        key: StorageKey,
        f: impl FnOnce(&[u8]) -> Result<R, FlashError>,
    ) -> Result<R, FlashError> {
        let mut scratch = [0u8; ITEM_BUFFER_SIZE];

        let item = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            NODE_RANGE,
            &mut NoCache::new(),
            &mut scratch,
            &key,
        )
        .await
        .map_err(storage_error)?;

        f(item.ok_or(FlashError::NotFound)?)
    }
}

/// Map a sequential-storage error onto the shared error type
fn storage_error<E>(e: sequential_storage::Error<E>) -> FlashError {
    match e {
        sequential_storage::Error::Storage { .. } => FlashError::Flash,
        sequential_storage::Error::FullStorage => FlashError::Full,
        sequential_storage::Error::Corrupted { .. } => FlashError::Corrupted,
        _ => FlashError::Storage,
    }
}

impl anglebus_hal::FlashStorage for Rp2040FlashStorage<'_> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        self.with_item(key, |data| {
            let target = buffer
                .get_mut(..data.len())
                .ok_or(FlashError::BufferTooSmall)?;
            target.copy_from_slice(data);
            Ok(data.len())
        })
        .await
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        let mut scratch = [0u8; ITEM_BUFFER_SIZE];

        map::store_item(
            &mut self.flash,
            NODE_RANGE,
            &mut NoCache::new(),
            &mut scratch,
            &key,
            &data,
        )
        .await
        .map_err(storage_error)
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        self.with_item(key, |_| Ok(())).await.is_ok()
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        self.flash
            .erase(NODE_RANGE.start, NODE_RANGE.end)
            .await
            .map_err(|_| FlashError::Flash)
    }
}
