//! bcb.rs — Bootloader Control Block codec
//!
//! The BCB is the fixed 2048-byte message at the head of the `misc`
//! partition. A pending `fastboot boot` request is carried in its `abl`
//! area as a [`PendingBootRecord`]; the next boot attempt reads it back
//! after the warm reset and boots the image still resident in RAM.
//!
//! Layout (offsets in bytes):
//!   +-------------------+ 0
//!   | command[32]       |
//!   | status[32]        | 32
//!   | recovery[768]     | 64
//!   | stage[32]         | 832
//!   | abl[32]           | 864  <- PendingBootRecord
//!   | reserved[1152]    | 896
//!   +-------------------+ 2048
//!
//! Record fields are little-endian u32s. There is no version field: any
//! change to this layout breaks the reader in the next boot stage.

use core::mem;

use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{AsBytes, FromBytes, Unaligned};

/// Sentinel marking a pending boot image request.
pub const ABL_BOOT_MAGIC: u32 = 0xABCD_ABCD;

pub const BOOTLOADER_MESSAGE_SIZE: usize = 2048;

const COMMAND_OFFSET: usize = 0;
const COMMAND_LEN: usize = 32;
const ABL_OFFSET: usize = 864;
const ABL_LEN: usize = 32;

type U32Le = U32<LittleEndian>;

/// Pending boot image hand-off record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, Unaligned)]
pub struct PendingBootRecord {
    magic: U32Le,
    image_length: U32Le,
    image_checksum: U32Le,
    image_location: U32Le,
    reserved: [U32Le; 4],
}

const _: () = assert!(mem::size_of::<PendingBootRecord>() == ABL_LEN);

impl PendingBootRecord {
    pub fn new(image_length: u32, image_checksum: u32, image_location: u32) -> Self {
        Self {
            magic: U32Le::new(ABL_BOOT_MAGIC),
            image_length: U32Le::new(image_length),
            image_checksum: U32Le::new(image_checksum),
            image_location: U32Le::new(image_location),
            reserved: [U32Le::new(0); 4],
        }
    }

    #[inline]
    pub fn magic(&self) -> u32 {
        self.magic.get()
    }

    #[inline]
    pub fn image_length(&self) -> u32 {
        self.image_length.get()
    }

    #[inline]
    pub fn image_checksum(&self) -> u32 {
        self.image_checksum.get()
    }

    #[inline]
    pub fn image_location(&self) -> u32 {
        self.image_location.get()
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.magic() == ABL_BOOT_MAGIC
    }
}

/// The full control block as written to persistent storage.
#[derive(Clone, PartialEq, Eq)]
pub struct BootloaderMessage {
    raw: [u8; BOOTLOADER_MESSAGE_SIZE],
}

impl BootloaderMessage {
    pub fn zeroed() -> Self {
        Self { raw: [0u8; BOOTLOADER_MESSAGE_SIZE] }
    }

    /// Wrap bytes read back from storage. Short buffers are zero-extended.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut msg = Self::zeroed();
        let n = bytes.len().min(BOOTLOADER_MESSAGE_SIZE);
        msg.raw[..n].copy_from_slice(&bytes[..n]);
        msg
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The NUL-terminated `command` field, if it holds valid UTF-8.
    pub fn command(&self) -> Option<&str> {
        let field = &self.raw[COMMAND_OFFSET..COMMAND_OFFSET + COMMAND_LEN];
        let end = field.iter().position(|&b| b == 0).unwrap_or(COMMAND_LEN);
        core::str::from_utf8(&field[..end]).ok()
    }

    /// Decode the hand-off record, if one is pending.
    pub fn pending_boot(&self) -> Option<PendingBootRecord> {
        PendingBootRecord::read_from(&self.raw[ABL_OFFSET..ABL_OFFSET + ABL_LEN])
            .filter(PendingBootRecord::is_pending)
    }

    fn abl_mut(&mut self) -> &mut [u8] {
        &mut self.raw[ABL_OFFSET..ABL_OFFSET + ABL_LEN]
    }
}

impl core::fmt::Debug for BootloaderMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BootloaderMessage")
            .field("command", &self.command())
            .field("pending_boot", &self.pending_boot())
            .finish()
    }
}

/// Zero `msg` and write a pending boot record for the given image.
pub fn encode(msg: &mut BootloaderMessage, image_length: u32, checksum: u32, location: u32) {
    msg.raw.fill(0);
    let record = PendingBootRecord::new(image_length, checksum, location);
    msg.abl_mut().copy_from_slice(record.as_bytes());
}
