//! misc.rs — raw writes to the head of a labelled GPT partition
//!
//! The BCB is not a file: it is the first 2 KiB of the `misc` partition.
//! Writes are read-modify-write over whole blocks so the rest of the first
//! blocks is preserved, then flushed.
//!
//! Protocols are opened with `GetProtocol` rather than exclusively: the
//! block device stays bound to its driver, and the misc partition is often
//! held by other firmware components.

use alloc::vec;

use uefi::prelude::*;
use uefi::proto::media::block::BlockIO;
use uefi::proto::media::partition::PartitionInfo;
use uefi::proto::ProtocolPointer;
use uefi::table::boot::{BootServices, OpenProtocolAttributes, OpenProtocolParams, ScopedProtocol};

/// Overwrite the first `data.len()` bytes of the partition named `label`.
///
/// `agent` is the handle of the calling image.
pub fn write_partition_head(
    bt: &BootServices,
    agent: Handle,
    label: &str,
    data: &[u8],
) -> Result<(), Status> {
    let handle = find_partition(bt, agent, label)?;
    let mut blk = open_shared::<BlockIO>(bt, agent, handle).map_err(|e| e.status())?;

    let media = blk.media();
    let media_id = media.media_id();
    let block_size = media.block_size() as usize;
    if media.is_read_only() {
        return Err(Status::WRITE_PROTECTED);
    }
    if block_size == 0 {
        return Err(Status::DEVICE_ERROR);
    }

    let span = data.len().div_ceil(block_size) * block_size;
    let mut buf = vec![0u8; span];
    blk.read_blocks(media_id, 0, &mut buf).map_err(|e| e.status())?;
    buf[..data.len()].copy_from_slice(data);
    blk.write_blocks(media_id, 0, &buf).map_err(|e| e.status())?;
    blk.flush_blocks().map_err(|e| e.status())
}

fn open_shared<'a, P: ProtocolPointer + ?Sized>(
    bt: &'a BootServices,
    agent: Handle,
    handle: Handle,
) -> uefi::Result<ScopedProtocol<'a, P>> {
    // SAFETY: the protocol is only used for the duration of one write and
    // the owning driver stays bound; nothing here uninstalls it.
    unsafe {
        bt.open_protocol::<P>(
            OpenProtocolParams { handle, agent, controller: None },
            OpenProtocolAttributes::GetProtocol,
        )
    }
}

fn find_partition(bt: &BootServices, agent: Handle, label: &str) -> Result<Handle, Status> {
    let handles = bt.find_handles::<PartitionInfo>().map_err(|e| e.status())?;
    for handle in handles {
        let info = match open_shared::<PartitionInfo>(bt, agent, handle) {
            Ok(info) => info,
            Err(_) => continue,
        };
        if let Some(entry) = info.gpt_partition_entry() {
            let name = entry.partition_name;
            let units = name.iter().map(|c| u16::from(*c)).take_while(|&u| u != 0);
            if units.eq(label.encode_utf16()) {
                return Ok(handle);
            }
        }
    }
    log::error!("no GPT partition labelled '{}'", label);
    Err(Status::NOT_FOUND)
}
