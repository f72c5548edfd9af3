//! x86-64 hardware breakpoints and watchpoints through DR0-DR3 and DR7.

use tracing::debug;

use super::{DebugCapabilities, HardwareSlot, SlotScan, WatchpointInstallation};
use crate::debug_registers::x64::{encode_len, len, local_enable, rw, rw_values, X64DebugBlock};
use crate::error::{HwDebugError, HwDebugResult};
use crate::platform::ThreadRegisterIo;
use crate::registers::x64::HW_SLOTS;
use crate::types::{Address, AddressRange, RegisterCategory};
use crate::watchpoint::{align_range, WatchpointType};

pub(super) const fn capabilities() -> DebugCapabilities
{
    DebugCapabilities {
        breakpoint_slots: HW_SLOTS,
        watchpoint_slots: HW_SLOTS,
    }
}

fn read_debug_block(thread: &impl ThreadRegisterIo) -> HwDebugResult<(Vec<u8>, X64DebugBlock)>
{
    let bytes = thread.read_block(RegisterCategory::Debug)?;
    let block = X64DebugBlock::from_bytes(&bytes)?;
    Ok((bytes, block))
}

fn write_debug_block(thread: &mut impl ThreadRegisterIo, mut bytes: Vec<u8>, block: &X64DebugBlock) -> HwDebugResult<()>
{
    block.write_to(&mut bytes)?;
    thread.write_block(RegisterCategory::Debug, &bytes)?;
    Ok(())
}

/// Program `slot` and enable it locally.
fn program_slot(block: &mut X64DebugBlock, slot: usize, address: u64, rw_value: u64, len_value: u64)
{
    block.dr[slot] = address;
    rw(slot).set(&mut block.dr7, rw_value);
    len(slot).set(&mut block.dr7, len_value);
    local_enable(slot).set(&mut block.dr7, 1);
}

pub(super) fn install_hardware_breakpoint(thread: &mut impl ThreadRegisterIo, address: Address) -> HwDebugResult<HardwareSlot>
{
    let (bytes, mut block) = read_debug_block(thread)?;

    let scan = SlotScan::run(
        HW_SLOTS,
        |slot| block.is_enabled(slot),
        |slot| !block.is_watchpoint(slot) && block.dr[slot] == address.value(),
    );
    if scan.existing.is_some() {
        return Err(HwDebugError::AlreadyInstalled(address));
    }
    let slot = scan.free.ok_or_else(|| {
        HwDebugError::ResourceExhausted(format!("No free hardware breakpoint slots (maximum {HW_SLOTS} on x86-64)"))
    })?;

    // Execution breakpoints require RW=00 and LEN=00.
    program_slot(&mut block, slot, address.value(), rw_values::EXECUTE, 0);
    write_debug_block(thread, bytes, &block)?;

    debug!("Installed hardware breakpoint at {address} in DR{slot}");
    Ok(HardwareSlot::new(slot))
}

pub(super) fn uninstall_hardware_breakpoint(
    thread: &mut impl ThreadRegisterIo,
    address: Address,
) -> HwDebugResult<HardwareSlot>
{
    let (bytes, mut block) = read_debug_block(thread)?;

    let scan = SlotScan::run(
        HW_SLOTS,
        |slot| block.is_enabled(slot),
        |slot| !block.is_watchpoint(slot) && block.dr[slot] == address.value(),
    );
    let slot = scan.existing.ok_or(HwDebugError::NotFound(address))?;

    block.clear_slot(slot);
    write_debug_block(thread, bytes, &block)?;

    debug!("Removed hardware breakpoint at {address} from DR{slot}");
    Ok(HardwareSlot::new(slot))
}

const fn rw_for(kind: WatchpointType) -> Option<u64>
{
    match kind {
        WatchpointType::Read => None,
        WatchpointType::Write => Some(rw_values::WRITE),
        WatchpointType::ReadWrite => Some(rw_values::READ_WRITE),
    }
}

fn matches_window(block: &X64DebugBlock, slot: usize, range: &AddressRange) -> bool
{
    block.is_watchpoint(slot) && block.dr[slot] == range.begin().value() && block.watch_len(slot) == range.size()
}

pub(super) fn install_watchpoint(
    thread: &mut impl ThreadRegisterIo,
    kind: WatchpointType,
    range: AddressRange,
) -> HwDebugResult<WatchpointInstallation>
{
    let aligned = align_range(range)?;
    let rw_value = rw_for(kind).ok_or(HwDebugError::UnsupportedWatchpoint(kind))?;
    let len_value = encode_len(aligned.size()).ok_or(HwDebugError::UnrepresentableRange(range))?;

    let (bytes, mut block) = read_debug_block(thread)?;

    let scan = SlotScan::run(HW_SLOTS, |slot| block.is_enabled(slot), |slot| matches_window(&block, slot, &aligned));
    if scan.existing.is_some() {
        return Err(HwDebugError::AlreadyInstalled(aligned.begin()));
    }
    let slot = scan.free.ok_or_else(|| {
        HwDebugError::ResourceExhausted(format!("No free watchpoint slots (maximum {HW_SLOTS} on x86-64)"))
    })?;

    program_slot(&mut block, slot, aligned.begin().value(), rw_value, len_value);
    write_debug_block(thread, bytes, &block)?;

    debug!("Installed {kind} watchpoint on {aligned} (requested {range}) in DR{slot}");
    Ok(WatchpointInstallation {
        range: aligned,
        slot: HardwareSlot::new(slot),
    })
}

pub(super) fn uninstall_watchpoint(thread: &mut impl ThreadRegisterIo, range: AddressRange) -> HwDebugResult<HardwareSlot>
{
    let aligned = align_range(range)?;
    let (bytes, mut block) = read_debug_block(thread)?;

    let scan = SlotScan::run(HW_SLOTS, |slot| block.is_enabled(slot), |slot| matches_window(&block, slot, &aligned));
    let slot = scan.existing.ok_or(HwDebugError::NotFound(aligned.begin()))?;

    block.clear_slot(slot);
    write_debug_block(thread, bytes, &block)?;

    debug!("Removed watchpoint on {aligned} from DR{slot}");
    Ok(HardwareSlot::new(slot))
}
