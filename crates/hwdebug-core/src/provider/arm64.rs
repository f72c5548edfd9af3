//! ARM64 hardware breakpoints and watchpoints through the DBGB*/DBGW* pairs.
//!
//! The number of implemented pairs is read from `ID_AA64DFR0_EL1` on every
//! call instead of being assumed; slots beyond it are never touched.

use tracing::debug;

use super::{DebugCapabilities, HardwareSlot, SlotScan, WatchpointInstallation};
use crate::debug_registers::arm64::{
    lsc_values, to_control, Arm64DebugBlock, DBGBCR_BAS, DBGBCR_E, DBGBCR_PMC, DBGWCR_BAS, DBGWCR_E, DBGWCR_LSC,
    DBGWCR_PAC, PRIVILEGE_EL0,
};
use crate::error::{HwDebugError, HwDebugResult};
use crate::platform::ThreadRegisterIo;
use crate::types::{Address, AddressRange, RegisterCategory};
use crate::watchpoint::{align_range, WatchpointType, MAX_WATCH_SIZE};

/// A64 instructions are 4-byte aligned; DBGBVR bits 1..0 are RES0.
const INSTRUCTION_ALIGNMENT: u64 = 4;

fn read_debug_block(thread: &impl ThreadRegisterIo) -> HwDebugResult<(Vec<u8>, Arm64DebugBlock)>
{
    let bytes = thread.read_block(RegisterCategory::Debug)?;
    let block = Arm64DebugBlock::from_bytes(&bytes)?;
    Ok((bytes, block))
}

fn write_debug_block(thread: &mut impl ThreadRegisterIo, mut bytes: Vec<u8>, block: &Arm64DebugBlock) -> HwDebugResult<()>
{
    block.write_to(&mut bytes)?;
    thread.write_block(RegisterCategory::Debug, &bytes)?;
    Ok(())
}

pub(super) fn capabilities(thread: &impl ThreadRegisterIo) -> HwDebugResult<DebugCapabilities>
{
    let (_, block) = read_debug_block(thread)?;
    Ok(DebugCapabilities {
        breakpoint_slots: block.breakpoint_slots(),
        watchpoint_slots: block.watchpoint_slots(),
    })
}

/// DBGBCR value for an enabled EL0 breakpoint on a whole A64 instruction.
fn breakpoint_control() -> u32
{
    let raw = DBGBCR_E.with(0, 1);
    let raw = DBGBCR_PMC.with(raw, PRIVILEGE_EL0);
    to_control(DBGBCR_BAS.with(raw, 0b1111))
}

pub(super) fn install_hardware_breakpoint(thread: &mut impl ThreadRegisterIo, address: Address) -> HwDebugResult<HardwareSlot>
{
    if !address.is_aligned(INSTRUCTION_ALIGNMENT) {
        return Err(HwDebugError::InvalidArgument(format!(
            "ARM64 breakpoint address {address} is not 4-byte aligned"
        )));
    }

    let (bytes, mut block) = read_debug_block(thread)?;
    let count = block.breakpoint_slots();

    let scan = SlotScan::run(
        count,
        |slot| block.breakpoint_enabled(slot),
        |slot| block.dbgbvr[slot] == address.value(),
    );
    if scan.existing.is_some() {
        return Err(HwDebugError::AlreadyInstalled(address));
    }
    let slot = scan.free.ok_or_else(|| {
        HwDebugError::ResourceExhausted(format!("No free hardware breakpoint slots ({count} implemented)"))
    })?;

    block.dbgbvr[slot] = address.value();
    block.dbgbcr[slot] = breakpoint_control();
    write_debug_block(thread, bytes, &block)?;

    debug!("Installed hardware breakpoint at {address} in DBGBCR{slot}");
    Ok(HardwareSlot::new(slot))
}

pub(super) fn uninstall_hardware_breakpoint(
    thread: &mut impl ThreadRegisterIo,
    address: Address,
) -> HwDebugResult<HardwareSlot>
{
    let (bytes, mut block) = read_debug_block(thread)?;

    let scan = SlotScan::run(
        block.breakpoint_slots(),
        |slot| block.breakpoint_enabled(slot),
        |slot| block.dbgbvr[slot] == address.value(),
    );
    let slot = scan.existing.ok_or(HwDebugError::NotFound(address))?;

    block.dbgbcr[slot] = 0;
    block.dbgbvr[slot] = 0;
    write_debug_block(thread, bytes, &block)?;

    debug!("Removed hardware breakpoint at {address} from DBGBCR{slot}");
    Ok(HardwareSlot::new(slot))
}

/// DBGWVR value and byte-address-select mask for an aligned window.
///
/// The window never crosses a doubleword, so it is expressed as the
/// doubleword address plus one `BAS` bit per watched byte.
fn watch_registers(window: &AddressRange) -> (u64, u64)
{
    let begin = window.begin().value();
    let base = begin & !(MAX_WATCH_SIZE - 1);
    let bas = ((1u64 << window.size()) - 1) << (begin - base);
    (base, bas)
}

const fn lsc_for(kind: WatchpointType) -> u64
{
    match kind {
        WatchpointType::Read => lsc_values::LOAD,
        WatchpointType::Write => lsc_values::STORE,
        WatchpointType::ReadWrite => lsc_values::LOAD_STORE,
    }
}

fn matches_window(block: &Arm64DebugBlock, slot: usize, base: u64, bas: u64) -> bool
{
    block.dbgwvr[slot] == base && DBGWCR_BAS.get(u64::from(block.dbgwcr[slot])) == bas
}

pub(super) fn install_watchpoint(
    thread: &mut impl ThreadRegisterIo,
    kind: WatchpointType,
    range: AddressRange,
) -> HwDebugResult<WatchpointInstallation>
{
    let aligned = align_range(range)?;
    let (base, bas) = watch_registers(&aligned);

    let (bytes, mut block) = read_debug_block(thread)?;
    let count = block.watchpoint_slots();

    let scan = SlotScan::run(
        count,
        |slot| block.watchpoint_enabled(slot),
        |slot| matches_window(&block, slot, base, bas),
    );
    if scan.existing.is_some() {
        return Err(HwDebugError::AlreadyInstalled(aligned.begin()));
    }
    let slot = scan.free.ok_or_else(|| {
        HwDebugError::ResourceExhausted(format!("No free watchpoint slots ({count} implemented)"))
    })?;

    let raw = DBGWCR_E.with(0, 1);
    let raw = DBGWCR_PAC.with(raw, PRIVILEGE_EL0);
    let raw = DBGWCR_LSC.with(raw, lsc_for(kind));
    block.dbgwvr[slot] = base;
    block.dbgwcr[slot] = to_control(DBGWCR_BAS.with(raw, bas));
    write_debug_block(thread, bytes, &block)?;

    debug!("Installed {kind} watchpoint on {aligned} (requested {range}) in DBGWCR{slot}");
    Ok(WatchpointInstallation {
        range: aligned,
        slot: HardwareSlot::new(slot),
    })
}

pub(super) fn uninstall_watchpoint(thread: &mut impl ThreadRegisterIo, range: AddressRange) -> HwDebugResult<HardwareSlot>
{
    let aligned = align_range(range)?;
    let (base, bas) = watch_registers(&aligned);
    let (bytes, mut block) = read_debug_block(thread)?;

    let scan = SlotScan::run(
        block.watchpoint_slots(),
        |slot| block.watchpoint_enabled(slot),
        |slot| matches_window(&block, slot, base, bas),
    );
    let slot = scan.existing.ok_or(HwDebugError::NotFound(aligned.begin()))?;

    block.dbgwcr[slot] = 0;
    block.dbgwvr[slot] = 0;
    write_debug_block(thread, bytes, &block)?;

    debug!("Removed watchpoint on {aligned} from DBGWCR{slot}");
    Ok(HardwareSlot::new(slot))
}
