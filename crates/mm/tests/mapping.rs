use std::collections::HashSet;
use std::sync::Arc;

use mm::{
    AddressSpace, DEFAULT_MM_CONFIG, MemPhy, MmError, PageNum, PhysMemory, SimpleMmConfig,
    SpaceId, VmRegion, Vpn, VpnRange,
};

static SMALL_CONFIG: SimpleMmConfig = SimpleMmConfig::new(64, 3);

fn ram(frames: usize, page_size: usize) -> Arc<dyn PhysMemory> {
    Arc::new(MemPhy::new("RAM", frames, page_size))
}

#[test]
fn test_fill_ram_then_out_of_frames() {
    let ram = ram(4, 4096);
    let mut space =
        AddressSpace::new(SpaceId(0), &DEFAULT_MM_CONFIG, Arc::clone(&ram), Vec::new()).unwrap();

    for page in 0..4 {
        let range = space.allocate_and_map(1, Vpn(page)).unwrap();
        assert_eq!(range, VpnRange::from_start_len(Vpn(page), 1));
    }
    let before: Vec<_> = (0..4)
        .map(|p| space.get_entry(Vpn(p)).unwrap().unwrap())
        .collect();
    let frames: HashSet<_> = before.iter().map(|pte| pte.frame().unwrap()).collect();
    assert_eq!(frames.len(), 4);
    assert_eq!(ram.free_frames(), 0);

    assert_eq!(space.allocate_and_map(1, Vpn(4)), Err(MmError::OutOfFrames));
    assert_eq!(space.get_entry(Vpn(4)).unwrap().map(|p| p.is_present()), Some(false));
    for (page, pte) in before.iter().enumerate() {
        assert_eq!(space.get_entry(Vpn(page)).unwrap().as_ref(), Some(pte));
    }
}

#[test]
fn test_fill_ram_in_one_request() {
    let ram = ram(4, 4096);
    let mut space =
        AddressSpace::new(SpaceId(0), &DEFAULT_MM_CONFIG, Arc::clone(&ram), Vec::new()).unwrap();

    let range = space.allocate_and_map(4, Vpn(0)).unwrap();
    assert_eq!(range, VpnRange::from_start_len(Vpn(0), 4));
    let before: Vec<_> = range
        .iter()
        .map(|vpn| space.get_entry(vpn).unwrap().unwrap())
        .collect();
    assert!(before.iter().all(|pte| pte.is_resident()));
    let frames: HashSet<_> = before.iter().map(|pte| pte.frame().unwrap()).collect();
    assert_eq!(frames.len(), 4);
    assert_eq!(space.tracker().iter().collect::<Vec<_>>(), range.iter().collect::<Vec<_>>());
    assert_eq!(ram.free_frames(), 0);

    assert_eq!(space.allocate_and_map(1, Vpn(4)), Err(MmError::OutOfFrames));
    assert_eq!(space.get_entry(Vpn(4)).unwrap().map(|p| p.is_present()), Some(false));
    for (page, pte) in before.iter().enumerate() {
        assert_eq!(space.get_entry(Vpn(page)).unwrap().as_ref(), Some(pte));
    }
}

#[test]
fn test_multi_page_request_is_all_or_nothing() {
    let ram = ram(3, 64);
    let mut space =
        AddressSpace::new(SpaceId(1), &SMALL_CONFIG, Arc::clone(&ram), Vec::new()).unwrap();
    space.allocate_and_map(1, Vpn(0)).unwrap();

    assert_eq!(space.allocate_and_map(3, Vpn(10)), Err(MmError::OutOfFrames));
    assert_eq!(ram.free_frames(), 2);
    for page in 10..13 {
        assert!(space.translate(Vpn(page).start_addr(&SMALL_CONFIG)).is_err());
    }
    assert_eq!(space.tracker().len(), 1);

    space.allocate_and_map(2, Vpn(10)).unwrap();
    assert_eq!(ram.free_frames(), 0);
}

#[test]
fn test_far_apart_pages_do_not_alias() {
    let ram = ram(2, 64);
    let mut space = AddressSpace::new(SpaceId(2), &SMALL_CONFIG, ram, Vec::new()).unwrap();
    // 低 3 位索引相同，只在 PGD 一级不同
    let a = Vpn(0b000_000_000_000_101);
    let b = Vpn(0b110_000_000_000_101);
    space.allocate_and_map(1, a).unwrap();
    assert_eq!(space.get_entry(b).unwrap(), None);

    space.allocate_and_map(1, b).unwrap();
    space.write_byte(a.start_addr(&SMALL_CONFIG), 0x11).unwrap();
    space.write_byte(b.start_addr(&SMALL_CONFIG), 0x22).unwrap();
    assert_eq!(space.read_byte(a.start_addr(&SMALL_CONFIG)).unwrap(), 0x11);
    assert_eq!(space.read_byte(b.start_addr(&SMALL_CONFIG)).unwrap(), 0x22);
}

#[test]
fn test_page_number_beyond_table_is_rejected() {
    let ram = ram(2, 64);
    let mut space = AddressSpace::new(SpaceId(3), &SMALL_CONFIG, ram, Vec::new()).unwrap();
    let max = SMALL_CONFIG_MAX_VPN;
    space.allocate_and_map(1, Vpn(max)).unwrap();
    assert_eq!(
        space.allocate_and_map(1, Vpn(max + 1)),
        Err(MmError::AddressOutOfRange)
    );
    assert_eq!(space.get_entry(Vpn(max + 1)), Err(MmError::AddressOutOfRange));
}

/// 5 级 × 3 位
const SMALL_CONFIG_MAX_VPN: usize = (1 << 15) - 1;

#[test]
fn test_dropping_space_returns_frames() {
    let ram = ram(4, 64);
    let swap: Arc<dyn PhysMemory> = Arc::new(MemPhy::new("SWP0", 4, 64));
    {
        let mut space = AddressSpace::new(
            SpaceId(4),
            &SMALL_CONFIG,
            Arc::clone(&ram),
            vec![Arc::clone(&swap)],
        )
        .unwrap();
        space.allocate_and_map(4, Vpn(0)).unwrap();
        space.swap_out(Vpn(1)).unwrap();
        space.swap_out(Vpn(2)).unwrap();
        assert_eq!(ram.free_frames(), 2);
        assert_eq!(swap.free_frames(), 2);
    }
    assert_eq!(ram.free_frames(), 4);
    assert_eq!(swap.free_frames(), 4);
}

#[test]
fn test_heap_growth_and_region_reuse() {
    let ram = ram(4, 64);
    let mut space = AddressSpace::new(SpaceId(5), &SMALL_CONFIG, ram, Vec::new()).unwrap();

    let grown = space.grow_vma(0, 2).unwrap();
    assert_eq!(grown, VmRegion::new(0, 128));
    space.free_region(0, VmRegion::new(0, 128)).unwrap();

    let a = space.alloc_region(0, 100).unwrap();
    assert_eq!(a, VmRegion::new(0, 100));
    let b = space.alloc_region(0, 28).unwrap();
    assert_eq!(b, VmRegion::new(100, 128));
    assert_eq!(space.alloc_region(0, 1), Err(MmError::NoFreeRegion));

    space.free_region(0, a).unwrap();
    assert_eq!(space.alloc_region(0, 100).unwrap(), a);

    for addr in [0, 63, 64, 127] {
        assert!(space.translate(addr).is_ok());
    }
    assert!(space.translate(128).is_err());
}

#[test]
fn test_dumps_list_mapped_state() {
    let ram = ram(4, 64);
    let mut space = AddressSpace::new(SpaceId(6), &SMALL_CONFIG, ram, Vec::new()).unwrap();
    space.grow_vma(0, 1).unwrap();
    space.allocate_and_map(2, Vpn(0x20)).unwrap();

    let tracker = space.dump_tracker();
    for page in ["va[0x0]", "va[0x20]", "va[0x21]"] {
        assert!(tracker.contains(page), "{tracker}");
    }
    let table = space.dump_page_table();
    assert!(table.contains("pgn[0x21]"), "{table}");
    assert!(space.dump_frames().contains("RAM:"));
    assert!(space.dump_vmas().contains("sbrk=0x40"));
}
