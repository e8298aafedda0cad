//! End-to-end behaviour of bound declarations against the seeded storage
//! store: reads, writes, identity, enumeration and faults.

mod common;

use chrono::{DateTime, FixedOffset, TimeZone};
use cimbind::{core::error::StoreErrorKind, prelude::*};
use cimbind_schema_storage::prelude::*;
use std::{
    collections::HashSet,
    hash::{BuildHasher, RandomState},
};

mod scenario {
    use cimbind::entity;

    entity! {
        /// Disk declared against a provider version that lacks `FooBar`.
        pub struct Disk = "ROOT\\Microsoft\\Windows\\Storage:MSFT_Disk" {
            size: u64;
            foo_bar: u32;
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn disk_size_reads_through() {
    let (session, seeded) = common::session();
    let disk: scenario::Disk = session
        .open(&seeded.system_disk)
        .expect("system disk should open");

    assert_eq!(disk.size().expect("size should read"), 1_073_741_824);
}

#[test]
fn absent_members_fault_on_first_use_only() {
    let (session, seeded) = common::session();
    let disk: scenario::Disk = session
        .open(&seeded.system_disk)
        .expect("a missing member should not block synthesis");

    let err = disk.foo_bar().expect_err("FooBar is not on the remote class");
    assert_eq!(err.kind, ErrorKind::SchemaMismatch);
    assert_eq!(err.origin, ErrorOrigin::Property);
    assert!(err.message.contains("MSFT_Disk"));
    assert!(err.message.contains("FooBar"));

    // the rest of the type stays usable
    assert_eq!(disk.size().expect("size should still read"), 1_073_741_824);
    assert!(session.report().contains("foo_bar -> FooBar"));
}

#[test]
fn declared_types_convert_on_read() {
    let (session, seeded) = common::session();
    let disk: Disk = session.open(&seeded.system_disk).expect("disk should open");

    assert_eq!(disk.friendly_name().unwrap(), "Msft Virtual Disk");
    assert_eq!(disk.bus_type().unwrap(), BusType::Sata);
    assert_eq!(disk.partition_style().unwrap(), PartitionStyle::Gpt);
    assert_eq!(disk.operational_status().unwrap(), OperationalStatus::Online);
    assert_eq!(disk.offline_reason().unwrap(), None);
    assert!(disk.is_boot().unwrap());
    assert_eq!(disk.base().object_id().unwrap(), "disk-0");

    let data: Disk = session.open(&seeded.data_disk).expect("data disk should open");
    assert_eq!(data.offline_reason().unwrap(), Some(OfflineReason::Policy));
    assert_eq!(data.guid().unwrap(), None);
}

#[test]
fn writes_round_trip_through_declared_conversions() {
    let (session, seeded) = common::session();
    let partition: Partition = session
        .open(&seeded.boot_partition)
        .expect("partition should open");

    partition.set_mbr_type(MbrType::Fat32).unwrap();
    partition.set_is_hidden(true).unwrap();
    assert_eq!(partition.mbr_type().unwrap(), MbrType::Fat32);
    assert!(partition.is_hidden().unwrap());

    let os: ManagedSystemElement = session
        .open(&seeded.operating_system)
        .expect("operating system should open as its root class");
    let installed = FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 11, 3, 17, 45, 10)
        .unwrap();
    os.set_install_date(installed).unwrap();
    os.set_description(Some("primary host".to_string())).unwrap();

    assert_eq!(os.install_date().unwrap(), installed);
    assert_eq!(os.description().unwrap().as_deref(), Some("primary host"));
}

#[test]
fn committed_writes_are_seen_by_new_handles() {
    let (session, seeded) = common::session();
    let volume: Volume = session.open(&seeded.system_volume).unwrap();

    volume.set_file_system_label("Windows".to_string()).unwrap();
    let unsaved: Volume = session.open(&seeded.system_volume).unwrap();
    assert_eq!(unsaved.file_system_label().unwrap(), "System");

    volume.proxy().commit().expect("commit should succeed");
    let saved: Volume = session.open(&seeded.system_volume).unwrap();
    assert_eq!(saved.file_system_label().unwrap(), "Windows");
}

#[test]
fn reload_discards_local_edits() {
    let (session, seeded) = common::session();
    let partition: Partition = session.open(&seeded.efi_partition).unwrap();

    partition.set_is_hidden(true).unwrap();
    partition.proxy().reload().unwrap();

    assert!(!partition.is_hidden().unwrap());
}

#[test]
fn read_only_members_reject_writes() {
    let (session, seeded) = common::session();
    let disk: Disk = session.open(&seeded.system_disk).unwrap();

    let err = disk.proxy().set("size", 1_u64).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Declaration);
}

#[test]
fn remote_name_overrides_and_arrays_bind() {
    let (session, seeded) = common::session();
    let volume: Volume = session.open(&seeded.system_volume).unwrap();

    assert_eq!(volume.volume_path().unwrap(), "\\\\?\\Volume{0b5d6a1e-0002}\\");
    assert_eq!(volume.operational_status().unwrap(), [2]);
    assert_eq!(volume.drive_letter().unwrap(), 'C');
    assert_eq!(volume.drive_type().unwrap(), DriveType::Fixed);
    assert_eq!(volume.dedup_mode().unwrap(), DedupMode::NotAvailable);
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[test]
fn descendant_records_bind_as_ancestors() {
    let (session, seeded) = common::session();
    let object: StorageObject = session
        .open(&seeded.system_disk)
        .expect("a disk is a storage object");

    assert_eq!(object.object_id().unwrap(), "disk-0");
    assert_eq!(object.proxy().class_name().unwrap(), "MSFT_Disk");

    let disk: Disk = object.proxy().upcast().expect("and can be viewed as a disk again");
    assert_eq!(disk.number().unwrap(), 0);
}

#[test]
fn unrelated_records_are_identity_mismatches() {
    let (session, seeded) = common::session();

    let err = session
        .open::<Partition>(&seeded.system_disk)
        .expect_err("a disk is not a partition");
    assert!(err.is_identity_mismatch());
    assert!(err.message.contains("MSFT_Disk"));
}

#[test]
fn equal_paths_mean_equal_proxies() {
    let (session, seeded) = common::session();
    let first: Disk = session.open(&seeded.system_disk).unwrap();
    let second = session
        .factory::<Disk>()
        .unwrap()
        .get_instances_where("ObjectId = 'disk-0'")
        .unwrap()
        .iter()
        .next()
        .expect("one match")
        .unwrap();

    assert_eq!(first, second);
    let hasher = RandomState::new();
    assert_eq!(hasher.hash_one(&first), hasher.hash_one(&second));

    let other: Disk = session.open(&seeded.data_disk).unwrap();
    let set: HashSet<_> = [first, second, other].into_iter().collect();
    assert_eq!(set.len(), 2);
}

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

#[test]
fn enumeration_spans_descendants() {
    let (session, _) = common::session();

    let objects = session.factory::<StorageObject>().unwrap().get_instances().unwrap();
    assert_eq!(objects.count(), 5);

    let disks = session.factory::<Disk>().unwrap().get_instances().unwrap();
    let mut numbers: Vec<u32> = disks.iter().map(|d| d.unwrap().number().unwrap()).collect();
    numbers.sort_unstable();
    assert_eq!(numbers, [0, 1]);
}

#[test]
fn empty_enumeration_terminates_immediately() {
    let (session, _) = common::session();
    let volumes = session
        .factory::<Volume>()
        .unwrap()
        .get_instances_where("FileSystem = 'ReFS'")
        .unwrap();

    assert_eq!(volumes.count(), 0);
    assert!(volumes.iter().next().is_none());
    assert!(volumes.to_vec().unwrap().is_empty());
}

#[test]
fn associations_resolve_both_ends() {
    let (session, _) = common::session();
    let links = session.factory::<DiskToPartition>().unwrap().get_instances().unwrap();

    let mut paths = Vec::new();
    for link in &links {
        let link = link.unwrap();
        assert_eq!(link.disk().unwrap().friendly_name().unwrap(), "Msft Virtual Disk");
        paths.extend(link.partition().unwrap().access_paths().unwrap());
    }

    assert_eq!(links.len(), 2);
    assert!(paths.iter().any(|p| p == "C:\\"));
}

#[test]
fn related_instances_are_typed() {
    let (session, seeded) = common::session();
    let disk: Disk = session.open(&seeded.system_disk).unwrap();

    let mut numbers: Vec<u32> = disk
        .partitions()
        .unwrap()
        .iter()
        .map(|p| p.partition_number().unwrap())
        .collect();
    numbers.sort_unstable();
    assert_eq!(numbers, [1, 2]);

    let data: Disk = session.open(&seeded.data_disk).unwrap();
    assert!(data.partitions().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Store faults
// ---------------------------------------------------------------------------

#[test]
fn unavailable_stores_surface_as_faults() {
    let (store, seeded) = common::connect();
    let session = Session::new(store.clone());
    let disk: Disk = session.open(&seeded.system_disk).unwrap();

    store.set_offline(true);

    let err = disk.size().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Store(StoreErrorKind::Unavailable));
    let err = session.factory::<Disk>().unwrap().get_instances().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Store(StoreErrorKind::Unavailable));

    store.set_offline(false);
    assert_eq!(disk.size().unwrap(), 1_073_741_824);
}

#[test]
fn unknown_paths_are_not_found() {
    let (session, _) = common::session();

    let err = session
        .open::<Disk>("\\\\STORAGE01\\ROOT\\Microsoft\\Windows\\Storage:MSFT_Disk.ObjectId=\"nope\"")
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Store(StoreErrorKind::NotFound));
}

#[test]
fn bad_filters_are_invalid_queries() {
    let (session, _) = common::session();
    let disks = session.factory::<Disk>().unwrap();

    let err = disks.get_instances_where("Colour = 'red'").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Store(StoreErrorKind::InvalidQuery));
}

#[test]
fn timestamps_decode_with_their_offset() {
    let (session, seeded) = common::session();
    let os: OperatingSystem = session.open(&seeded.operating_system).unwrap();

    let boot: DateTime<FixedOffset> = os.last_boot_up_time().unwrap();
    assert_eq!(boot.offset().local_minus_utc(), 3600);
    assert_eq!(boot.to_rfc3339(), "2026-01-01T08:00:00+01:00");
}
