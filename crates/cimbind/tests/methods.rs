//! Remote method invocation through typed wrappers: status translation,
//! outputs, and provider side effects.

mod common;

use cimbind::{
    core::obs::{MetricsEvent, MetricsSink, with_metrics_sink},
    prelude::*,
};
use cimbind_schema_storage::{prelude::*, seed};
use std::{cell::RefCell, rc::Rc};

#[derive(Default)]
struct Faults(RefCell<Vec<u32>>);

impl MetricsSink for Faults {
    fn record(&self, event: MetricsEvent) {
        if let MetricsEvent::InvokeFault { status, .. } = event {
            self.0.borrow_mut().push(status);
        }
    }
}

#[test]
fn nonzero_status_is_an_invocation_fault() {
    let (session, seeded) = common::session();
    let disk: Disk = session.open(&seeded.data_disk).unwrap();

    let err = disk
        .initialize(PartitionStyle::Gpt)
        .expect_err("the data disk starts offline");

    assert_eq!(err.kind, ErrorKind::InvocationFault { status: seed::DISK_OFFLINE });
    assert_eq!(err.status(), Some(41001));
    assert_eq!(err.origin, ErrorOrigin::Method);
    assert!(err.message.contains("The disk is offline"));
    assert!(err.message.contains("Initialize"));

    // the failed call left the disk untouched
    assert_eq!(disk.partition_style().unwrap(), PartitionStyle::Unknown);
}

#[test]
fn faults_are_reported_to_the_metrics_sink() {
    let (session, seeded) = common::session();
    let disk: Disk = session.open(&seeded.data_disk).unwrap();
    let faults = Rc::new(Faults::default());

    with_metrics_sink(faults.clone(), || {
        let _ = disk.initialize(PartitionStyle::Mbr);
    });

    assert_eq!(faults.0.borrow().as_slice(), [seed::DISK_OFFLINE]);
}

#[test]
fn bringing_a_disk_online_and_partitioning_it() {
    let (session, seeded) = common::session();
    let disk: Disk = session.open(&seeded.data_disk).unwrap();

    assert_eq!(disk.online().expect("online should succeed"), "");
    assert!(!disk.is_offline().unwrap());
    assert_eq!(disk.operational_status().unwrap(), OperationalStatus::Online);
    assert_eq!(disk.offline_reason().unwrap(), None);

    disk.initialize(PartitionStyle::Gpt).expect("raw disk initializes");
    assert_eq!(disk.partition_style().unwrap(), PartitionStyle::Gpt);

    let created = disk
        .create_partition(PartitionRequest {
            use_maximum_size: true,
            drive_letter: Some('E'),
            ..PartitionRequest::default()
        })
        .expect("the whole disk is free");
    assert_eq!(created.object_id, "disk-1-p1");
    assert_eq!(disk.number_of_partitions().unwrap(), 1);
    assert_eq!(disk.largest_free_extent().unwrap(), 0);

    let err = disk
        .create_partition(PartitionRequest {
            size: 1024,
            ..PartitionRequest::default()
        })
        .unwrap_err();
    assert_eq!(err.status(), Some(seed::EXTENT_TOO_SMALL));

    let err = disk.convert_style(PartitionStyle::Mbr).unwrap_err();
    assert_eq!(err.status(), Some(seed::OBJECT_IN_USE));
}

#[test]
fn method_effects_are_committed_server_side() {
    let (session, seeded) = common::session();
    let disk: Disk = session.open(&seeded.system_disk).unwrap();

    disk.set_attributes(true, 0x00C0_FFEE, "{5e1f0c3d-0000-4000-8000-000000000001}")
        .expect("attributes should apply");

    let fresh: Disk = session.open(&seeded.system_disk).unwrap();
    assert!(fresh.is_read_only().unwrap());
    assert_eq!(fresh.signature().unwrap(), 0x00C0_FFEE);

    let err = fresh.initialize(PartitionStyle::Mbr).unwrap_err();
    assert_eq!(err.status(), Some(seed::DISK_READ_ONLY));
}

#[test]
fn offline_round_trip() {
    let (session, seeded) = common::session();
    let disk: Disk = session.open(&seeded.system_disk).unwrap();

    disk.offline().unwrap();
    assert!(disk.is_offline().unwrap());
    assert_eq!(disk.offline_reason().unwrap(), Some(OfflineReason::Policy));
    assert_eq!(disk.operational_status().unwrap(), OperationalStatus::Offline);

    disk.online().unwrap();
    disk.refresh().unwrap();
    assert!(!disk.is_offline().unwrap());
}

#[test]
fn void_methods_check_status_only() {
    let (session, seeded) = common::session();
    let partition: Partition = session.open(&seeded.efi_partition).unwrap();

    partition.add_access_path("E:\\", true).unwrap();
    assert_eq!(partition.drive_letter().unwrap(), 'E');
    assert!(partition.access_paths().unwrap().contains(&"E:\\".to_string()));

    partition.remove_access_path("E:\\").unwrap();
    assert_eq!(partition.drive_letter().unwrap(), '\0');

    let err = partition.remove_access_path("E:\\").unwrap_err();
    assert_eq!(err.status(), Some(seed::NOT_FOUND));
    assert!(err.message.contains("Not Found"));

    let err = partition.resize(0).unwrap_err();
    assert_eq!(err.status(), Some(seed::INVALID_PARAMETER));

    partition.resize(209_715_200).unwrap();
    assert_eq!(partition.size().unwrap(), 209_715_200);

    partition.offline().unwrap();
    assert_eq!(partition.operational_status().unwrap(), PartitionStatus::Offline);
    partition.online().unwrap();
    assert_eq!(partition.operational_status().unwrap(), PartitionStatus::Online);
}

#[test]
fn invoke_by_name_returns_outcomes() {
    let (session, seeded) = common::session();
    let disk: Disk = session.open(&seeded.system_disk).unwrap();

    let outcome = disk
        .proxy()
        .invoke("refresh", Vec::new())
        .expect("refresh succeeds");
    assert_eq!(outcome.returned::<String>().unwrap(), "");

    let err = disk.proxy().invoke("defragment", Vec::new()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Declaration);

    let err = disk
        .proxy()
        .invoke("initialize", Vec::new())
        .expect_err("initialize takes one argument");
    assert_eq!(err.kind, ErrorKind::Declaration);
}
