//! Multi-level declaration chains, system properties, factories and
//! session configuration.

mod common;

use cimbind::prelude::*;
use cimbind_schema_storage::prelude::*;

#[test]
fn four_level_chain_reads_every_level() {
    let (session, seeded) = common::session();
    let os: Win32OperatingSystem = session.open(&seeded.operating_system).unwrap();

    assert_eq!(os.build_number().unwrap(), "20348");
    assert!(os.dep_available().unwrap());
    assert_eq!(os.dep_support_policy().unwrap(), 3);
    assert_eq!(os.mui_languages().unwrap(), ["en-US"]);
    assert_eq!(os.csd_version().unwrap(), None);

    let cim = os.base();
    assert_eq!(cim.cs_name().unwrap(), "STORAGE01");
    assert_eq!(cim.os_type().unwrap(), 18);
    assert_eq!(cim.current_time_zone().unwrap(), 60);
    assert_eq!(cim.uptime().unwrap(), chrono::Duration::minutes(2 * 24 * 60 + 90));

    // inherited accessors are also reachable on the leaf
    assert_eq!(os.cs_name().unwrap(), "STORAGE01");
    assert_eq!(os.status().unwrap(), "OK");

    let root = cim.base().base();
    assert_eq!(
        root.caption().unwrap().as_deref(),
        Some("Microsoft Windows Server 2022 Standard")
    );
    assert_eq!(root.status().unwrap(), "OK");
}

#[test]
fn system_properties_describe_the_record() {
    let (session, seeded) = common::session();
    let os: OperatingSystem = session.open(&seeded.operating_system).unwrap();
    let proxy = os.proxy();

    assert_eq!(proxy.class_name().unwrap(), "Win32_OperatingSystem");
    assert_eq!(proxy.superclass().unwrap().as_deref(), Some("CIM_OperatingSystem"));
    assert_eq!(proxy.dynasty().unwrap(), "CIM_ManagedSystemElement");
    assert_eq!(
        proxy.derivation().unwrap(),
        ["CIM_OperatingSystem", "CIM_LogicalElement", "CIM_ManagedSystemElement"]
    );
    assert_eq!(proxy.namespace().unwrap(), "ROOT\\Cimv2");
    assert_eq!(proxy.server().unwrap(), "STORAGE01");
    assert_eq!(proxy.path().unwrap().as_deref(), Some(seeded.operating_system.as_str()));
}

#[test]
fn shallow_enumeration_skips_descendants() {
    let (store, _) = common::connect();
    let shallow = SessionOptions::from_toml_str("enumerate_deep = false").unwrap();

    let deep = Session::new(store.clone());
    let shallow = Session::with_options(store, shallow);

    let all = deep.factory::<ManagedSystemElement>().unwrap().get_instances().unwrap();
    assert_eq!(all.count(), 1);

    let own = shallow.factory::<ManagedSystemElement>().unwrap().get_instances().unwrap();
    assert!(own.is_empty());
}

#[test]
fn keyed_factories_create_uncommitted_instances() {
    let (store, _) = common::connect();
    let before = store.record_count();
    let session = Session::new(store.clone());

    let disk = DiskFactory::with_object_id(&session, "disk-9".to_string()).unwrap();
    assert_eq!(disk.object_id().unwrap(), "disk-9");
    assert_eq!(disk.size().unwrap(), 0);
    assert_eq!(disk.proxy().path().unwrap(), None);
    assert_eq!(store.record_count(), before);

    let path = disk.proxy().commit().unwrap();
    assert!(path.ends_with("MSFT_Disk.ObjectId=\"disk-9\""));
    assert_eq!(store.record_count(), before + 1);

    let reopened: Disk = session.open(&path).unwrap();
    assert_eq!(reopened, disk);
}

#[test]
fn base_factories_create_base_instances() {
    let (session, _) = common::session();

    let object = StorageObjectFactory::with_object_id(&session, "object-1".to_string()).unwrap();
    assert_eq!(object.proxy().class_name().unwrap(), "MSFT_StorageObject");

    let blank = session.factory::<Partition>().unwrap().create_instance().unwrap();
    assert!(blank.access_paths().unwrap().is_empty());
    assert_eq!(blank.drive_letter().unwrap(), '\0');
}

#[test]
fn uncommitted_instances_compare_by_handle() {
    let (session, _) = common::session();
    let factory = session.factory::<Volume>().unwrap();

    let first = factory.create_instance().unwrap();
    let second = factory.create_instance().unwrap();

    assert_eq!(first, first.clone());
    assert_ne!(first, second);
}

#[test]
fn undefined_options_are_rejected() {
    let err = SessionOptions::from_toml_str("enumerate_everything = true").unwrap_err();

    assert_eq!(err.kind, ErrorKind::Declaration);
}

#[test]
fn reports_describe_synthesized_bindings() {
    let (session, seeded) = common::session();
    let _: Disk = session.open(&seeded.system_disk).unwrap();
    let _ = session.factory_of::<DiskFactory>().unwrap();

    let report = session.report();
    assert!(report.contains("MSFT_Disk"));
    assert!(report.contains("    ro size -> Size : Uint64 [bound Uint64]\n"));
    assert!(report.contains("new with_object_id(ObjectId)"));
}
