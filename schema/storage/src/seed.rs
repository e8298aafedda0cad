//! Populates a `MemoryStore` with the storage and operating system classes,
//! a small machine's worth of records, and provider-like method bodies.

use crate::{os, storage};
use cimbind::core::{
    store::{ClassSchema, MethodSchema, PropertySet, RETURN_VALUE, StoreError, memory::MemoryStore},
    value::{WireType, WireValue},
};
use tracing::debug;

pub const SERVER: &str = "STORAGE01";

/// Sizes of the seeded system disk and its partitions.
pub const SYSTEM_DISK_SIZE: u64 = 1_073_741_824;
pub const EFI_PARTITION_SIZE: u64 = 104_857_600;
pub const BOOT_PARTITION_SIZE: u64 = 966_787_072;
pub const DATA_DISK_SIZE: u64 = 4_294_967_296;

///
/// STATUS CODES
///

pub const OBJECT_IN_USE: u32 = 41000;
pub const DISK_OFFLINE: u32 = 41001;
pub const DISK_READ_ONLY: u32 = 41006;
pub const EXTENT_TOO_SMALL: u32 = 42007;
pub const INVALID_PARAMETER: u32 = 5;
pub const NOT_FOUND: u32 = 7;
pub const NOT_SUPPORTED: u32 = 1;

///
/// Seeded
/// Paths of the records `seed` inserted.
///

#[derive(Clone, Debug)]
pub struct Seeded {
    pub system_disk: String,
    pub data_disk: String,
    pub efi_partition: String,
    pub boot_partition: String,
    pub system_volume: String,
    pub operating_system: String,
}

/// A fresh store on `SERVER` with everything seeded.
pub fn seeded_store() -> Result<(MemoryStore, Seeded), StoreError> {
    let store = MemoryStore::new(SERVER);
    let seeded = seed(&store)?;

    Ok((store, seeded))
}

///
/// seed
///
/// Define the classes, install the method bodies and insert the records.
/// The system disk is online and partitioned; the data disk is raw and
/// offline by policy.
///
pub fn seed(store: &MemoryStore) -> Result<Seeded, StoreError> {
    define_storage(store);
    define_os(store);
    install_disk_methods(store);
    install_partition_methods(store);

    let system_disk = store.insert(
        &class(storage::NAMESPACE, "MSFT_Disk"),
        [
            ("ObjectId", text("disk-0")),
            ("UniqueId", text("6002248051A4C7E8B1D9F4B0C2A1E3F5")),
            ("Path", text("\\\\?\\scsi#disk&ven_msft&prod_virtual_disk#0")),
            ("Location", text("Integrated : Adapter 0 : Port 0 : Target 0 : LUN 0")),
            ("FriendlyName", text("Msft Virtual Disk")),
            ("Number", WireValue::Uint32(0)),
            ("SerialNumber", text("VD-0001")),
            ("FirmwareVersion", text("1.0")),
            ("Manufacturer", text("Msft")),
            ("Model", text("Virtual Disk")),
            ("Size", WireValue::Uint64(SYSTEM_DISK_SIZE)),
            ("AllocatedSize", WireValue::Uint64(SYSTEM_DISK_SIZE)),
            ("LogicalSectorSize", WireValue::Uint32(512)),
            ("PhysicalSectorSize", WireValue::Uint32(4096)),
            ("LargestFreeExtent", WireValue::Uint64(0)),
            ("NumberOfPartitions", WireValue::Uint32(2)),
            ("ProvisioningType", WireValue::Uint16(2)),
            ("OperationalStatus", WireValue::Uint16(0xD010)),
            ("HealthStatus", WireValue::Uint16(0)),
            ("BusType", WireValue::Uint16(11)),
            ("PartitionStyle", WireValue::Uint16(2)),
            ("Signature", WireValue::Uint32(0)),
            ("Guid", text("{3f1c9e2a-5b7d-4c8e-9a0f-1d2e3c4b5a69}")),
            ("IsOffline", WireValue::Boolean(false)),
            ("IsReadOnly", WireValue::Boolean(false)),
            ("IsSystem", WireValue::Boolean(true)),
            ("IsClustered", WireValue::Boolean(false)),
            ("IsBoot", WireValue::Boolean(true)),
            ("BootFromDisk", WireValue::Boolean(true)),
        ],
    )?;

    let data_disk = store.insert(
        &class(storage::NAMESPACE, "MSFT_Disk"),
        [
            ("ObjectId", text("disk-1")),
            ("UniqueId", text("6002248051A4C7E8B1D9F4B0C2A1E3F6")),
            ("Path", text("\\\\?\\usbstor#disk&ven_generic&prod_flash#1")),
            ("FriendlyName", text("Generic Flash Disk")),
            ("Number", WireValue::Uint32(1)),
            ("Manufacturer", text("Generic")),
            ("Model", text("Flash Disk")),
            ("Size", WireValue::Uint64(DATA_DISK_SIZE)),
            ("AllocatedSize", WireValue::Uint64(0)),
            ("LogicalSectorSize", WireValue::Uint32(512)),
            ("PhysicalSectorSize", WireValue::Uint32(512)),
            ("LargestFreeExtent", WireValue::Uint64(DATA_DISK_SIZE)),
            ("NumberOfPartitions", WireValue::Uint32(0)),
            ("ProvisioningType", WireValue::Uint16(2)),
            ("OperationalStatus", WireValue::Uint16(0xD013)),
            ("HealthStatus", WireValue::Uint16(0)),
            ("BusType", WireValue::Uint16(7)),
            ("PartitionStyle", WireValue::Uint16(0)),
            ("IsOffline", WireValue::Boolean(true)),
            ("OfflineReason", WireValue::Uint16(1)),
        ],
    )?;

    let efi_partition = store.insert(
        &class(storage::NAMESPACE, "MSFT_Partition"),
        [
            ("ObjectId", text("disk-0-p1")),
            ("DiskId", text("disk-0")),
            ("DiskNumber", WireValue::Uint32(0)),
            ("PartitionNumber", WireValue::Uint32(1)),
            ("DriveLetter", WireValue::Char16('\0')),
            ("AccessPaths", strings(&["\\\\?\\Volume{0b5d6a1e-0001}\\"])),
            ("GptType", text("{c12a7328-f81f-11d2-ba4b-00a0c93ec93b}")),
            ("Offset", WireValue::Uint64(1_048_576)),
            ("Size", WireValue::Uint64(EFI_PARTITION_SIZE)),
            ("IsSystem", WireValue::Boolean(true)),
            ("OperationalStatus", WireValue::Uint16(1)),
            ("MbrType", WireValue::Uint16(0)),
        ],
    )?;

    let boot_partition = store.insert(
        &class(storage::NAMESPACE, "MSFT_Partition"),
        [
            ("ObjectId", text("disk-0-p2")),
            ("DiskId", text("disk-0")),
            ("DiskNumber", WireValue::Uint32(0)),
            ("PartitionNumber", WireValue::Uint32(2)),
            ("DriveLetter", WireValue::Char16('C')),
            ("AccessPaths", strings(&["C:\\", "\\\\?\\Volume{0b5d6a1e-0002}\\"])),
            ("GptType", text("{ebd0a0a2-b9e5-4433-87c0-68b6b72699c7}")),
            ("Offset", WireValue::Uint64(105_906_176)),
            ("Size", WireValue::Uint64(BOOT_PARTITION_SIZE)),
            ("IsBoot", WireValue::Boolean(true)),
            ("OperationalStatus", WireValue::Uint16(1)),
            ("MbrType", WireValue::Uint16(0)),
        ],
    )?;

    let system_volume = store.insert(
        &class(storage::NAMESPACE, "MSFT_Volume"),
        [
            ("ObjectId", text("volume-c")),
            ("AllocationUnitSize", WireValue::Uint32(4096)),
            ("DedupMode", WireValue::Uint16(4)),
            ("DriveLetter", WireValue::Char16('C')),
            ("DriveType", WireValue::Uint16(3)),
            ("FileSystem", text("NTFS")),
            ("FileSystemLabel", text("System")),
            ("FileSystemType", WireValue::Uint16(14)),
            ("HealthStatus", WireValue::Uint16(0)),
            ("OperationalStatus", WireValue::Array(vec![WireValue::Uint16(2)])),
            ("Path", text("\\\\?\\Volume{0b5d6a1e-0002}\\")),
            ("Size", WireValue::Uint64(BOOT_PARTITION_SIZE)),
            ("SizeRemaining", WireValue::Uint64(412_090_368)),
        ],
    )?;

    for partition in [&efi_partition, &boot_partition] {
        store.insert(
            &class(storage::NAMESPACE, "MSFT_DiskToPartition"),
            [
                ("Disk", WireValue::Reference(system_disk.clone())),
                ("Partition", WireValue::Reference(partition.clone())),
            ],
        )?;
        store.associate(&system_disk, partition);
    }
    store.associate(&boot_partition, &system_volume);

    let operating_system = seed_os(store)?;

    debug!(server = SERVER, records = store.record_count(), "seeded storage store");

    Ok(Seeded {
        system_disk,
        data_disk,
        efi_partition,
        boot_partition,
        system_volume,
        operating_system,
    })
}

fn seed_os(store: &MemoryStore) -> Result<String, StoreError> {
    store.insert(
        &class(os::NAMESPACE, "Win32_OperatingSystem"),
        [
            ("Name", text("Microsoft Windows Server 2022 Standard|C:\\Windows|\\Device\\Harddisk0\\Partition2")),
            ("Caption", text("Microsoft Windows Server 2022 Standard")),
            ("Status", text("OK")),
            ("InstallDate", WireValue::DateTime("20250610120000.000000+060".to_string())),
            ("CreationClassName", text("Win32_OperatingSystem")),
            ("CSCreationClassName", text("Win32_ComputerSystem")),
            ("CSName", text(SERVER)),
            ("CurrentTimeZone", WireValue::Sint16(60)),
            ("Distributed", WireValue::Boolean(false)),
            ("FreePhysicalMemory", WireValue::Uint64(2_097_152)),
            ("FreeSpaceInPagingFiles", WireValue::Uint64(1_048_576)),
            ("FreeVirtualMemory", WireValue::Uint64(3_145_728)),
            ("LastBootUpTime", WireValue::DateTime("20260101080000.000000+060".to_string())),
            ("LocalDateTime", WireValue::DateTime("20260103093000.000000+060".to_string())),
            ("MaxNumberOfProcesses", WireValue::Uint32(u32::MAX)),
            ("MaxProcessMemorySize", WireValue::Uint64(137_438_953_344)),
            ("NumberOfProcesses", WireValue::Uint32(112)),
            ("NumberOfUsers", WireValue::Uint32(2)),
            ("OSType", WireValue::Uint16(18)),
            ("SizeStoredInPagingFiles", WireValue::Uint64(1_310_720)),
            ("TotalVirtualMemorySize", WireValue::Uint64(5_505_024)),
            ("TotalVisibleMemorySize", WireValue::Uint64(4_194_304)),
            ("Version", text("10.0.20348")),
            ("BootDevice", text("\\Device\\HarddiskVolume1")),
            ("BuildNumber", text("20348")),
            ("BuildType", text("Multiprocessor Free")),
            ("CodeSet", text("1252")),
            ("CountryCode", text("1")),
            ("DataExecutionPrevention_Available", WireValue::Boolean(true)),
            ("DataExecutionPrevention_32BitApplications", WireValue::Boolean(true)),
            ("DataExecutionPrevention_Drivers", WireValue::Boolean(true)),
            ("DataExecutionPrevention_SupportPolicy", WireValue::Uint8(3)),
            ("Locale", text("0409")),
            ("Manufacturer", text("Microsoft Corporation")),
            ("MUILanguages", strings(&["en-US"])),
            ("OperatingSystemSKU", WireValue::Uint32(7)),
            ("OSArchitecture", text("64-bit")),
            ("OSLanguage", WireValue::Uint32(1033)),
            ("OSProductSuite", WireValue::Uint32(272)),
            ("Primary", WireValue::Boolean(true)),
            ("ProductType", WireValue::Uint32(3)),
            ("RegisteredUser", text("Windows User")),
            ("SerialNumber", text("00454-20000-00000-AA000")),
            ("SystemDevice", text("\\Device\\HarddiskVolume2")),
            ("SystemDirectory", text("C:\\Windows\\system32")),
            ("SystemDrive", text("C:")),
            ("WindowsDirectory", text("C:\\Windows")),
        ],
    )
}

// ----------------------------------------------------------------------
// Schema
// ----------------------------------------------------------------------

fn define_storage(store: &MemoryStore) {
    let ns = storage::NAMESPACE;

    store.define(
        ClassSchema::new(ns, "MSFT_StorageObject")
            .with_key("ObjectId", WireType::String)
            .with_property("UniqueId", WireType::String)
            .with_property("PassThroughIds", WireType::String)
            .with_property("PassThroughServer", WireType::String)
            .with_property("PassThroughNamespace", WireType::String)
            .with_property("PassThroughClass", WireType::String),
    );

    let disk = properties(
        ClassSchema::new(ns, "MSFT_Disk").with_parent("MSFT_StorageObject"),
        &[
            ("Path", WireType::String),
            ("Location", WireType::String),
            ("FriendlyName", WireType::String),
            ("Number", WireType::Uint32),
            ("SerialNumber", WireType::String),
            ("FirmwareVersion", WireType::String),
            ("Manufacturer", WireType::String),
            ("Model", WireType::String),
            ("Size", WireType::Uint64),
            ("AllocatedSize", WireType::Uint64),
            ("LogicalSectorSize", WireType::Uint32),
            ("PhysicalSectorSize", WireType::Uint32),
            ("LargestFreeExtent", WireType::Uint64),
            ("NumberOfPartitions", WireType::Uint32),
            ("ProvisioningType", WireType::Uint16),
            ("OperationalStatus", WireType::Uint16),
            ("HealthStatus", WireType::Uint16),
            ("BusType", WireType::Uint16),
            ("PartitionStyle", WireType::Uint16),
            ("Signature", WireType::Uint32),
            ("Guid", WireType::String),
            ("IsOffline", WireType::Boolean),
            ("OfflineReason", WireType::Uint16),
            ("IsReadOnly", WireType::Boolean),
            ("IsSystem", WireType::Boolean),
            ("IsClustered", WireType::Boolean),
            ("IsBoot", WireType::Boolean),
            ("BootFromDisk", WireType::Boolean),
        ],
    );
    store.define(
        disk.with_method(
            storage_method("SetAttributes")
                .input("IsReadOnly", WireType::Boolean)
                .input("Signature", WireType::Uint32)
                .input("Guid", WireType::String),
        )
        .with_method(storage_method("Refresh"))
        .with_method(storage_method("Online"))
        .with_method(storage_method("Offline"))
        .with_method(storage_method("Initialize").input("PartitionStyle", WireType::Uint16))
        .with_method(
            storage_method("CreatePartition")
                .input("Size", WireType::Uint64)
                .input("UseMaximumSize", WireType::Boolean)
                .input("Offset", WireType::Uint64)
                .input("Alignment", WireType::Uint32)
                .input("DriveLetter", WireType::Char16)
                .input("AssignDriveLetter", WireType::Boolean)
                .input("MbrType", WireType::Uint16)
                .input("GptType", WireType::String)
                .input("IsHidden", WireType::Boolean)
                .input("IsActive", WireType::Boolean)
                .output("CreatedPartition", WireType::String),
        )
        .with_method(storage_method("ConvertStyle").input("PartitionStyle", WireType::Uint16)),
    );

    let partition = properties(
        ClassSchema::new(ns, "MSFT_Partition")
            .with_parent("MSFT_StorageObject")
            .with_array("AccessPaths", WireType::String),
        &[
            ("DiskId", WireType::String),
            ("DiskNumber", WireType::Uint32),
            ("DriveLetter", WireType::Char16),
            ("GptType", WireType::String),
            ("Guid", WireType::String),
            ("IsActive", WireType::Boolean),
            ("IsBoot", WireType::Boolean),
            ("IsDAX", WireType::Boolean),
            ("IsHidden", WireType::Boolean),
            ("IsOffline", WireType::Boolean),
            ("IsReadOnly", WireType::Boolean),
            ("IsShadowCopy", WireType::Boolean),
            ("IsSystem", WireType::Boolean),
            ("MbrType", WireType::Uint16),
            ("NoDefaultDriveLetter", WireType::Boolean),
            ("Offset", WireType::Uint64),
            ("OperationalStatus", WireType::Uint16),
            ("PartitionNumber", WireType::Uint32),
            ("Size", WireType::Uint64),
            ("TransitionState", WireType::Uint16),
        ],
    );
    store.define(
        partition
            .with_method(
                MethodSchema::new("AddAccessPath")
                    .input("AccessPath", WireType::String)
                    .input("AssignDriveLetter", WireType::Boolean)
                    .output(RETURN_VALUE, WireType::Uint32),
            )
            .with_method(
                MethodSchema::new("RemoveAccessPath")
                    .input("AccessPath", WireType::String)
                    .output(RETURN_VALUE, WireType::Uint32),
            )
            .with_method(MethodSchema::new("Online").output(RETURN_VALUE, WireType::Uint32))
            .with_method(MethodSchema::new("Offline").output(RETURN_VALUE, WireType::Uint32))
            .with_method(
                MethodSchema::new("Resize")
                    .input("Size", WireType::Uint64)
                    .output(RETURN_VALUE, WireType::Uint32),
            ),
    );

    store.define(properties(
        ClassSchema::new(ns, "MSFT_Volume")
            .with_parent("MSFT_StorageObject")
            .with_array("OperationalStatus", WireType::Uint16),
        &[
            ("AllocationUnitSize", WireType::Uint32),
            ("DedupMode", WireType::Uint16),
            ("DriveLetter", WireType::Char16),
            ("DriveType", WireType::Uint16),
            ("FileSystem", WireType::String),
            ("FileSystemLabel", WireType::String),
            ("FileSystemType", WireType::Uint16),
            ("HealthStatus", WireType::Uint16),
            ("Path", WireType::String),
            ("Size", WireType::Uint64),
            ("SizeRemaining", WireType::Uint64),
        ],
    ));

    store.define(
        ClassSchema::new(ns, "MSFT_DiskToPartition")
            .with_key("Disk", WireType::Reference)
            .with_key("Partition", WireType::Reference),
    );
}

fn define_os(store: &MemoryStore) {
    let ns = os::NAMESPACE;

    store.define(
        ClassSchema::new(ns, "CIM_ManagedSystemElement")
            .with_key("Name", WireType::String)
            .with_property("Caption", WireType::String)
            .with_property("Description", WireType::String)
            .with_property("InstallDate", WireType::DateTime)
            .with_property("Status", WireType::String),
    );
    store.define(ClassSchema::new(ns, "CIM_LogicalElement").with_parent("CIM_ManagedSystemElement"));
    store.define(properties(
        ClassSchema::new(ns, "CIM_OperatingSystem").with_parent("CIM_LogicalElement"),
        &[
            ("CreationClassName", WireType::String),
            ("CSCreationClassName", WireType::String),
            ("CSName", WireType::String),
            ("CurrentTimeZone", WireType::Sint16),
            ("Distributed", WireType::Boolean),
            ("FreePhysicalMemory", WireType::Uint64),
            ("FreeSpaceInPagingFiles", WireType::Uint64),
            ("FreeVirtualMemory", WireType::Uint64),
            ("LastBootUpTime", WireType::DateTime),
            ("LocalDateTime", WireType::DateTime),
            ("MaxNumberOfProcesses", WireType::Uint32),
            ("MaxProcessMemorySize", WireType::Uint64),
            ("NumberOfLicensedUsers", WireType::Uint32),
            ("NumberOfProcesses", WireType::Uint32),
            ("NumberOfUsers", WireType::Uint32),
            ("OSType", WireType::Uint16),
            ("OtherTypeDescription", WireType::String),
            ("SizeStoredInPagingFiles", WireType::Uint64),
            ("TotalSwapSpaceSize", WireType::Uint64),
            ("TotalVirtualMemorySize", WireType::Uint64),
            ("TotalVisibleMemorySize", WireType::Uint64),
            ("Version", WireType::String),
        ],
    ));
    store.define(properties(
        ClassSchema::new(ns, "Win32_OperatingSystem")
            .with_parent("CIM_OperatingSystem")
            .with_array("MUILanguages", WireType::String),
        &[
            ("BootDevice", WireType::String),
            ("BuildNumber", WireType::String),
            ("BuildType", WireType::String),
            ("CodeSet", WireType::String),
            ("CountryCode", WireType::String),
            ("CSDVersion", WireType::String),
            ("DataExecutionPrevention_Available", WireType::Boolean),
            ("DataExecutionPrevention_32BitApplications", WireType::Boolean),
            ("DataExecutionPrevention_Drivers", WireType::Boolean),
            ("DataExecutionPrevention_SupportPolicy", WireType::Uint8),
            ("Debug", WireType::Boolean),
            ("EncryptionLevel", WireType::Uint32),
            ("ForegroundApplicationBoost", WireType::Uint8),
            ("LargeSystemCache", WireType::Uint32),
            ("Locale", WireType::String),
            ("Manufacturer", WireType::String),
            ("OperatingSystemSKU", WireType::Uint32),
            ("Organization", WireType::String),
            ("OSArchitecture", WireType::String),
            ("OSLanguage", WireType::Uint32),
            ("OSProductSuite", WireType::Uint32),
            ("PAEEnabled", WireType::Boolean),
            ("PlusProductID", WireType::String),
            ("PlusVersionNumber", WireType::String),
            ("PortableOperatingSystem", WireType::Boolean),
            ("Primary", WireType::Boolean),
            ("ProductType", WireType::Uint32),
            ("RegisteredUser", WireType::String),
            ("SerialNumber", WireType::String),
            ("ServicePackMajorVersion", WireType::Uint16),
            ("ServicePackMinorVersion", WireType::Uint16),
            ("SuiteMask", WireType::Uint32),
            ("SystemDevice", WireType::String),
            ("SystemDirectory", WireType::String),
            ("SystemDrive", WireType::String),
            ("WindowsDirectory", WireType::String),
            ("QuantumLength", WireType::Uint8),
            ("QuantumType", WireType::Uint8),
        ],
    ));
}

// ----------------------------------------------------------------------
// Method bodies
// ----------------------------------------------------------------------

fn install_disk_methods(store: &MemoryStore) {
    let disk = class(storage::NAMESPACE, "MSFT_Disk");

    store.on_invoke(&disk, "SetAttributes", |props, inputs| {
        if flag(props, "IsOffline") {
            return Ok(status(DISK_OFFLINE));
        }
        for name in ["IsReadOnly", "Signature", "Guid"] {
            if let Some(value) = inputs.get(name).filter(|v| !v.is_null()) {
                props.insert(name, value.clone());
            }
        }

        Ok(status(0))
    });

    store.on_invoke(&disk, "Refresh", |_, _| Ok(status(0)));

    store.on_invoke(&disk, "Online", |props, _| {
        props.insert("IsOffline", WireValue::Boolean(false));
        props.insert("OfflineReason", WireValue::Null);
        props.insert("OperationalStatus", WireValue::Uint16(0xD010));

        Ok(status(0))
    });

    store.on_invoke(&disk, "Offline", |props, _| {
        props.insert("IsOffline", WireValue::Boolean(true));
        props.insert("OfflineReason", WireValue::Uint16(1));
        props.insert("OperationalStatus", WireValue::Uint16(0xD013));

        Ok(status(0))
    });

    store.on_invoke(&disk, "Initialize", |props, inputs| {
        if let Some(code) = writable(props) {
            return Ok(status(code));
        }
        if number(props, "PartitionStyle") != 0 {
            return Ok(status(OBJECT_IN_USE));
        }
        let style = number(inputs, "PartitionStyle");
        if !(1..=2).contains(&style) {
            return Ok(status(INVALID_PARAMETER));
        }
        props.insert("PartitionStyle", WireValue::Uint16(narrow(style)));

        Ok(status(0))
    });

    store.on_invoke(&disk, "ConvertStyle", |props, inputs| {
        if let Some(code) = writable(props) {
            return Ok(status(code));
        }
        if number(props, "NumberOfPartitions") != 0 {
            return Ok(status(OBJECT_IN_USE));
        }
        let style = number(inputs, "PartitionStyle");
        if !(1..=2).contains(&style) {
            return Ok(status(INVALID_PARAMETER));
        }
        props.insert("PartitionStyle", WireValue::Uint16(narrow(style)));

        Ok(status(0))
    });

    store.on_invoke(&disk, "CreatePartition", |props, inputs| {
        if let Some(code) = writable(props) {
            return Ok(status(code));
        }
        if number(props, "PartitionStyle") == 0 {
            return Ok(status(NOT_SUPPORTED));
        }

        let free = number(props, "LargestFreeExtent");
        let size = if flag(inputs, "UseMaximumSize") {
            free
        } else {
            number(inputs, "Size")
        };
        if size == 0 || size > free {
            return Ok(status(EXTENT_TOO_SMALL));
        }

        let count = number(props, "NumberOfPartitions") + 1;
        let disk_id = props
            .get("ObjectId")
            .and_then(WireValue::as_text)
            .unwrap_or_default()
            .to_string();
        props.insert("LargestFreeExtent", WireValue::Uint64(free - size));
        props.insert(
            "NumberOfPartitions",
            WireValue::Uint32(u32::try_from(count).unwrap_or(u32::MAX)),
        );

        Ok(status(0).with("CreatedPartition", WireValue::String(format!("{disk_id}-p{count}"))))
    });
}

fn install_partition_methods(store: &MemoryStore) {
    let partition = class(storage::NAMESPACE, "MSFT_Partition");

    store.on_invoke(&partition, "AddAccessPath", |props, inputs| {
        let Some(path) = inputs.get("AccessPath").and_then(WireValue::as_text) else {
            return Ok(status(INVALID_PARAMETER));
        };
        let mut paths = access_paths(props);
        if !paths.iter().any(|p| p.eq_ignore_ascii_case(path)) {
            paths.push(path.to_string());
        }
        if flag(inputs, "AssignDriveLetter")
            && let Some(letter) = drive_letter(path)
        {
            props.insert("DriveLetter", WireValue::Char16(letter));
        }
        props.insert("AccessPaths", strings_owned(paths));

        Ok(status(0))
    });

    store.on_invoke(&partition, "RemoveAccessPath", |props, inputs| {
        let Some(path) = inputs.get("AccessPath").and_then(WireValue::as_text) else {
            return Ok(status(INVALID_PARAMETER));
        };
        let mut paths = access_paths(props);
        let before = paths.len();
        paths.retain(|p| !p.eq_ignore_ascii_case(path));
        if paths.len() == before {
            return Ok(status(NOT_FOUND));
        }
        if let Some(letter) = drive_letter(path)
            && props.get("DriveLetter") == Some(&WireValue::Char16(letter))
        {
            props.insert("DriveLetter", WireValue::Char16('\0'));
        }
        props.insert("AccessPaths", strings_owned(paths));

        Ok(status(0))
    });

    store.on_invoke(&partition, "Online", |props, _| {
        props.insert("IsOffline", WireValue::Boolean(false));
        props.insert("OperationalStatus", WireValue::Uint16(1));

        Ok(status(0))
    });

    store.on_invoke(&partition, "Offline", |props, _| {
        props.insert("IsOffline", WireValue::Boolean(true));
        props.insert("OperationalStatus", WireValue::Uint16(4));

        Ok(status(0))
    });

    store.on_invoke(&partition, "Resize", |props, inputs| {
        let size = number(inputs, "Size");
        if size == 0 {
            return Ok(status(INVALID_PARAMETER));
        }
        props.insert("Size", WireValue::Uint64(size));

        Ok(status(0))
    });
}

// ----------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------

fn class(namespace: &str, name: &str) -> String {
    format!("{namespace}:{name}")
}

fn storage_method(name: &str) -> MethodSchema {
    MethodSchema::new(name)
        .output(RETURN_VALUE, WireType::Uint32)
        .output(storage::EXTENDED_STATUS, WireType::String)
}

fn properties(mut schema: ClassSchema, props: &[(&str, WireType)]) -> ClassSchema {
    for (name, wire) in props {
        schema = schema.with_property(*name, *wire);
    }

    schema
}

fn text(s: &str) -> WireValue {
    WireValue::String(s.to_string())
}

fn strings(items: &[&str]) -> WireValue {
    WireValue::Array(items.iter().map(|s| text(s)).collect())
}

fn strings_owned(items: Vec<String>) -> WireValue {
    WireValue::Array(items.into_iter().map(WireValue::String).collect())
}

fn status(code: u32) -> PropertySet {
    PropertySet::new()
        .with(RETURN_VALUE, WireValue::Uint32(code))
        .with(storage::EXTENDED_STATUS, WireValue::String(String::new()))
}

fn flag(set: &PropertySet, name: &str) -> bool {
    matches!(set.get(name), Some(WireValue::Boolean(true)))
}

fn number(set: &PropertySet, name: &str) -> u64 {
    set.get(name)
        .and_then(WireValue::as_i128)
        .and_then(|v| u64::try_from(v).ok())
        .unwrap_or(0)
}

fn narrow(value: u64) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

// status code that blocks a write, if any
fn writable(props: &PropertySet) -> Option<u32> {
    if flag(props, "IsOffline") {
        Some(DISK_OFFLINE)
    } else if flag(props, "IsReadOnly") {
        Some(DISK_READ_ONLY)
    } else {
        None
    }
}

fn access_paths(props: &PropertySet) -> Vec<String> {
    match props.get("AccessPaths") {
        Some(WireValue::Array(items)) => items
            .iter()
            .filter_map(WireValue::as_text)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

// "X:\" names a drive letter
fn drive_letter(path: &str) -> Option<char> {
    let mut chars = path.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;

    (chars.as_str() == ":\\").then(|| letter.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeding_inserts_every_record() {
        let (store, seeded) = seeded_store().expect("seed");

        // two disks, two partitions, one volume, two links, one os
        assert_eq!(store.record_count(), 8);
        assert!(seeded.system_disk.ends_with("MSFT_Disk.ObjectId=\"disk-0\""));
        assert!(seeded.operating_system.contains("Win32_OperatingSystem.Name="));
    }

    #[test]
    fn drive_letters_come_from_root_paths() {
        assert_eq!(drive_letter("e:\\"), Some('E'));
        assert_eq!(drive_letter("C:\\Windows"), None);
        assert_eq!(drive_letter("\\\\?\\Volume{1}\\"), None);
    }

    #[test]
    fn write_guards_prefer_offline() {
        let props = PropertySet::new()
            .with("IsOffline", WireValue::Boolean(true))
            .with("IsReadOnly", WireValue::Boolean(true));

        assert_eq!(writable(&props), Some(DISK_OFFLINE));
        assert_eq!(writable(&PropertySet::new()), None);
    }
}
