//! Storage management classes: objects, disks, partitions, volumes and the
//! disk-to-partition association.

use cimbind::design::prelude::*;

pub const NAMESPACE: &str = "ROOT\\Microsoft\\Windows\\Storage";

/// Output carrying the provider's extended status for storage methods.
pub const EXTENDED_STATUS: &str = "ExtendedStatus";

//
// Enums
//

wire_enum! {
    pub enum BusType: Uint16 {
        Unknown = 0,
        Scsi = 1,
        Atapi = 2,
        Ata = 3,
        Ieee1394 = 4,
        Ssa = 5,
        FibreChannel = 6,
        Usb = 7,
        Raid = 8,
        Iscsi = 9,
        Sas = 10,
        Sata = 11,
        Sd = 12,
        Mmc = 13,
        Virtual = 14,
        FileBackedVirtual = 15,
        StorageSpaces = 16,
        Nvme = 17,
    }
}

wire_enum! {
    pub enum OfflineReason: Uint16 {
        Policy = 1,
        RedundantPath = 2,
        Snapshot = 3,
        Collision = 4,
        ResourceExhaustion = 5,
        CriticalWriteFailures = 6,
        DataIntegrityScanRequired = 7,
    }
}

wire_enum! {
    /// Disk operational state. The 0xD010 range is storage-specific.
    pub enum OperationalStatus: Uint16 {
        Unknown = 0,
        Other = 1,
        Ok = 2,
        Degraded = 3,
        Stressed = 4,
        PredictiveFailure = 5,
        Error = 6,
        NonRecoverableError = 7,
        Starting = 8,
        Stopping = 9,
        Stopped = 10,
        InService = 11,
        NoContact = 12,
        LostCommunication = 13,
        Aborted = 14,
        Dormant = 15,
        SupportingEntityInError = 16,
        Completed = 17,
        Online = 0xD010,
        NotReady = 0xD011,
        NoMedia = 0xD012,
        Offline = 0xD013,
        Failed = 0xD014,
    }
}

wire_enum! {
    pub enum PartitionStyle: Uint16 {
        Unknown = 0,
        Mbr = 1,
        Gpt = 2,
    }
}

wire_enum! {
    pub enum ProvisioningType: Uint16 {
        Unknown = 0,
        Thin = 1,
        Fixed = 2,
    }
}

wire_enum! {
    pub enum HealthStatus: Uint16 {
        Healthy = 0,
        Warning = 1,
        Unhealthy = 2,
    }
}

wire_enum! {
    pub enum MbrType: Uint16 {
        None = 0,
        Fat12 = 1,
        Fat16 = 4,
        Extended = 5,
        Huge = 6,
        Ifs = 7,
        Fat32 = 12,
    }
}

wire_enum! {
    pub enum PartitionStatus: Uint16 {
        Unknown = 0,
        Online = 1,
        NoMedia = 3,
        Offline = 4,
        Failed = 5,
    }
}

wire_enum! {
    pub enum DriveType: Uint16 {
        Unknown = 0,
        InvalidRootPath = 1,
        Removable = 2,
        Fixed = 3,
        Remote = 4,
        CdRom = 5,
        RamDisk = 6,
    }
}

wire_enum! {
    pub enum DedupMode: Uint16 {
        Disabled = 0,
        GeneralPurpose = 1,
        HyperV = 2,
        Backup = 3,
        NotAvailable = 4,
    }
}

entity! {
    ///
    /// StorageObject
    ///
    /// Root of the storage class tree. `ObjectId` is the instance key.
    ///
    pub struct StorageObject = "ROOT\\Microsoft\\Windows\\Storage:MSFT_StorageObject" {
        object_id: String;
        unique_id: String;
        pass_through_ids: String;
        pass_through_server: String;
        pass_through_namespace: String;
        pass_through_class: String;
    }
}

factory! {
    /// StorageObjectFactory
    pub struct StorageObjectFactory for StorageObject {
        new with_object_id(object_id: String);
    }
}

entity! {
    ///
    /// Disk
    ///
    /// Disk properties are read-only; changes go through the provider's
    /// methods, which report their outcome as a status code.
    ///
    pub struct Disk: StorageObject = "ROOT\\Microsoft\\Windows\\Storage:MSFT_Disk" {
        path: String;
        location: String;
        friendly_name: String;
        number: u32;
        serial_number: String;
        firmware_version: String;
        manufacturer: String;
        model: String;
        size: u64;
        allocated_size: u64;
        logical_sector_size: u32;
        physical_sector_size: u32;
        largest_free_extent: u64;
        number_of_partitions: u32;
        provisioning_type: ProvisioningType;
        operational_status: OperationalStatus;
        health_status: HealthStatus;
        bus_type: BusType;
        partition_style: PartitionStyle;
        signature: u32;
        guid: Option<String>;
        is_offline: bool;
        offline_reason: Option<OfflineReason>;
        is_read_only: bool;
        is_system: bool;
        is_clustered: bool;
        is_boot: bool;
        boot_from_disk: bool;
    }
    methods = DISK_METHODS;
}

const DISK_METHODS: &[MethodModel] = &[
    MethodModel::new(
        "set_attributes",
        &[
            ParamModel::input::<bool>("is_read_only"),
            ParamModel::input::<u32>("signature"),
            ParamModel::input::<String>("guid"),
        ],
    )
    .returning::<String>(EXTENDED_STATUS),
    MethodModel::new("refresh", &[]).returning::<String>(EXTENDED_STATUS),
    MethodModel::new("online", &[]).returning::<String>(EXTENDED_STATUS),
    MethodModel::new("offline", &[]).returning::<String>(EXTENDED_STATUS),
    MethodModel::new(
        "initialize",
        &[ParamModel::input::<PartitionStyle>("partition_style")],
    )
    .returning::<String>(EXTENDED_STATUS),
    MethodModel::new(
        "create_partition",
        &[
            ParamModel::input::<u64>("size"),
            ParamModel::input::<bool>("use_maximum_size"),
            ParamModel::input::<u64>("offset"),
            ParamModel::input::<u32>("alignment"),
            ParamModel::input::<char>("drive_letter"),
            ParamModel::input::<bool>("assign_drive_letter"),
            ParamModel::input::<MbrType>("mbr_type"),
            ParamModel::input::<String>("gpt_type"),
            ParamModel::input::<bool>("is_hidden"),
            ParamModel::input::<bool>("is_active"),
            ParamModel::output::<String>("created_partition"),
        ],
    )
    .returning::<String>(EXTENDED_STATUS),
    MethodModel::new(
        "convert_style",
        &[ParamModel::input::<PartitionStyle>("partition_style")],
    )
    .returning::<String>(EXTENDED_STATUS),
];

///
/// PartitionRequest
///
/// Arguments of `Disk::create_partition`. A zero `size` with
/// `use_maximum_size` takes the largest free extent.
///

#[derive(Clone, Debug, Default)]
pub struct PartitionRequest {
    pub size: u64,
    pub use_maximum_size: bool,
    pub offset: u64,
    pub alignment: u32,
    pub drive_letter: Option<char>,
    pub mbr_type: Option<MbrType>,
    pub gpt_type: Option<String>,
    pub is_hidden: bool,
    pub is_active: bool,
}

///
/// CreatedPartition
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreatedPartition {
    pub object_id: String,
    pub extended_status: String,
}

impl Disk {
    pub fn set_attributes(
        &self,
        is_read_only: bool,
        signature: u32,
        guid: &str,
    ) -> Result<String, Error> {
        self.proxy
            .invoke(
                "set_attributes",
                vec![is_read_only.into(), signature.into(), guid.into()],
            )?
            .returned()
    }

    pub fn refresh(&self) -> Result<String, Error> {
        self.proxy.invoke("refresh", Vec::new())?.returned()
    }

    pub fn online(&self) -> Result<String, Error> {
        self.proxy.invoke("online", Vec::new())?.returned()
    }

    pub fn offline(&self) -> Result<String, Error> {
        self.proxy.invoke("offline", Vec::new())?.returned()
    }

    pub fn initialize(&self, style: PartitionStyle) -> Result<String, Error> {
        self.proxy
            .invoke("initialize", vec![style.into_value()])?
            .returned()
    }

    pub fn convert_style(&self, style: PartitionStyle) -> Result<String, Error> {
        self.proxy
            .invoke("convert_style", vec![style.into_value()])?
            .returned()
    }

    pub fn create_partition(&self, request: PartitionRequest) -> Result<CreatedPartition, Error> {
        let args: Vec<Value> = vec![
            request.size.into(),
            request.use_maximum_size.into(),
            request.offset.into(),
            request.alignment.into(),
            request.drive_letter.unwrap_or('\0').into(),
            request.drive_letter.is_some().into(),
            request.mbr_type.unwrap_or(MbrType::None).into_value(),
            request.gpt_type.unwrap_or_default().into(),
            request.is_hidden.into(),
            request.is_active.into(),
        ];
        let outcome = self.proxy.invoke("create_partition", args)?;

        Ok(CreatedPartition {
            object_id: outcome.output("created_partition")?,
            extended_status: outcome.returned()?,
        })
    }

    /// Partitions associated with this disk.
    pub fn partitions(&self) -> Result<Vec<Partition>, Error> {
        self.proxy.related::<Partition>()?.to_vec()
    }
}

factory! {
    ///
    /// DiskFactory
    ///
    pub struct DiskFactory for Disk {
        new with_object_id(object_id: String);
    }
}

entity! {
    ///
    /// Partition
    ///
    pub struct Partition: StorageObject = "ROOT\\Microsoft\\Windows\\Storage:MSFT_Partition" {
        access_paths: Vec<String>;
        disk_id: String;
        disk_number: u32;
        drive_letter: char;
        gpt_type: Option<String>;
        guid: Option<String>;
        is_active: bool;
        is_boot: bool;
        is_dax: bool;
        is_hidden / set_is_hidden: bool;
        is_offline: bool;
        is_read_only: bool;
        is_shadow_copy: bool;
        is_system: bool;
        mbr_type / set_mbr_type: MbrType;
        no_default_drive_letter: bool;
        offset: u64;
        operational_status: PartitionStatus;
        partition_number: u32;
        size: u64;
        transition_state: u16;
    }
    methods = PARTITION_METHODS;
}

const PARTITION_METHODS: &[MethodModel] = &[
    MethodModel::new(
        "add_access_path",
        &[
            ParamModel::input::<String>("access_path"),
            ParamModel::input::<bool>("assign_drive_letter"),
        ],
    ),
    MethodModel::new(
        "remove_access_path",
        &[ParamModel::input::<String>("access_path")],
    ),
    MethodModel::new("online", &[]),
    MethodModel::new("offline", &[]),
    MethodModel::new("resize", &[ParamModel::input::<u64>("size")]),
];

impl Partition {
    pub fn add_access_path(&self, access_path: &str, assign_drive_letter: bool) -> Result<(), Error> {
        self.proxy
            .invoke(
                "add_access_path",
                vec![access_path.into(), assign_drive_letter.into()],
            )
            .map(drop)
    }

    pub fn remove_access_path(&self, access_path: &str) -> Result<(), Error> {
        self.proxy
            .invoke("remove_access_path", vec![access_path.into()])
            .map(drop)
    }

    pub fn online(&self) -> Result<(), Error> {
        self.proxy.invoke("online", Vec::new()).map(drop)
    }

    pub fn offline(&self) -> Result<(), Error> {
        self.proxy.invoke("offline", Vec::new()).map(drop)
    }

    pub fn resize(&self, size: u64) -> Result<(), Error> {
        self.proxy.invoke("resize", vec![size.into()]).map(drop)
    }
}

entity! {
    ///
    /// Volume
    ///
    /// `volume_path` maps onto the remote `Path`, which would otherwise
    /// clash with the system path accessor.
    ///
    pub struct Volume: StorageObject = "ROOT\\Microsoft\\Windows\\Storage:MSFT_Volume" {
        allocation_unit_size: u32;
        dedup_mode: DedupMode;
        drive_letter: char;
        drive_type: DriveType;
        file_system: String;
        file_system_label / set_file_system_label: String;
        file_system_type: u16;
        health_status: HealthStatus;
        operational_status: Vec<u16>;
        volume_path: String => "Path";
        size: u64;
        size_remaining: u64;
    }
}

entity! {
    ///
    /// DiskToPartition
    ///
    /// Association record; both ends are references.
    ///
    pub struct DiskToPartition = "ROOT\\Microsoft\\Windows\\Storage:MSFT_DiskToPartition" {
        disk: Disk;
        partition: Partition;
    }
}
