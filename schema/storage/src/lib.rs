//! Sample declarations over the storage management and CIM operating system
//! classes, plus a `MemoryStore` seeded with a matching schema.

pub mod os;
pub mod seed;
pub mod storage;

pub use seed::{Seeded, seed, seeded_store};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        os::{LogicalElement, ManagedSystemElement, OperatingSystem, Win32OperatingSystem},
        storage::{
            BusType, CreatedPartition, DedupMode, Disk, DiskFactory, DiskToPartition, DriveType,
            HealthStatus, MbrType, OfflineReason, OperationalStatus, Partition, PartitionRequest,
            PartitionStatus, PartitionStyle, ProvisioningType, StorageObject,
            StorageObjectFactory, Volume,
        },
    };
}
