//! The CIM operating system chain, four levels deep.

use cimbind::design::prelude::*;

pub const NAMESPACE: &str = "ROOT\\Cimv2";

entity! {
    ///
    /// ManagedSystemElement
    ///
    pub struct ManagedSystemElement = "ROOT\\Cimv2:CIM_ManagedSystemElement" {
        caption: Option<String>;
        description / set_description: Option<String>;
        install_date / set_install_date: DateTime<FixedOffset>;
        name: String;
        status: String;
    }
}

entity! {
    /// LogicalElement
    pub struct LogicalElement: ManagedSystemElement = "ROOT\\Cimv2:CIM_LogicalElement" {}
}

entity! {
    ///
    /// OperatingSystem
    ///
    /// `os_type` stays a raw code; the CIM enumeration has no fixed width
    /// across providers.
    ///
    pub struct OperatingSystem: LogicalElement = "ROOT\\Cimv2:CIM_OperatingSystem" {
        creation_class_name: String;
        cs_creation_class_name: String;
        cs_name: String;
        current_time_zone: i16;
        distributed: bool;
        free_physical_memory: u64;
        free_space_in_paging_files: u64;
        free_virtual_memory: u64;
        last_boot_up_time: DateTime<FixedOffset>;
        local_date_time: DateTime<FixedOffset>;
        max_number_of_processes: u32;
        max_process_memory_size: u64;
        number_of_licensed_users: u32;
        number_of_processes: u32;
        number_of_users: u32;
        os_type: u16;
        other_type_description: Option<String>;
        size_stored_in_paging_files: u64;
        total_swap_space_size: u64;
        total_virtual_memory_size: u64;
        total_visible_memory_size: u64;
        version: String;
    }
}

impl OperatingSystem {
    /// Time since the last boot, measured against the system's own clock.
    pub fn uptime(&self) -> Result<chrono::Duration, Error> {
        Ok(self.local_date_time()? - self.last_boot_up_time()?)
    }
}

entity! {
    ///
    /// Win32OperatingSystem
    ///
    /// Remote names with underscores are spelled out; PascalCase
    /// conversion drops them.
    ///
    pub struct Win32OperatingSystem: OperatingSystem = "ROOT\\Cimv2:Win32_OperatingSystem" {
        boot_device: String;
        build_number: String;
        build_type: String;
        code_set: String;
        country_code: String;
        csd_version: Option<String>;
        dep_available: bool => "DataExecutionPrevention_Available";
        dep_32bit_applications: bool => "DataExecutionPrevention_32BitApplications";
        dep_drivers: bool => "DataExecutionPrevention_Drivers";
        dep_support_policy: u8 => "DataExecutionPrevention_SupportPolicy";
        debug: bool;
        encryption_level: u32;
        foreground_application_boost: u8;
        large_system_cache: u32;
        locale: String;
        manufacturer: String;
        mui_languages: Vec<String>;
        operating_system_sku: u32;
        organization: String;
        os_architecture: String;
        os_language: u32;
        os_product_suite: u32;
        pae_enabled: bool;
        plus_product_id: Option<String>;
        plus_version_number: Option<String>;
        portable_operating_system: bool;
        primary: bool;
        product_type: u32;
        registered_user: String;
        serial_number: String;
        service_pack_major_version: u16;
        service_pack_minor_version: u16;
        suite_mask: u32;
        system_device: String;
        system_directory: String;
        system_drive: String;
        windows_directory: String;
        quantum_length: u8;
        quantum_type: u8;
    }
}
