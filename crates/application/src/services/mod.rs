mod host_override_table;

pub use host_override_table::HostOverrideTable;
