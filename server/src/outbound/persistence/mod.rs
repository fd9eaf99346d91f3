//! Driven adapters for the two stores.

pub mod csv_availability;
pub mod memory_availability;
pub mod memory_records;

pub use csv_availability::CsvAvailabilityStore;
pub use memory_availability::InMemoryAvailabilityStore;
pub use memory_records::InMemoryRecordStore;
