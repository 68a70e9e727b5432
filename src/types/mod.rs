//! Papyrus data types

mod data_type;

pub use data_type::DataType;
