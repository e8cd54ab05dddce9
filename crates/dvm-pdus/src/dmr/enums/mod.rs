pub mod data_type;
pub mod flco;
pub mod frame_type;
