pub mod dfsi_frame_type;
pub mod duid;
