pub mod emb;
pub mod embedded_data;
pub mod lc;
pub mod privacy_lc;
pub mod slot_type;
pub mod sync;
