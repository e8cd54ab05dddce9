pub mod bptc19696;
pub mod crc;
pub mod golay2087;
pub mod hamming;
pub mod qr1676;
pub mod rs129;
