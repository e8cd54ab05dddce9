//! Over-the-wire frame structures for the DVM FNE audio bridge
//!
//! - DMR: FEC primitives, slot type, EMB, link control, embedded signalling and the DMRD network frame
//! - P25: P25D message header, DFSI voice records and LDU staging buffers

pub mod dmr;
pub mod p25;
