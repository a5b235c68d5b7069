//! Infrastructure layer: concrete transports, the report encoder, the config
//! file and the script input source.

pub mod hid_sender;
pub mod input_source;
pub mod storage;
pub mod transport;
