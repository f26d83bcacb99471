pub mod config;
pub mod framer;
pub mod hash;
pub mod pipeline;
pub mod port;

pub use config::{ConfigError, FlowControl, Parity, ReaderConfig};
pub use framer::MrzFramer;
pub use hash::{frame_id, sha256_bytes, to_hex};
pub use pipeline::{spawn_decoder, spawn_reader, PipelineError, RawFrame, ScanEvent};
pub use port::open_port;
