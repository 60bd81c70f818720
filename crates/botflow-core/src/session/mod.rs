pub mod cache;
pub mod manager;

pub use cache::{MemoryPortCache, PortCache};
pub use manager::{DEBUG_PORT_MAX, DEBUG_PORT_MIN, SessionError, SessionManager};
