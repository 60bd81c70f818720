pub mod node;
pub mod server;
pub mod session;
pub mod task;
pub mod workflow;

pub use node::{Node, NodeData, Position};
pub use server::Server;
pub use session::{ProviderSession, SessionStatus};
pub use task::{BrowserSessionRef, SessionRefKind, Task, TaskStatus};
pub use workflow::{Edge, Workflow};
