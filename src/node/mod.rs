pub mod node;
pub mod genesis;
pub mod service_handle;
pub mod cli;

pub use node::{Node, NodeConfig};
pub use genesis::{GenesisConfig, GenesisInfo};
pub use service_handle::ServiceHandle;
pub use cli::run_cli;
