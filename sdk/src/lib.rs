//! litesvm_exp SDK - typed access to the litesvm_exp program
//!
//! Provides:
//! - Provider configuration from the environment
//! - An explicit execution context (cluster + payer + confirmation policy)
//! - Program descriptors loaded from Anchor IDLs
//! - A program handle with one typed call per program method
//! - RPC and LiteSVM cluster backends

pub mod cluster;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod program;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export key types
pub use cluster::{Cluster, RpcCluster};
#[cfg(feature = "litesvm")]
pub use cluster::LiteSvmCluster;
pub use config::ProviderConfig;
pub use context::ExecutionContext;
pub use descriptor::ProgramDescriptor;
pub use error::{Result, SmokeError};
pub use program::ProgramHandle;
pub use types::*;
