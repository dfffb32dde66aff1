//! Business logic layer

pub mod directory;
pub mod ownership;
pub mod removal;
pub mod unlink;

pub use directory::IdentityDirectory;
pub use ownership::OwnershipError;
pub use removal::{
    ChainResult, PrivilegedEndpointRemoval, PrivilegedIdentityEndpoint, RemovalChain,
    RemovalStrategy, StoreMutationRemoval,
};
pub use unlink::UnlinkService;
