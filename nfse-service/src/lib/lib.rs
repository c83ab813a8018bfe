pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

// Re-export commonly used types
pub use domain::entity;
pub use domain::issuer;
pub use domain::recipient;
pub use domain::role;
pub use domain::user;
pub use outbound::repositories;
