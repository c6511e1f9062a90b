pub mod error;
pub mod config;
pub mod logging;
pub mod role;
pub mod codec;
pub mod scalar;

pub use error::{AclError, AclResult};
pub use role::{Permission, Policy, Privilege, PrivilegeSet, Role, Securable};
