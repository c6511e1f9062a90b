//! Role model: principals, their grant records and memberships, and permission resolution.
//! Keep the public surface thin and split implementation across sub-modules.

mod secure_hash;
mod privilege;
mod privileges;
mod granted;
mod properties;
mod principal;
mod resolve;

pub use secure_hash::SecureHash;
pub use privilege::{Permission, Policy, Privilege, Securable, Subject};
pub use privileges::PrivilegeSet;
pub use granted::{GrantedRole, GrantedRoles};
pub use properties::Properties;
pub use principal::{Role, SUPERUSER_NAME};
pub use resolve::{AnyIdent, Exact, IdentMatcher, OidAlias};
