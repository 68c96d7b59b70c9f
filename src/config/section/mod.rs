//! Configuration section definitions.
//!
//! Each module corresponds to a section in `zimvault.toml`:
//!
//! | Module   | TOML Section | Purpose                                  |
//! |----------|--------------|------------------------------------------|
//! | `paths`  | `[paths]`    | Notebook, vault and map dump locations   |
//! | `policy` | `[policy]`   | Folder notes, attachments, ignored files |

mod paths;
mod policy;

pub use paths::PathsConfig;
pub use policy::Policy;
