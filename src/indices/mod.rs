//! Index lifecycle
//!
//! - `provisioner.rs` - create / delete / existence checks
//! - `discovery.rs` - index ages and alias bindings, always re-read
//! - `aliases.rs` - atomic alias repointing
//! - `retention.rs` - age-based sweeping that spares aliased indices
//! - `maintenance.rs` - force-merge and refresh

mod aliases;
mod discovery;
mod maintenance;
mod provisioner;
mod retention;

pub use aliases::AliasCoordinator;
pub use discovery::IndexDiscovery;
pub use maintenance::IndexMaintenance;
pub use provisioner::IndexProvisioner;
pub use retention::RetentionSweeper;
