//! # GrihaNav: Room-Mission Planning and Execution
//!
//! GrihaNav plans routes for a mobile agent through a semantically labeled
//! indoor grid and executes them by dispatching specialized behaviors
//! (navigate, traverse a doorway, scan a room, follow a wall) to
//! sub-agents behind a common capability contract.
//!
//! ## Architecture
//!
//! - [`house`]: the semantic grid, tile registry, and room registry
//! - [`planning`]: constrained A* search and the room-to-room planner
//! - [`mission`]: route compilation, mission documents, and the executor
//! - [`agents`]: the capability contract and built-in behavior providers
//! - [`events`]: snapshot/target notifications feeding the core
//!
//! ## Data Flow
//!
//! ```text
//! registry + grid + target ──> PathPlanner ──> cell path
//!     cell path ──> compile_route / MissionCompiler ──> Mission
//!     Mission ──> MissionExecutor ──> one action per tick
//! ```
//!
//! The executor is single-threaded and cooperative: it is invoked once per
//! external simulation/control step and returns within the tick. Grid and
//! registry snapshots are immutable for the duration of a tick and are
//! replaced wholesale when their source changes.

pub mod agents;
pub mod config;
pub mod error;
pub mod events;
pub mod house;
pub mod mission;
pub mod planning;

pub use config::GrihaConfig;
pub use error::{GrihaError, Result};
