//! Hook system: typed event definitions, per-event subscriber channels, the
//! dispatcher that fires them, and the bus that bundles one channel per
//! hook point.

pub mod bus;
pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use bus::HookBus;
pub use definitions::{
    CommandEvent, ConfigReadEvent, ExtensionsLoadedEvent, HookEvent, HookPoint, LogoutEvent,
    PostLoginEvent, PreLoginEvent,
};
pub use dispatcher::{FireReport, HookDispatcher};
pub use registry::{FnHandler, HookChannel, HookHandler};
