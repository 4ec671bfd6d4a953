//! pirwatch-app - Node state machines and orchestration for pirwatch
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the motion
//! node: the button detector, motion sessions, the notification gate and the
//! config-mode interaction are plain state structs advanced by `update()`, and
//! the Engine executes the resulting actions against collaborator traits.

pub mod button;
pub mod command;
pub mod config;
pub mod config_mode;
pub mod engine;
pub mod engine_event;
pub mod gate;
pub mod handler;
pub mod message;
pub mod motion;
pub mod outbound;
pub mod quiet_hours;
pub mod services;
pub mod state;

// Re-export primary types
pub use config::{Settings, TomlSensorStore};
pub use engine::{Collaborators, Engine};
pub use engine_event::EngineEvent;
pub use handler::{UpdateAction, UpdateResult};
pub use message::{Message, TickInput};
pub use services::{
    Clock, IndicatorPattern, IndicatorSink, MonotonicClock, NotificationTransport,
    PersistenceStore, RawInput, SystemWallClock, WallClock, Watchdog,
};
pub use state::{NodePhase, NodeState};
