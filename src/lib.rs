//! Client-side state and view synchronization for a water consumption
//! forecast workspace.
//!
//! DESIGN
//! ======
//! The prediction service is reached only through [`gateway::ForecastGateway`].
//! Past predictions live in a [`history::PersistentHistoryStore`] over a
//! single storage slot. Every visible area is drawn by one renderer from
//! [`render`], and the [`controller::WorkspaceController`] decides which
//! surfaces redraw when a selection changes or a request resolves.
//!
//! Nothing here depends on a browser. The `browser` feature adds a
//! `localStorage` slot; everything else runs natively and headlessly.

pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod history;
pub mod model;
pub mod render;

pub use config::WorkspaceConfig;
pub use controller::{ControllerSettings, Interaction, RequestStatus, Tab, WorkspaceController};
pub use error::WorkspaceError;
pub use gateway::{ForecastGateway, GatewayError, HttpGateway};
pub use history::{Durability, PersistentHistoryStore};
