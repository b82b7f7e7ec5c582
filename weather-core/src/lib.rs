//! Core library for the `cityweather` client.
//!
//! This crate defines:
//! - The weather widget (input handling, pending state, rendering)
//! - The element contract it renders into, plus an in-memory document
//! - The backend abstraction and its HTTP implementation
//! - Configuration on disk
//!
//! It is used by `cityweather-cli`, but any front end that implements
//! [`View`] can host the widget.

pub mod backend;
pub mod config;
pub mod error;
pub mod model;
pub mod view;
pub mod widget;

pub use backend::{HttpBackend, WeatherBackend};
pub use config::{Config, Credentials, Labels};
pub use error::{FALLBACK_MESSAGE, FetchError, LOGIN_REQUIRED_MESSAGE};
pub use model::{DisplayValue, ErrorBody, HourlyRow, WeatherResponse};
pub use view::{Document, Element, ElementId, View};
pub use widget::{Outcome, UiEvent, WeatherWidget, WidgetState};
