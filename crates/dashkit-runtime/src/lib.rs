#![forbid(unsafe_code)]

//! Runtime: the stateful side of dashkit.
//!
//! # Role in dashkit
//! `dashkit-runtime` owns a live tree. [`TreeClient`] holds the current root,
//! applies edits through the pure algorithms in `dashkit-core`, and pushes
//! copies of the result to observers of the whole tree, of single nodes, and
//! of named pointers such as the selected node. [`BuilderClient`] adds the
//! widget registry leaves render from.
//!
//! # How it fits in the system
//! UI code subscribes with the `watch_*` guards and writes through the
//! client's mutation methods. Everything is single-threaded (`Rc`), so a
//! client belongs to one editing session on one thread.

pub mod builder;
pub mod client;
pub mod config;
pub mod special;
pub mod subject;

pub use builder::{BuilderClient, DEFAULT_WIDGET_ID, RegisteredWidget, WidgetRegistry, WidgetSlot};
pub use client::{NodeObserver, SpecialObserver, TreeClient, Watch};
#[cfg(feature = "config")]
pub use config::ConfigError;
pub use config::ClientConfig;
pub use special::SpecialNode;
pub use subject::{Observer, ObserverRef, Subject, observer};
