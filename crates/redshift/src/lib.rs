//! Redshift/PostgreSQL backend for the Umbra dynamic-credentials toolkit.
//!
//! Issues and revokes ephemeral database users against a Redshift- or
//! PostgreSQL-compatible cluster, with renewal and root rotation on top.
//! The [`Redshift`] engine implements [`umbra_dbplugin::Database`];
//! connection state lives in a lazily-initialized, mutex-guarded
//! [`ConnectionManager`] owned by the engine value, never in a process-wide
//! singleton.
//!
//! A known limitation, inherited deliberately: revoking a user does not
//! terminate sessions it already holds open; those continue until closed.

pub mod backend;
pub mod config;
pub mod connection;

pub use crate::backend::Redshift;
pub use crate::config::{ConnectionConfig, DEFAULT_MAX_OPEN_CONNECTIONS};
pub use crate::connection::ConnectionManager;
