// unitydp-api: Async Rust client for the Unity-DP UPS web card's point API

pub mod auth;
pub mod client;
pub mod commands;
pub mod data;
pub mod error;
pub mod points;
pub mod process;
pub mod subsystem;
pub mod transport;
pub mod wire;

pub use client::{DATA_DEV_ID, SESSION_DEV_ID, UnityClient};
pub use error::Error;
pub use points::{PointGroup, PointNode, Resolved};
pub use subsystem::{Reading, Subsystem};
pub use transport::{TlsMode, TransportConfig};
pub use wire::SetValue;
