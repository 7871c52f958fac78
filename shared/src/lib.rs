//! Types shared between the store server and storefront clients.
//!
//! - [`client`] - API request/response DTOs (auth, profile)
//! - [`error`] - unified error-code table
//! - [`message`] - sync-message envelope for the live-update channel

pub mod client;
pub mod error;
pub mod message;

pub use client::{LoginRequest, LoginResponse, ProfileUpdateRequest, RegisterRequest, UserInfo};
pub use error::{ErrorCategory, ErrorCode};
pub use message::{BusMessage, EventType, SyncPayload};
