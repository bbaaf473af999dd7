/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public MeshCraft adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod backend;
pub mod http;
pub mod proxy;
pub mod types;
pub mod validation;

// Re-export commonly used types from auth
pub use auth::{GuardDecision, Route, SessionManager, TokenData, guard};

pub use backend::{GalleryApi, GenerationApi, PrinterApi};

// Re-export commonly used types from http
pub use http::{ClientConfig, ErrorKind, MeshcraftClient, MeshcraftError, Result};

pub use proxy::ImageProxy;

// Re-export all types
pub use types::*;
