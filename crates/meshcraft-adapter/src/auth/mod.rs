/*
[INPUT]:  Session tokens and navigation targets
[OUTPUT]: Authorized requests and route guard decisions
[POS]:    Auth layer - handles MeshCraft session state
[UPDATE]: When auth flow or protected routes change
*/

pub mod guard;
pub mod session;

pub use guard::{GuardDecision, Route, guard};
pub use session::{SessionManager, TokenData};
