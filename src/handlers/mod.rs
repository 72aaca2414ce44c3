// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (bearer JWT, see middleware::auth)

pub mod protected;
pub mod public;
