/// Router Module Index
///
/// Pages are split by who may see them, and each module's access rule is applied
/// as a layer when the routers are merged in `create_router`.

/// Pages anyone may view. Session-aware but never gated.
pub mod public;

/// Guest-only pages (login, register). Authenticated visitors are redirected away.
pub mod guest;

/// Pages behind the session guard. Anonymous visitors are sent to login.
pub mod authenticated;
