/// Router Module Index
///
/// The users resource is split by access requirement. Authorization beyond
/// "is there a valid token" happens inside the handlers, through `crate::access`.

/// Routes reachable without a token. Handlers consult an optional caller identity
/// where the decision depends on it.
pub mod public;

/// Routes protected by the authentication layer. Requires a valid bearer token.
pub mod authenticated;
