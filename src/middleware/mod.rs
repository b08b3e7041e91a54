/// Middleware module
///
/// Token verification and role gating for protected routes.

mod jwt_middleware;
mod role_gate;

pub use jwt_middleware::bearer_token;
pub use jwt_middleware::JwtMiddleware;
pub use role_gate::RoleGate;
