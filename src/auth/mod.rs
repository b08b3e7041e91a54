/// Authentication module
///
/// JWT generation/validation, bcrypt password hashing, roles and the
/// role gate.

mod claims;
mod jwt;
mod password;
mod roles;

pub use claims::Claims;
pub use claims::TokenSubject;
pub use jwt::generate_access_token;
pub use jwt::validate_access_token;
pub use jwt::AuthToken;
pub use password::hash_password;
pub use password::verify_password;
pub use password::PasswordHasher;
pub use password::MIN_BCRYPT_COST;
pub use roles::authorize;
pub use roles::AuthenticatedUser;
pub use roles::Role;
