/// JWT Authentication Middleware
///
/// Validates the bearer token from the Authorization header, resolves it to
/// a live account and injects an `AuthenticatedUser` into request extensions
/// for `RoleGate` and the route handlers.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::validate_access_token;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::services::AuthService;

/// JWT middleware for protecting routes
pub struct JwtMiddleware {
    jwt_config: JwtSettings,
}

impl JwtMiddleware {
    pub fn new(jwt_config: JwtSettings) -> Self {
        Self { jwt_config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
}

/// Pulls the token out of `Authorization: Bearer <token>`.
/// The scheme name is case-insensitive.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// Short-circuits the request with an error response
pub(crate) fn reject<B: 'static>(
    err: AppError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>> {
    let result: Result<ServiceResponse<B>, Error> = Err(err.into());
    Box::pin(std::future::ready(result))
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        let Some(token) = bearer_token(header) else {
            tracing::warn!(path = %req.path(), "Missing or invalid Authorization header");
            return reject(AppError::Auth(AuthError::MissingToken));
        };

        let claims = match validate_access_token(token, &self.jwt_config) {
            Ok(claims) => claims,
            Err(e) => return reject(e),
        };

        let auth = req.app_data::<web::Data<AuthService>>().cloned();
        let service = self.service.clone();

        Box::pin(async move {
            let auth = auth.ok_or_else(|| AppError::Internal("AuthService not registered".to_string()))?;

            let user = auth.resolve_user(&claims).await?.ok_or_else(|| {
                tracing::warn!(subject = %claims.sub, "Token subject no longer exists");
                AppError::Auth(AuthError::UnknownSubject)
            })?;

            tracing::debug!(user_id = %user.user_id, role = %user.role, "JWT validated successfully");
            req.extensions_mut().insert(user);

            service.call(req).await
        })
    }
}
