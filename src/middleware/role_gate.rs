/// Role gate middleware.
///
/// Must sit inside `JwtMiddleware` (wrapped before it) so it only ever sees
/// requests whose token has already been verified.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{authorize, AuthenticatedUser, Role};
use crate::middleware::jwt_middleware::reject;

pub struct RoleGate {
    required: &'static [Role],
}

impl RoleGate {
    /// An empty slice admits any authenticated caller.
    pub fn new(required: &'static [Role]) -> Self {
        Self { required }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleGateService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RoleGateService {
            service: Rc::new(service),
            required: self.required,
        }))
    }
}

pub struct RoleGateService<S> {
    service: Rc<S>,
    required: &'static [Role],
}

impl<S, B> Service<ServiceRequest> for RoleGateService<S>
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
        let caller = req.extensions().get::<AuthenticatedUser>().cloned();

        if let Err(e) = authorize(self.required, caller.as_ref()) {
            tracing::warn!(
                path = %req.path(),
                role = ?caller.as_ref().map(|c| c.role),
                required = ?self.required,
                "Role check failed"
            );
            return reject(e);
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
