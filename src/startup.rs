use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::http::{header, Method, Uri};
use actix_web::{guard, middleware::Logger, web, App, HttpServer, Route};
use std::net::TcpListener;

use crate::auth::Role;
use crate::configuration::JwtSettings;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::{JwtMiddleware, RoleGate};
use crate::routes::{
    admin_login, clear_history, create_admin, create_student, delete_history, delete_student,
    get_my_profile, get_student, health_check, list_history, list_students, logout, profile,
    register, student_login, update_my_profile, update_student,
};
use crate::services::AppServices;

/// Who may call a route
#[derive(Debug, Clone, Copy)]
pub enum Access {
    Public,
    /// Requires a valid token; an empty slice admits any authenticated caller.
    Roles(&'static [Role]),
}

const ANY_USER: &[Role] = &[];
const ADMIN: &[Role] = &[Role::Admin];
const STUDENT: &[Role] = &[Role::Student];

pub struct RouteEntry {
    pub method: Method,
    pub path: &'static str,
    pub access: Access,
    handler: fn() -> Route,
}

fn entry(method: Method, path: &'static str, access: Access, handler: fn() -> Route) -> RouteEntry {
    RouteEntry {
        method,
        path,
        access,
        handler,
    }
}

/// Every endpoint the server exposes.
///
/// `/students/me` must stay ahead of `/students/{id}`.
pub fn route_table() -> Vec<RouteEntry> {
    use Access::{Public, Roles};

    vec![
        entry(Method::GET, "/health_check", Public, || web::route().to(health_check)),
        // Auth
        entry(Method::POST, "/auth/register", Public, || web::route().to(register)),
        entry(Method::POST, "/auth/student/login", Public, || web::route().to(student_login)),
        entry(Method::POST, "/auth/admin/login", Public, || web::route().to(admin_login)),
        entry(Method::POST, "/auth/logout", Roles(ANY_USER), || web::route().to(logout)),
        entry(Method::GET, "/auth/profile", Roles(ANY_USER), || web::route().to(profile)),
        // Admin accounts
        entry(Method::POST, "/admin", Roles(ADMIN), || web::route().to(create_admin)),
        // Students
        entry(Method::POST, "/students", Roles(ADMIN), || web::route().to(create_student)),
        entry(Method::GET, "/students", Roles(ADMIN), || web::route().to(list_students)),
        entry(Method::GET, "/students/me", Roles(STUDENT), || web::route().to(get_my_profile)),
        entry(Method::PUT, "/students/me", Roles(STUDENT), || web::route().to(update_my_profile)),
        entry(Method::GET, "/students/{id}", Roles(ADMIN), || web::route().to(get_student)),
        entry(Method::PUT, "/students/{id}", Roles(ADMIN), || web::route().to(update_student)),
        entry(Method::DELETE, "/students/{id}", Roles(ADMIN), || web::route().to(delete_student)),
        // History
        entry(Method::GET, "/history", Roles(ADMIN), || web::route().to(list_history)),
        entry(Method::DELETE, "/history", Roles(ADMIN), || web::route().to(clear_history)),
        entry(Method::DELETE, "/history/{id}", Roles(ADMIN), || web::route().to(delete_history)),
    ]
}

/// Registers one entry as its own resource. Protected resources run
/// `JwtMiddleware` first, then `RoleGate`.
fn register_route(cfg: &mut web::ServiceConfig, entry: RouteEntry, jwt: &JwtSettings) {
    let resource = web::resource(entry.path)
        .guard(guard::Method(entry.method))
        .route((entry.handler)());

    match entry.access {
        Access::Public => cfg.service(resource),
        Access::Roles(roles) => cfg.service(
            resource
                .wrap(RoleGate::new(roles))
                .wrap(JwtMiddleware::new(jwt.clone())),
        ),
    };
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, jwt: &JwtSettings) {
    for entry in route_table() {
        register_route(cfg, entry, jwt);
    }
}

/// Unparseable origins are skipped with a warning; `*` allows any origin.
fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }

    origins.iter().fold(cors, |cors, origin| {
        match origin.parse::<Uri>() {
            Ok(uri) if uri.scheme().is_some() && uri.host().is_some() => cors.allowed_origin(origin),
            _ => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                cors
            }
        }
    })
}

pub fn run(
    listener: TcpListener,
    services: AppServices,
    cors_origins: Vec<String>,
) -> Result<Server, std::io::Error> {
    let jwt_config = services.auth.jwt_settings().clone();
    let auth = web::Data::new(services.auth);
    let students = web::Data::new(services.students);
    let admins = web::Data::new(services.admins);
    let history = web::Data::new(services.history);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(LoggerMiddleware)       // Custom logging
            .wrap(Logger::default())      // Standard logging
            .wrap(build_cors(&cors_origins))

            // Shared state
            .app_data(auth.clone())
            .app_data(students.clone())
            .app_data(admins.clone())
            .app_data(history.clone())

            // Extractor failures use the same error body as everything else
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::Validation(ValidationError::MalformedBody(err.to_string())).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, req| {
                tracing::debug!(path = %req.path(), error = %err, "Path extraction failed");
                AppError::NotFound(format!("Resource \"{}\" not found", req.path())).into()
            }))

            .configure(|cfg| configure_routes(cfg, &jwt_config))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
