/// Admin account routes

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::domain::NewAdmin;
use crate::error::{AppError, ValidationError};
use crate::services::AdminService;
use crate::validators::{is_valid_password, is_valid_username};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAdminRequest {
    pub username: String,
    pub password_plain: String,
}

impl CreateAdminRequest {
    pub fn validate(self) -> Result<NewAdmin, ValidationError> {
        let username = is_valid_username(&self.username)?;
        is_valid_password(&self.password_plain)?;

        Ok(NewAdmin {
            username,
            password: self.password_plain,
        })
    }
}

/// POST /admin
///
/// # Errors
/// - 400: invalid username or password
/// - 409: username already taken
pub async fn create_admin(
    caller: web::ReqData<AuthenticatedUser>,
    body: web::Json<CreateAdminRequest>,
    admins: web::Data<AdminService>,
) -> Result<HttpResponse, AppError> {
    let new_admin = body.into_inner().validate()?;
    let created = admins.create(new_admin).await?;

    tracing::info!(
        admin_id = %created.id,
        created_by = %caller.user_id,
        "Admin account created"
    );

    Ok(HttpResponse::Created().json(created))
}
