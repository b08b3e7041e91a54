/// Student Routes
///
/// Admin CRUD over student records, plus `/students/me` for a student's own
/// profile.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::domain::{NewStudent, StudentChanges};
use crate::error::{AppError, ValidationError};
use crate::services::StudentService;
use crate::validators::{
    is_valid_contact, is_valid_name, is_valid_nim, is_valid_password, parse_dob,
};

/// Create-student body, shared by `/auth/register` and `POST /students`
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateStudentRequest {
    pub nim: String,
    pub name: String,
    pub password_plain: String,
    pub dob: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub hobby: Option<String>,
}

/// Partial update. A contact field sent as `null` clears it; an absent
/// field is left alone.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStudentRequest {
    pub nim: Option<String>,
    pub name: Option<String>,
    pub password_plain: Option<String>,
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub hobby: Option<Option<String>>,
}

/// Maps a present field (even `null`) to `Some`, so absence stays `None`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn contact(field: &str, value: Option<String>) -> Result<Option<String>, ValidationError> {
    value.map(|v| is_valid_contact(field, &v)).transpose()
}

fn contact_change(
    field: &str,
    value: Option<Option<String>>,
) -> Result<Option<Option<String>>, ValidationError> {
    value.map(|v| contact(field, v)).transpose()
}

impl CreateStudentRequest {
    pub fn validate(self) -> Result<NewStudent, ValidationError> {
        is_valid_password(&self.password_plain)?;

        Ok(NewStudent {
            nim: is_valid_nim(&self.nim)?,
            name: is_valid_name(&self.name)?,
            password: self.password_plain,
            dob: parse_dob(&self.dob)?,
            phone: contact("phone", self.phone)?,
            address: contact("address", self.address)?,
            hobby: contact("hobby", self.hobby)?,
        })
    }
}

impl UpdateStudentRequest {
    pub fn validate(self) -> Result<StudentChanges, ValidationError> {
        if let Some(password) = self.password_plain.as_deref() {
            is_valid_password(password)?;
        }

        Ok(StudentChanges {
            nim: self.nim.as_deref().map(is_valid_nim).transpose()?,
            name: self.name.as_deref().map(is_valid_name).transpose()?,
            password: self.password_plain,
            dob: self.dob.as_deref().map(parse_dob).transpose()?,
            phone: contact_change("phone", self.phone)?,
            address: contact_change("address", self.address)?,
            hobby: contact_change("hobby", self.hobby)?,
        })
    }
}

/// POST /students
pub async fn create_student(
    body: web::Json<CreateStudentRequest>,
    students: web::Data<StudentService>,
) -> Result<HttpResponse, AppError> {
    let new_student = body.into_inner().validate()?;
    let created = students.create(new_student).await?;

    Ok(HttpResponse::Created().json(created))
}

/// GET /students
pub async fn list_students(
    students: web::Data<StudentService>,
) -> Result<HttpResponse, AppError> {
    let all = students.find_all().await?;
    Ok(HttpResponse::Ok().json(all))
}

/// GET /students/me
pub async fn get_my_profile(
    user: web::ReqData<AuthenticatedUser>,
    students: web::Data<StudentService>,
) -> Result<HttpResponse, AppError> {
    let profile = students
        .find_one(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Your student profile was not found.".to_string()))?;

    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /students/me
///
/// # Errors
/// - 403: the body tries to change the caller's NIM
pub async fn update_my_profile(
    user: web::ReqData<AuthenticatedUser>,
    body: web::Json<UpdateStudentRequest>,
    students: web::Data<StudentService>,
) -> Result<HttpResponse, AppError> {
    let mut changes = body.into_inner().validate()?;

    if let Some(nim) = changes.nim.take() {
        if Some(nim.as_str()) != user.nim.as_deref() {
            tracing::warn!(student_id = %user.user_id, "Student tried to change own NIM");
            return Err(AppError::forbidden("You cannot change your NIM."));
        }
    }

    let updated = students.update(user.user_id, changes).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// GET /students/{id}
pub async fn get_student(
    id: web::Path<Uuid>,
    students: web::Data<StudentService>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let student = students
        .find_one(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Student with ID \"{}\" not found", id)))?;

    Ok(HttpResponse::Ok().json(student))
}

/// PUT /students/{id}
pub async fn update_student(
    id: web::Path<Uuid>,
    body: web::Json<UpdateStudentRequest>,
    students: web::Data<StudentService>,
) -> Result<HttpResponse, AppError> {
    let changes = body.into_inner().validate()?;
    let updated = students.update(id.into_inner(), changes).await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /students/{id}
pub async fn delete_student(
    id: web::Path<Uuid>,
    students: web::Data<StudentService>,
) -> Result<HttpResponse, AppError> {
    let deleted = students.remove(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(deleted))
}
