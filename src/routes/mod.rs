mod admin;
mod auth;
mod health_check;
mod history;
mod students;

pub use admin::{create_admin, CreateAdminRequest};
pub use auth::{admin_login, logout, profile, register, student_login};
pub use health_check::health_check;
pub use history::{clear_history, delete_history, list_history};
pub use students::{
    create_student, delete_student, get_my_profile, get_student, list_students, update_my_profile,
    update_student, CreateStudentRequest, UpdateStudentRequest,
};
