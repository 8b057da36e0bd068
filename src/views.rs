use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::models::{ActivityEntry, Department, DirectoryEntry, InstructorProfile, Schedule};
use crate::session::Flash;

/// Render a template to a full HTML response.
pub fn render<T: Template>(template: T) -> Result<Response, (StatusCode, String)> {
    template
        .render()
        .map(|body| Html(body).into_response())
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Render error: {e}")))
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "role_select.html")]
pub struct RoleSelectPage {
    pub full_name: String,
    pub role: String,
    pub flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "student_dashboard.html")]
pub struct StudentDashboardPage {
    pub departments: Vec<Department>,
    pub flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "department_detail.html")]
pub struct DepartmentDetailPage {
    pub department: Department,
    pub instructors: Vec<DirectoryEntry>,
    pub flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "instructor_dashboard.html")]
pub struct InstructorDashboardPage {
    pub profile: InstructorProfile,
    pub schedules: Vec<Schedule>,
    pub logs: Vec<ActivityEntry>,
    pub flash: Option<Flash>,
}
