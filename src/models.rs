use std::fmt;

// ─── Domain enums ───
// Stored as their exact display strings; parsing is case-sensitive so that
// anything outside the enumerations is rejected before it reaches the store.

/// An instructor's current availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    In,
    Out,
    OnLeave,
    OnTravel,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::In, Status::Out, Status::OnLeave, Status::OnTravel];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::In => "In",
            Status::Out => "Out",
            Status::OnLeave => "On Leave",
            Status::OnTravel => "On Travel",
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        Status::ALL.into_iter().find(|v| v.as_str() == s)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A planned absence kind. Scheduling one overwrites the current status
/// with the derived one (last write wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleType {
    Leave,
    Travel,
}

impl ScheduleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Leave => "leave",
            ScheduleType::Travel => "travel",
        }
    }

    /// Title-cased label used in activity details and flash messages.
    pub fn label(&self) -> &'static str {
        match self {
            ScheduleType::Leave => "Leave",
            ScheduleType::Travel => "Travel",
        }
    }

    pub fn resulting_status(&self) -> Status {
        match self {
            ScheduleType::Leave => Status::OnLeave,
            ScheduleType::Travel => Status::OnTravel,
        }
    }

    pub fn parse(s: &str) -> Option<ScheduleType> {
        match s {
            "leave" => Some(ScheduleType::Leave),
            "travel" => Some(ScheduleType::Travel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Instructor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Instructor => "instructor",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "student" => Some(Role::Student),
            "instructor" => Some(Role::Instructor),
            _ => None,
        }
    }
}

// ─── Row types ───

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub code: String,
}

/// One line of a department's directory: instructor id, name and status.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DirectoryEntry {
    pub id: i64,
    pub full_name: String,
    pub status: String,
}

/// An instructor row joined with the owning user and department.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InstructorProfile {
    pub id: i64,
    pub full_name: String,
    pub dept_name: String,
    pub status: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Schedule {
    pub schedule_type: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityEntry {
    pub action: String,
    pub details: Option<String>,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_exact_strings_only() {
        assert_eq!(Status::parse("In"), Some(Status::In));
        assert_eq!(Status::parse("Out"), Some(Status::Out));
        assert_eq!(Status::parse("On Leave"), Some(Status::OnLeave));
        assert_eq!(Status::parse("On Travel"), Some(Status::OnTravel));
        assert_eq!(Status::parse("in"), None);
        assert_eq!(Status::parse("on leave"), None);
        assert_eq!(Status::parse("Invalid"), None);
        assert_eq!(Status::parse(""), None);
    }

    #[test]
    fn role_parses_both_variants() {
        assert_eq!(Role::parse("student"), Some(Role::Student));
        assert_eq!(Role::parse("instructor"), Some(Role::Instructor));
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse("Instructor"), None);
    }

    #[test]
    fn schedule_type_derives_status_and_label() {
        let leave = ScheduleType::parse("leave").unwrap();
        assert_eq!(leave.resulting_status(), Status::OnLeave);
        assert_eq!(leave.label(), "Leave");

        let travel = ScheduleType::parse("travel").unwrap();
        assert_eq!(travel.resulting_status(), Status::OnTravel);
        assert_eq!(travel.label(), "Travel");

        assert_eq!(ScheduleType::parse("Leave"), None);
        assert_eq!(ScheduleType::parse("vacation"), None);
    }
}
