use serde::{Deserialize, Serialize};

/// Account role discriminant. Exactly one profile kind lives behind each
/// account row; the old three-optionals container shape is not represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            _ => None,
        }
    }

    /// Login probes roles in this order and stops at the first match.
    pub fn login_order() -> [Role; 3] {
        [Role::Admin, Role::Student, Role::Teacher]
    }
}

/// Student profile as stored and served. Credentials never live here; the
/// salted digest sits in its own columns and is stripped before storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub initial: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub fathers_name: String,
    #[serde(default)]
    pub mothers_name: String,
    #[serde(default)]
    pub alloted_registration_name: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub fees_per_year: String,
    #[serde(default)]
    pub ssc_hall_ticket: String,
    #[serde(default)]
    pub ssc_percentage: String,
    #[serde(default)]
    pub ssc_pass_out_year: String,
    #[serde(default)]
    pub inter_hall_ticket: String,
    #[serde(default)]
    pub inter_percentage: String,
    #[serde(default)]
    pub inter_pass_out_year: String,
    #[serde(default)]
    pub year_of_admission: String,
    #[serde(default)]
    pub gmail: String,
    #[serde(default)]
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub initial: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub subjects_taught: Vec<String>,
    #[serde(default)]
    pub gmail: String,
    #[serde(default)]
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub gmail: String,
    #[serde(default)]
    pub phone_number: String,
}

/// One entry of a semester subject catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectEntry {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub max_marks: f64,
    #[serde(default)]
    pub max_credits: f64,
}

/// One graded subject inside a marks record. Not required to match the
/// catalog for the same (branch, semester); the reference is intentionally
/// weak.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkEntry {
    #[serde(default)]
    pub subject_code: String,
    #[serde(default)]
    pub subject_name: String,
    #[serde(default)]
    pub credits: f64,
    #[serde(default)]
    pub marks_obtained: f64,
}

/// Event record as served. `registered_students` carries set semantics;
/// the handler keeps it free of duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub registration_deadline: String,
    #[serde(default)]
    pub registered_students: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub certification: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub alloted_registration_name: String,
}
