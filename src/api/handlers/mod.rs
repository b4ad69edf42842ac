pub mod accounts;
pub mod achievements;
pub mod events;
pub mod marks;
pub mod students;
pub mod subjects;
pub mod teachers;
