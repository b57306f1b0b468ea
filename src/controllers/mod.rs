//! Client session controllers — the teacher and student state machines.

pub mod student;
pub mod teacher;

pub use student::{StudentController, StudentError, StudentPhase};
pub use teacher::{TeacherController, TeacherError, TeacherPhase};
