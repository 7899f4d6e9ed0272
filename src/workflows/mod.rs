pub mod absences;
