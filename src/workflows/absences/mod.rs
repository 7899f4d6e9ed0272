//! Absence-conflict resolution for child transportation activity.
//!
//! Two read-only resolvers answer the questions operators care about when an
//! absence is declared: which transportation schedules of a child are hit by
//! an active absence, and which live routes of a driver are left without a
//! present driver. Both components only read from repository-shaped
//! collaborators and return plain values; persisting absences, reassigning
//! routes, and notifying guardians happen in the calling handlers.

pub mod checker;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod resolver;
pub mod router;

#[cfg(test)]
mod tests;

pub use checker::ChildAbsenceConflictChecker;
pub use domain::{
    Absence, AbsenceConflict, AbsenceId, AbsenceType, ChildId, CompanyId, ConflictType, DriverId,
    DriverAbsence, DriverAbsenceId, DriverAbsenceStatus, InvalidDateRange, Route, RouteId,
    RouteStatus, Schedule, ScheduleId,
};
pub use memory::{InMemoryChildAbsenceRepository, InMemoryRouteRepository};
pub use repository::{
    ChildAbsenceRepository, PageRequest, RepositoryError, RoutePage, RouteQuery, RouteRepository,
};
pub use resolver::DriverAbsenceRouteResolver;
pub use router::{absence_router, ConflictRouterState};
