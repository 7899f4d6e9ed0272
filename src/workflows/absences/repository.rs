use async_trait::async_trait;
use chrono::NaiveDate;

use super::domain::{Absence, ChildId, CompanyId, DriverId, Route, RouteStatus, ScheduleId};

/// Error enumeration for repository failures. The conflict core never
/// catches or translates these; retry policy belongs to the caller.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("query timed out: {0}")]
    Timeout(String),
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Storage abstraction over declared child absences.
///
/// "Active" means the date falls inside the declared window and the absence
/// has not been cancelled; both filters live on the repository side.
#[async_trait]
pub trait ChildAbsenceRepository: Send + Sync {
    async fn find_active_absences_for_child(
        &self,
        company_id: &CompanyId,
        child_id: &ChildId,
        date: NaiveDate,
    ) -> Result<Vec<Absence>, RepositoryError>;

    /// Same activity predicate, additionally restricted to absences covering
    /// the given schedule.
    async fn find_active_absences_for_schedule(
        &self,
        company_id: &CompanyId,
        child_id: &ChildId,
        schedule_id: &ScheduleId,
        date: NaiveDate,
    ) -> Result<Vec<Absence>, RepositoryError>;
}

/// Filter set for route lookups. The store indexes routes by single calendar
/// date, so a query always names exactly one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteQuery {
    pub company_id: CompanyId,
    pub date: NaiveDate,
    pub driver_id: Option<DriverId>,
    pub status: Option<RouteStatus>,
}

/// Offset/limit pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl PageRequest {
    /// The conflict core always asks for the full day's routes.
    pub const fn unpaged() -> Self {
        Self {
            offset: 0,
            limit: None,
        }
    }
}

/// One page of routes plus the total match count before paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePage {
    pub items: Vec<Route>,
    pub total: usize,
}

/// Storage abstraction over planned routes.
#[async_trait]
pub trait RouteRepository: Send + Sync {
    async fn find_by_filters(
        &self,
        query: &RouteQuery,
        page: &PageRequest,
    ) -> Result<RoutePage, RepositoryError>;
}
