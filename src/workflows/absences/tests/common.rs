use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::absences::checker::ChildAbsenceConflictChecker;
use crate::workflows::absences::domain::{
    Absence, AbsenceId, AbsenceType, ChildId, CompanyId, DriverAbsence, DriverAbsenceId, DriverId,
    Route, RouteId, RouteStatus, ScheduleId,
};
use crate::workflows::absences::memory::{InMemoryChildAbsenceRepository, InMemoryRouteRepository};
use crate::workflows::absences::repository::{
    ChildAbsenceRepository, PageRequest, RepositoryError, RoutePage, RouteQuery, RouteRepository,
};
use crate::workflows::absences::resolver::DriverAbsenceRouteResolver;
use crate::workflows::absences::router::{absence_router, ConflictRouterState};

pub(super) fn company() -> CompanyId {
    CompanyId("maple-transit".to_string())
}

pub(super) fn child() -> ChildId {
    ChildId("child-14".to_string())
}

pub(super) fn driver() -> DriverId {
    DriverId("driver-7".to_string())
}

pub(super) fn morning() -> ScheduleId {
    ScheduleId("sched-am".to_string())
}

pub(super) fn afternoon() -> ScheduleId {
    ScheduleId("sched-pm".to_string())
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn full_day_absence(id: &str, start: NaiveDate, end: NaiveDate) -> Absence {
    Absence::new(
        AbsenceId(id.to_string()),
        company(),
        child(),
        AbsenceType::FullDay,
        start,
        end,
        Vec::new(),
    )
    .expect("valid absence window")
}

pub(super) fn schedule_absence(
    id: &str,
    start: NaiveDate,
    end: NaiveDate,
    schedules: Vec<ScheduleId>,
) -> Absence {
    Absence::new(
        AbsenceId(id.to_string()),
        company(),
        child(),
        AbsenceType::SpecificSchedule,
        start,
        end,
        schedules,
    )
    .expect("valid absence window")
}

pub(super) fn route(id: &str, day: NaiveDate, status: RouteStatus) -> Route {
    Route {
        id: RouteId(id.to_string()),
        company_id: company(),
        date: day,
        driver_id: driver(),
        status,
    }
}

pub(super) fn driver_absence(start: NaiveDate, end: NaiveDate) -> DriverAbsence {
    DriverAbsence::new(
        DriverAbsenceId("drv-abs-1".to_string()),
        company(),
        driver(),
        start,
        end,
    )
    .expect("valid absence window")
}

pub(super) fn seeded_absences(
    absences: Vec<Absence>,
) -> Arc<InMemoryChildAbsenceRepository> {
    let repository = Arc::new(InMemoryChildAbsenceRepository::default());
    for absence in absences {
        repository.insert(absence);
    }
    repository
}

pub(super) fn seeded_routes(routes: Vec<Route>) -> Arc<InMemoryRouteRepository> {
    let repository = Arc::new(InMemoryRouteRepository::default());
    for route in routes {
        repository.insert(route);
    }
    repository
}

pub(super) fn build_checker(
    absences: Vec<Absence>,
) -> ChildAbsenceConflictChecker<InMemoryChildAbsenceRepository> {
    ChildAbsenceConflictChecker::new(seeded_absences(absences))
}

pub(super) fn build_resolver(
    routes: Vec<Route>,
) -> DriverAbsenceRouteResolver<InMemoryRouteRepository> {
    DriverAbsenceRouteResolver::new(seeded_routes(routes))
}

pub(super) fn conflict_router(
    absences: Vec<Absence>,
    routes: Vec<Route>,
) -> axum::Router {
    let state = ConflictRouterState {
        checker: Arc::new(ChildAbsenceConflictChecker::new(seeded_absences(absences))),
        resolver: Arc::new(DriverAbsenceRouteResolver::new(seeded_routes(routes))),
    };
    absence_router(state)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Repository double simulating a store outage.
pub(super) struct UnavailableAbsenceRepository;

#[async_trait]
impl ChildAbsenceRepository for UnavailableAbsenceRepository {
    async fn find_active_absences_for_child(
        &self,
        _company_id: &CompanyId,
        _child_id: &ChildId,
        _date: NaiveDate,
    ) -> Result<Vec<Absence>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn find_active_absences_for_schedule(
        &self,
        _company_id: &CompanyId,
        _child_id: &ChildId,
        _schedule_id: &ScheduleId,
        _date: NaiveDate,
    ) -> Result<Vec<Absence>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Route store double that fails on one specific day of the walk.
pub(super) struct FailingDayRouteRepository {
    pub(super) inner: Arc<InMemoryRouteRepository>,
    pub(super) fail_on: NaiveDate,
}

#[async_trait]
impl RouteRepository for FailingDayRouteRepository {
    async fn find_by_filters(
        &self,
        query: &RouteQuery,
        page: &PageRequest,
    ) -> Result<RoutePage, RepositoryError> {
        if query.date == self.fail_on {
            return Err(RepositoryError::Timeout(format!(
                "route query for {} timed out",
                self.fail_on
            )));
        }
        self.inner.find_by_filters(query, page).await
    }
}

/// Route store double recording the dates it was queried for.
pub(super) struct CountingRouteRepository {
    pub(super) inner: Arc<InMemoryRouteRepository>,
    pub(super) queried_dates: Arc<Mutex<Vec<NaiveDate>>>,
}

impl CountingRouteRepository {
    pub(super) fn new(inner: Arc<InMemoryRouteRepository>) -> Self {
        Self {
            inner,
            queried_dates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(super) fn queried_dates(&self) -> Vec<NaiveDate> {
        self.queried_dates.lock().expect("date mutex poisoned").clone()
    }
}

#[async_trait]
impl RouteRepository for CountingRouteRepository {
    async fn find_by_filters(
        &self,
        query: &RouteQuery,
        page: &PageRequest,
    ) -> Result<RoutePage, RepositoryError> {
        self.queried_dates
            .lock()
            .expect("date mutex poisoned")
            .push(query.date);
        self.inner.find_by_filters(query, page).await
    }
}
