use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::domain::{Absence, ChildId, CompanyId, Route, ScheduleId};
use super::repository::{
    ChildAbsenceRepository, PageRequest, RepositoryError, RoutePage, RouteQuery, RouteRepository,
};

/// In-memory reference implementation backing the server, the CLI demo, and
/// tests.
#[derive(Default, Clone)]
pub struct InMemoryChildAbsenceRepository {
    absences: Arc<Mutex<Vec<Absence>>>,
}

impl InMemoryChildAbsenceRepository {
    pub fn insert(&self, absence: Absence) {
        let mut guard = self.absences.lock().expect("absence mutex poisoned");
        guard.push(absence);
    }
}

#[async_trait]
impl ChildAbsenceRepository for InMemoryChildAbsenceRepository {
    async fn find_active_absences_for_child(
        &self,
        company_id: &CompanyId,
        child_id: &ChildId,
        date: NaiveDate,
    ) -> Result<Vec<Absence>, RepositoryError> {
        let guard = self.absences.lock().expect("absence mutex poisoned");
        Ok(guard
            .iter()
            .filter(|absence| {
                absence.company_id == *company_id
                    && absence.child_id == *child_id
                    && absence.is_active_on(date)
            })
            .cloned()
            .collect())
    }

    async fn find_active_absences_for_schedule(
        &self,
        company_id: &CompanyId,
        child_id: &ChildId,
        schedule_id: &ScheduleId,
        date: NaiveDate,
    ) -> Result<Vec<Absence>, RepositoryError> {
        let guard = self.absences.lock().expect("absence mutex poisoned");
        // Filtered through the same coverage predicate the checker uses, so
        // the boolean and classified paths cannot drift.
        Ok(guard
            .iter()
            .filter(|absence| {
                absence.company_id == *company_id
                    && absence.child_id == *child_id
                    && absence.covers_schedule(schedule_id, date)
            })
            .cloned()
            .collect())
    }
}

/// In-memory route store honoring the same filter/paging contract as the
/// relational implementation.
#[derive(Default, Clone)]
pub struct InMemoryRouteRepository {
    routes: Arc<Mutex<Vec<Route>>>,
}

impl InMemoryRouteRepository {
    pub fn insert(&self, route: Route) {
        let mut guard = self.routes.lock().expect("route mutex poisoned");
        guard.push(route);
    }
}

#[async_trait]
impl RouteRepository for InMemoryRouteRepository {
    async fn find_by_filters(
        &self,
        query: &RouteQuery,
        page: &PageRequest,
    ) -> Result<RoutePage, RepositoryError> {
        let guard = self.routes.lock().expect("route mutex poisoned");
        let matched: Vec<Route> = guard
            .iter()
            .filter(|route| {
                route.company_id == query.company_id
                    && route.date == query.date
                    && query
                        .driver_id
                        .as_ref()
                        .map_or(true, |driver| route.driver_id == *driver)
                    && query.status.map_or(true, |status| route.status == status)
            })
            .cloned()
            .collect();

        let total = matched.len();
        let items = match page.limit {
            Some(limit) => matched.into_iter().skip(page.offset).take(limit).collect(),
            None => matched.into_iter().skip(page.offset).collect(),
        };

        Ok(RoutePage { items, total })
    }
}
