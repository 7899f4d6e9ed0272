use std::sync::Arc;

use tracing::debug;

use super::domain::{DriverAbsence, Route};
use super::repository::{PageRequest, RepositoryError, RouteQuery, RouteRepository};

/// Enumerates every live route left without a present driver by a driver
/// absence.
///
/// The store indexes routes by single calendar date, so the absence window is
/// walked one day at a time. A fault on any day aborts the whole call: a
/// silently skipped day would surface an incomplete conflict list and let a
/// route go unreassigned.
pub struct DriverAbsenceRouteResolver<R> {
    routes: Arc<R>,
}

impl<R> DriverAbsenceRouteResolver<R>
where
    R: RouteRepository,
{
    pub fn new(routes: Arc<R>) -> Self {
        Self { routes }
    }

    /// Walk the inclusive [start_date, end_date] window and collect the
    /// planned and in-progress routes assigned to the absent driver, in date
    /// order. Read-only and idempotent; terminal routes are discarded here
    /// rather than pushed into the store's filter.
    pub async fn find_conflicting_routes(
        &self,
        absence: &DriverAbsence,
    ) -> Result<Vec<Route>, RepositoryError> {
        let mut conflicting = Vec::new();
        let mut current = absence.start_date;

        while current <= absence.end_date {
            let query = RouteQuery {
                company_id: absence.company_id.clone(),
                date: current,
                driver_id: Some(absence.driver_id.clone()),
                status: None,
            };
            let page = self
                .routes
                .find_by_filters(&query, &PageRequest::unpaged())
                .await?;

            let fetched = page.items.len();
            let before = conflicting.len();
            conflicting.extend(page.items.into_iter().filter(|route| route.status.is_live()));
            debug!(
                driver = %absence.driver_id.0,
                date = %current,
                fetched,
                live = conflicting.len() - before,
                "scanned driver routes for day"
            );

            // succ_opt only fails at NaiveDate::MAX.
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }

        Ok(conflicting)
    }
}
