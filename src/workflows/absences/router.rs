use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::checker::ChildAbsenceConflictChecker;
use super::domain::{
    AbsenceConflict, AbsenceId, ChildId, CompanyId, DriverAbsence, DriverAbsenceId, DriverId,
    Route, RouteId, ScheduleId,
};
use super::repository::{ChildAbsenceRepository, RouteRepository};
use super::resolver::DriverAbsenceRouteResolver;

/// Shared router state bundling the two conflict resolvers.
pub struct ConflictRouterState<A, R> {
    pub checker: Arc<ChildAbsenceConflictChecker<A>>,
    pub resolver: Arc<DriverAbsenceRouteResolver<R>>,
}

impl<A, R> Clone for ConflictRouterState<A, R> {
    fn clone(&self) -> Self {
        Self {
            checker: Arc::clone(&self.checker),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

/// Router builder exposing the read-only conflict endpoints.
pub fn absence_router<A, R>(state: ConflictRouterState<A, R>) -> Router
where
    A: ChildAbsenceRepository + 'static,
    R: RouteRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/companies/:company_id/children/:child_id/schedule-conflicts",
            get(schedule_conflicts_handler::<A, R>),
        )
        .route(
            "/api/v1/companies/:company_id/children/:child_id/absences/active",
            get(active_absence_handler::<A, R>),
        )
        .route(
            "/api/v1/driver-absences/conflicting-routes",
            post(conflicting_routes_handler::<A, R>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleConflictQuery {
    pub(crate) schedule_id: String,
    pub(crate) date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScheduleConflictResponse {
    pub(crate) child_id: ChildId,
    pub(crate) schedule_id: ScheduleId,
    pub(crate) date: NaiveDate,
    pub(crate) conflicts: Vec<AbsenceConflictView>,
}

/// Sanitized representation of a classified conflict.
#[derive(Debug, Serialize)]
pub struct AbsenceConflictView {
    pub absence_id: AbsenceId,
    pub child_id: ChildId,
    pub conflict_type: &'static str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<&AbsenceConflict> for AbsenceConflictView {
    fn from(conflict: &AbsenceConflict) -> Self {
        Self {
            absence_id: conflict.absence.id.clone(),
            child_id: conflict.absence.child_id.clone(),
            conflict_type: conflict.conflict_type.label(),
            start_date: conflict.absence.start_date,
            end_date: conflict.absence.end_date,
        }
    }
}

pub(crate) async fn schedule_conflicts_handler<A, R>(
    State(state): State<ConflictRouterState<A, R>>,
    Path((company_id, child_id)): Path<(String, String)>,
    Query(query): Query<ScheduleConflictQuery>,
) -> Response
where
    A: ChildAbsenceRepository + 'static,
    R: RouteRepository + 'static,
{
    let company_id = CompanyId(company_id);
    let child_id = ChildId(child_id);
    let schedule_id = ScheduleId(query.schedule_id);

    match state
        .checker
        .check_conflicts_for_schedule(&company_id, &child_id, &schedule_id, query.date)
        .await
    {
        Ok(conflicts) => {
            let body = ScheduleConflictResponse {
                child_id,
                schedule_id,
                date: query.date,
                conflicts: conflicts.iter().map(AbsenceConflictView::from).collect(),
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => repository_failure(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActiveAbsenceQuery {
    pub(crate) date: NaiveDate,
    #[serde(default)]
    pub(crate) schedule_id: Option<String>,
}

pub(crate) async fn active_absence_handler<A, R>(
    State(state): State<ConflictRouterState<A, R>>,
    Path((company_id, child_id)): Path<(String, String)>,
    Query(query): Query<ActiveAbsenceQuery>,
) -> Response
where
    A: ChildAbsenceRepository + 'static,
    R: RouteRepository + 'static,
{
    let company_id = CompanyId(company_id);
    let child_id = ChildId(child_id);

    let result = match query.schedule_id {
        Some(schedule_id) => {
            state
                .checker
                .has_active_absence_for_schedule(
                    &company_id,
                    &child_id,
                    &ScheduleId(schedule_id),
                    query.date,
                )
                .await
        }
        None => {
            state
                .checker
                .has_active_absence(&company_id, &child_id, query.date)
                .await
        }
    };

    match result {
        Ok(active) => {
            let body = json!({
                "child_id": child_id.0,
                "date": query.date,
                "active": active,
            });
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => repository_failure(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConflictingRoutesRequest {
    pub(crate) absence_id: String,
    pub(crate) company_id: String,
    pub(crate) driver_id: String,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConflictingRoutesResponse {
    pub(crate) driver_id: DriverId,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) routes: Vec<RouteView>,
}

/// Sanitized representation of a route awaiting reassignment.
#[derive(Debug, Serialize)]
pub struct RouteView {
    pub route_id: RouteId,
    pub date: NaiveDate,
    pub driver_id: DriverId,
    pub status: &'static str,
}

impl From<&Route> for RouteView {
    fn from(route: &Route) -> Self {
        Self {
            route_id: route.id.clone(),
            date: route.date,
            driver_id: route.driver_id.clone(),
            status: route.status.label(),
        }
    }
}

pub(crate) async fn conflicting_routes_handler<A, R>(
    State(state): State<ConflictRouterState<A, R>>,
    axum::Json(request): axum::Json<ConflictingRoutesRequest>,
) -> Response
where
    A: ChildAbsenceRepository + 'static,
    R: RouteRepository + 'static,
{
    let absence = match DriverAbsence::new(
        DriverAbsenceId(request.absence_id),
        CompanyId(request.company_id),
        DriverId(request.driver_id),
        request.start_date,
        request.end_date,
    ) {
        Ok(absence) => absence,
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    match state.resolver.find_conflicting_routes(&absence).await {
        Ok(routes) => {
            let body = ConflictingRoutesResponse {
                driver_id: absence.driver_id,
                start_date: absence.start_date,
                end_date: absence.end_date,
                routes: routes.iter().map(RouteView::from).collect(),
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => repository_failure(err),
    }
}

fn repository_failure(err: super::repository::RepositoryError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
}
