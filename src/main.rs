use axum::extract::Extension;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum_prometheus::PrometheusMetricLayer;
use chrono::{NaiveDate, NaiveTime, Weekday};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use transit_ops::config::AppConfig;
use transit_ops::error::AppError;
use transit_ops::telemetry;
use transit_ops::workflows::absences::{
    absence_router, Absence, AbsenceId, AbsenceType, ChildAbsenceConflictChecker, ChildId,
    CompanyId, ConflictRouterState, DriverAbsence, DriverAbsenceId, DriverAbsenceRouteResolver,
    DriverId, InMemoryChildAbsenceRepository, InMemoryRouteRepository, Route, RouteId, RouteStatus,
    Schedule, ScheduleId,
};

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: Arc<PrometheusHandle>,
}

#[derive(Parser, Debug)]
#[command(
    name = "Transit Operations Service",
    about = "Run the absence-conflict resolution service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect absence conflicts against a seeded demo fleet
    Absence {
        #[command(subcommand)]
        command: AbsenceCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum AbsenceCommand {
    /// Resolve driver and child absence conflicts over a demo window
    Conflicts(ConflictReportArgs),
}

#[derive(Args, Debug)]
struct ConflictReportArgs {
    /// First day of the driver absence (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, default_value = "2025-09-22")]
    start: NaiveDate,
    /// Last day of the driver absence, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, default_value = "2025-09-24")]
    end: NaiveDate,
    /// Day to evaluate the child's schedules against (defaults to the start)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Absence {
            command: AbsenceCommand::Conflicts(args),
        } => run_conflict_report(args).await,
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let absences = Arc::new(InMemoryChildAbsenceRepository::default());
    let routes = Arc::new(InMemoryRouteRepository::default());
    let conflict_state = ConflictRouterState {
        checker: Arc::new(ChildAbsenceConflictChecker::new(absences)),
        resolver: Arc::new(DriverAbsenceRouteResolver::new(routes)),
    };

    let app = absence_router(conflict_state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(Extension(state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "absence-conflict service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

struct DemoFleet {
    company: CompanyId,
    child: ChildId,
    driver: DriverId,
    schedules: Vec<Schedule>,
    absences: Arc<InMemoryChildAbsenceRepository>,
    routes: Arc<InMemoryRouteRepository>,
}

/// Seed a small fleet: one driver with routes scattered across the absence
/// window, one child with a full-day absence on the first day and an
/// afternoon-only absence spanning the window.
fn seed_demo_fleet(start: NaiveDate, end: NaiveDate) -> Result<DemoFleet, AppError> {
    let company = CompanyId("maple-transit".to_string());
    let child = ChildId("child-14".to_string());
    let driver = DriverId("driver-7".to_string());

    let morning = ScheduleId("sched-am".to_string());
    let afternoon = ScheduleId("sched-pm".to_string());
    let weekdays = vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];
    let schedules = vec![
        Schedule {
            id: morning.clone(),
            company_id: company.clone(),
            child_id: child.clone(),
            days_of_week: weekdays.clone(),
            pickup_time: NaiveTime::from_hms_opt(7, 45, 0).expect("valid time"),
            dropoff_time: NaiveTime::from_hms_opt(8, 30, 0).expect("valid time"),
        },
        Schedule {
            id: afternoon.clone(),
            company_id: company.clone(),
            child_id: child.clone(),
            days_of_week: weekdays,
            pickup_time: NaiveTime::from_hms_opt(15, 10, 0).expect("valid time"),
            dropoff_time: NaiveTime::from_hms_opt(15, 55, 0).expect("valid time"),
        },
    ];

    let absences = Arc::new(InMemoryChildAbsenceRepository::default());
    absences.insert(Absence::new(
        AbsenceId("abs-100".to_string()),
        company.clone(),
        child.clone(),
        AbsenceType::FullDay,
        start,
        start,
        Vec::new(),
    )?);
    absences.insert(Absence::new(
        AbsenceId("abs-101".to_string()),
        company.clone(),
        child.clone(),
        AbsenceType::SpecificSchedule,
        start,
        end,
        vec![afternoon],
    )?);

    let routes = Arc::new(InMemoryRouteRepository::default());
    let status_rotation = [
        RouteStatus::Planned,
        RouteStatus::Completed,
        RouteStatus::InProgress,
        RouteStatus::Cancelled,
    ];
    let mut statuses = status_rotation.iter().cycle();
    let mut date = start;
    let mut sequence = 1;
    // One route per day through the day after the window, so the demo can
    // show the inclusive boundary being honored.
    while date <= end.succ_opt().unwrap_or(end) {
        let status = *statuses.next().expect("cycle never ends");
        routes.insert(Route {
            id: RouteId(format!("route-{sequence:03}")),
            company_id: company.clone(),
            date,
            driver_id: driver.clone(),
            status,
        });
        sequence += 1;
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    Ok(DemoFleet {
        company,
        child,
        driver,
        schedules,
        absences,
        routes,
    })
}

async fn run_conflict_report(args: ConflictReportArgs) -> Result<(), AppError> {
    let ConflictReportArgs { start, end, date } = args;
    let date = date.unwrap_or(start);

    let fleet = seed_demo_fleet(start, end)?;
    let checker = ChildAbsenceConflictChecker::new(fleet.absences.clone());
    let resolver = DriverAbsenceRouteResolver::new(fleet.routes.clone());

    let driver_absence = DriverAbsence::new(
        DriverAbsenceId("drv-abs-1".to_string()),
        fleet.company.clone(),
        fleet.driver.clone(),
        start,
        end,
    )?;
    let conflicting = resolver.find_conflicting_routes(&driver_absence).await?;

    println!("Absence conflict demo");
    println!(
        "Driver {} absent {} -> {} (inclusive)",
        fleet.driver.0, start, end
    );

    if conflicting.is_empty() {
        println!("\nRoutes needing reassignment: none");
    } else {
        println!("\nRoutes needing reassignment");
        for route in &conflicting {
            println!(
                "- {} on {} ({})",
                route.id.0,
                route.date,
                route.status.label()
            );
        }
    }

    println!("\nChild {} on {}", fleet.child.0, date);
    for schedule in &fleet.schedules {
        if !schedule.runs_on(date) {
            println!("- {}: not scheduled that day", schedule.id.0);
            continue;
        }

        let conflicts = checker
            .check_conflicts_for_schedule(&fleet.company, &fleet.child, &schedule.id, date)
            .await?;
        if conflicts.is_empty() {
            println!(
                "- {} ({} pickup): no conflict",
                schedule.id.0, schedule.pickup_time
            );
        } else {
            for conflict in &conflicts {
                println!(
                    "- {} ({} pickup): {} via {}",
                    schedule.id.0,
                    schedule.pickup_time,
                    conflict.conflict_type.label(),
                    conflict.absence.id.0
                );
            }
        }
    }

    Ok(())
}
