use area_packer::allocator::Allocator;
use area_packer::types::{Allocation, ItemType, PlacedUnit, Residue, SheetSize, UnitGroup};
use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Upper bound on the summed item quantities of one request.
const MAX_TOTAL_QUANTITY: u64 = 1_000_000;

#[derive(Deserialize, Serialize)]
struct PackRequest {
    #[serde(default)]
    capacity: Option<f64>,
    #[serde(default)]
    sheet: Option<SheetSize>,
    items: Vec<ItemType>,
}

#[derive(Serialize)]
struct PackResponse {
    capacity: f64,
    sheets: Vec<SheetResponse>,
    sheet_count: usize,
    waste_percent: f64,
    residue: Vec<Residue>,
}

#[derive(Serialize)]
struct SheetResponse {
    units: Vec<PlacedUnit>,
    filled_area: f64,
    waste_area: f64,
    summary: Vec<UnitGroup>,
}

impl From<Allocation> for PackResponse {
    fn from(allocation: Allocation) -> Self {
        let capacity = allocation.capacity;
        let sheet_count = allocation.sheet_count();
        let waste_percent = allocation.total_waste_percent();
        PackResponse {
            capacity,
            sheets: allocation
                .sheets
                .into_iter()
                .map(|s| SheetResponse {
                    waste_area: s.waste_area(capacity),
                    summary: s.summary(),
                    filled_area: s.filled_area,
                    units: s.units,
                })
                .collect(),
            sheet_count,
            waste_percent,
            residue: allocation.residue,
        }
    }
}

fn allocator_for(req: &PackRequest) -> Result<Allocator, String> {
    let allocator = match (req.capacity, req.sheet) {
        (Some(capacity), None) => Allocator::new(capacity),
        (None, Some(sheet)) => Allocator::for_sheet(sheet),
        (Some(_), Some(_)) => return Err("give either capacity or sheet, not both".to_string()),
        (None, None) => return Err("capacity or sheet is required".to_string()),
    };
    allocator.map_err(|e| e.to_string())
}

fn check_total_quantity(items: &[ItemType]) -> Result<(), String> {
    let total = items
        .iter()
        .map(|i| u64::try_from(i.quantity).unwrap_or(0))
        .fold(0u64, u64::saturating_add);
    if total > MAX_TOTAL_QUANTITY {
        return Err(format!("total quantity {total} exceeds the limit of {MAX_TOTAL_QUANTITY}"));
    }
    Ok(())
}

async fn pack(
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> Result<Json<PackResponse>, (StatusCode, String)> {
    let Json(req) = payload.map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /pack"
    );

    let allocator = allocator_for(&req).map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    check_total_quantity(&req.items).map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let allocation = tokio::task::spawn_blocking(move || allocator.pack(&req.items))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(allocation.into()))
}

fn app() -> Router {
    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/pack", post(pack))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: failed to open development.log: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(serve()) {
        tracing::error!(error = %e, "server stopped");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn serve() -> std::io::Result<()> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("Listening on {addr}");
    axum::serve(listener, app()).await
}
