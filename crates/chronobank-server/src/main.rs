use std::net::SocketAddr;

use anyhow::Result as AnyResult;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use chronobank_core::{
    BookingStatus, CoreError, DisputeStatus, EscrowStatus, RequestStatus, validate_score,
};
use chronobank_ledger::{Posting, SettlementPair, adjustment, apply_to_balance, settlement_amount};
use chronobank_platform::{
    AdjustLedgerRequest, AuthResponse, BookingView, CompleteBookingResponse, CreateBookingRequest,
    CreateOfferRequest, CreateServiceRequestRequest, DisputeView, ErrorBody, FileDisputeRequest,
    LedgerEntryView, LoginRequest, MemberView, OfferView, RateBookingRequest, RatingView,
    RegisterRequest, ResolveDisputeRequest, ServiceConfig, ServiceRequestView,
    UpdateProfileRequest, connect_database, hash_password, new_salt, new_session_token,
    session_expiry, verify_password,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{error, info};
use uuid::Uuid;

const SEED_PASSWORD: &str = "timecredit";

#[derive(Clone)]
struct AppState {
    pool: PgPool,
}

/// The member resolved from a bearer token, carried through guarded
/// handlers.
#[derive(Debug, Clone)]
struct AuthedMember {
    id: Uuid,
    name: String,
    avatar_url: Option<String>,
    rating: Decimal,
    is_admin: bool,
}

struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        error!("storage failure: {err}");
        ApiError(CoreError::Internal("storage failure".to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CoreError::InvalidState(_) | CoreError::Conflict(_) => StatusCode::CONFLICT,
        CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ListQuery {
    limit: Option<i64>,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "chronobank_server=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;
    let pool = connect_database(&config.database_url).await?;

    // Schema and demo fixture run exactly once, before the listener
    // binds; both are idempotent so a restart is harmless.
    ensure_schema(&pool).await?;
    seed_demo_data(&pool).await?;

    let state = AppState { pool };
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/members/{member_id}", get(get_member))
        .route("/api/members/{member_id}/profile", post(update_profile))
        .route("/api/members/{member_id}/offers", get(list_offers_by_provider))
        .route("/api/members/{member_id}/bookings", get(list_bookings_for_member))
        .route("/api/members/{member_id}/ledger", get(list_ledger_for_member))
        .route("/api/offers", get(list_active_offers).post(create_offer))
        .route("/api/offers/{offer_id}", get(get_offer))
        .route("/api/requests", post(create_service_request))
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/{booking_id}/complete", post(complete_booking))
        .route("/api/bookings/{booking_id}/rate", post(rate_booking))
        .route("/api/bookings/{booking_id}/dispute", post(file_dispute))
        .route("/api/admin/disputes", get(list_disputes))
        .route("/api/admin/disputes/{dispute_id}/resolve", post(resolve_dispute))
        .route("/api/admin/ledger/adjust", post(adjust_ledger))
        .with_state(state);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("chronobank server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let name = required_text(&payload.name, "name")?;
    let email = normalize_email(&payload.email)?;
    if payload.password.is_empty() {
        return Err(CoreError::InvalidInput("password is required".to_string()).into());
    }

    let now = Utc::now();
    let member_id = Uuid::new_v4();
    let salt = new_salt();
    let password_hash = hash_password(&payload.password, &salt);

    let mut tx = state.pool.begin().await?;

    let taken = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM members WHERE email = $1)")
        .bind(&email)
        .fetch_one(&mut *tx)
        .await?;
    if taken {
        return Err(CoreError::Conflict("email already registered".to_string()).into());
    }

    let row = sqlx::query(
        r#"
        INSERT INTO members (
            id, name, email, contact, avatar_url, bio, rating,
            is_provider, is_admin, password_salt, password_hash, created_at
        )
        VALUES ($1, $2, $3, NULL, NULL, NULL, 0, FALSE, FALSE, $4, $5, $6)
        RETURNING
            id, name, email, contact, avatar_url, bio, rating,
            is_provider, is_admin, created_at
        "#,
    )
    .bind(member_id)
    .bind(&name)
    .bind(&email)
    .bind(&salt)
    .bind(&password_hash)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let member = member_view(&row)?;
    let token = create_session(&mut tx, member_id).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { member, token })))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = normalize_email(&payload.email)?;

    let row = sqlx::query(
        r#"
        SELECT
            id, name, email, contact, avatar_url, bio, rating,
            is_provider, is_admin, password_salt, password_hash, created_at
        FROM members
        WHERE email = $1
        "#,
    )
    .bind(&email)
    .fetch_optional(&state.pool)
    .await?;

    // Unknown email and wrong password fail identically.
    let Some(row) = row else {
        return Err(CoreError::Unauthenticated("invalid credentials".to_string()).into());
    };
    let salt: String = row.try_get("password_salt")?;
    let expected: String = row.try_get("password_hash")?;
    if !verify_password(&payload.password, &salt, &expected) {
        return Err(CoreError::Unauthenticated("invalid credentials".to_string()).into());
    }

    let member = member_view(&row)?;
    let mut tx = state.pool.begin().await?;
    let token = create_session(&mut tx, member.id).await?;
    tx.commit().await?;

    Ok(Json(AuthResponse { member, token }))
}

async fn get_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<MemberView>, ApiError> {
    authenticate(&state.pool, &headers).await?;

    let row = sqlx::query(
        r#"
        SELECT
            id, name, email, contact, avatar_url, bio, rating,
            is_provider, is_admin, created_at
        FROM members
        WHERE id = $1
        "#,
    )
    .bind(member_id)
    .fetch_optional(&state.pool)
    .await?;

    let Some(row) = row else {
        return Err(CoreError::not_found("member").into());
    };

    Ok(Json(member_view(&row)?))
}

async fn update_profile(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<MemberView>, ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;
    if authed.id != member_id {
        return Err(
            CoreError::Forbidden("members may only update their own profile".to_string()).into(),
        );
    }

    let name = optional_text(payload.name.as_deref());
    let bio = optional_text(payload.bio.as_deref());
    let contact = optional_text(payload.contact.as_deref());
    let avatar_url = optional_text(payload.avatar_url.as_deref());
    if name.is_none() && bio.is_none() && contact.is_none() && avatar_url.is_none() {
        return Err(CoreError::InvalidInput("no profile fields to update".to_string()).into());
    }

    let row = sqlx::query(
        r#"
        UPDATE members
        SET name = COALESCE($2, name),
            bio = COALESCE($3, bio),
            contact = COALESCE($4, contact),
            avatar_url = COALESCE($5, avatar_url)
        WHERE id = $1
        RETURNING
            id, name, email, contact, avatar_url, bio, rating,
            is_provider, is_admin, created_at
        "#,
    )
    .bind(member_id)
    .bind(name)
    .bind(bio)
    .bind(contact)
    .bind(avatar_url)
    .fetch_optional(&state.pool)
    .await?;

    let Some(row) = row else {
        return Err(CoreError::not_found("member").into());
    };

    Ok(Json(member_view(&row)?))
}

async fn create_offer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateOfferRequest>,
) -> Result<(StatusCode, Json<OfferView>), ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;

    let title = required_text(&payload.title, "title")?;
    let description = required_text(&payload.description, "description")?;
    if payload.rate_per_hour <= Decimal::ZERO {
        return Err(CoreError::InvalidInput("rate_per_hour must be positive".to_string()).into());
    }
    let skills = normalize_skills(&payload.skills);

    let offer_id = Uuid::new_v4();
    let now = Utc::now();

    let mut tx = state.pool.begin().await?;
    sqlx::query(
        r#"
        INSERT INTO offers (
            id, provider_id, title, description, skills, rate_per_hour, is_active, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
        "#,
    )
    .bind(offer_id)
    .bind(authed.id)
    .bind(&title)
    .bind(&description)
    .bind(&skills)
    .bind(payload.rate_per_hour)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    // Publishing a first offer is what makes a member a provider.
    sqlx::query("UPDATE members SET is_provider = TRUE WHERE id = $1")
        .bind(authed.id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(OfferView {
            id: offer_id,
            provider_id: authed.id,
            title,
            description,
            skills,
            rate_per_hour: payload.rate_per_hour,
            is_active: true,
            created_at: now,
            provider_name: Some(authed.name),
            provider_avatar_url: authed.avatar_url,
            provider_rating: Some(authed.rating),
        }),
    ))
}

async fn list_active_offers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<OfferView>>, ApiError> {
    let limit = clamp_limit(query.limit, 50, 100);

    let rows = sqlx::query(
        r#"
        SELECT
            o.id, o.provider_id, o.title, o.description, o.skills,
            o.rate_per_hour, o.is_active, o.created_at,
            m.name AS provider_name, m.avatar_url AS provider_avatar_url,
            m.rating AS provider_rating
        FROM offers o
        JOIN members m ON m.id = o.provider_id
        WHERE o.is_active
        ORDER BY o.created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(offer_view(&row)?);
    }

    Ok(Json(items))
}

async fn get_offer(
    State(state): State<AppState>,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<OfferView>, ApiError> {
    let row = sqlx::query(
        r#"
        SELECT
            o.id, o.provider_id, o.title, o.description, o.skills,
            o.rate_per_hour, o.is_active, o.created_at,
            m.name AS provider_name, m.avatar_url AS provider_avatar_url,
            m.rating AS provider_rating
        FROM offers o
        JOIN members m ON m.id = o.provider_id
        WHERE o.id = $1
        "#,
    )
    .bind(offer_id)
    .fetch_optional(&state.pool)
    .await?;

    let Some(row) = row else {
        return Err(CoreError::not_found("offer").into());
    };

    Ok(Json(offer_view(&row)?))
}

async fn list_offers_by_provider(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<OfferView>>, ApiError> {
    authenticate(&state.pool, &headers).await?;

    let rows = sqlx::query(
        r#"
        SELECT
            o.id, o.provider_id, o.title, o.description, o.skills,
            o.rate_per_hour, o.is_active, o.created_at,
            m.name AS provider_name, m.avatar_url AS provider_avatar_url,
            m.rating AS provider_rating
        FROM offers o
        JOIN members m ON m.id = o.provider_id
        WHERE o.provider_id = $1
        ORDER BY o.created_at DESC
        "#,
    )
    .bind(member_id)
    .fetch_all(&state.pool)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(offer_view(&row)?);
    }

    Ok(Json(items))
}

async fn create_service_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateServiceRequestRequest>,
) -> Result<(StatusCode, Json<ServiceRequestView>), ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;
    let note = optional_text(payload.note.as_deref());

    let offer_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM offers WHERE id = $1)")
            .bind(payload.offer_id)
            .fetch_one(&state.pool)
            .await?;
    if !offer_exists {
        return Err(CoreError::not_found("offer").into());
    }

    let request_id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO service_requests (id, offer_id, member_id, note, status, created_at)
        VALUES ($1, $2, $3, $4, 'PENDING', $5)
        "#,
    )
    .bind(request_id)
    .bind(payload.offer_id)
    .bind(authed.id)
    .bind(&note)
    .bind(now)
    .execute(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ServiceRequestView {
            id: request_id,
            offer_id: payload.offer_id,
            member_id: authed.id,
            note,
            status: RequestStatus::Pending,
            created_at: now,
        }),
    ))
}

async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingView>), ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;

    if payload.duration_minutes <= 0 {
        return Err(
            CoreError::InvalidInput("duration_minutes must be positive".to_string()).into(),
        );
    }

    let mut tx = state.pool.begin().await?;

    let request_row = sqlx::query(
        r#"
        SELECT id, offer_id, member_id, status
        FROM service_requests
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(payload.request_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(request_row) = request_row else {
        return Err(CoreError::not_found("service request").into());
    };
    let request_member_id: Uuid = request_row.try_get("member_id")?;
    let request_offer_id: Uuid = request_row.try_get("offer_id")?;
    let request_status = RequestStatus::parse(&request_row.try_get::<String, _>("status")?)?;

    if request_member_id != authed.id {
        return Err(
            CoreError::Forbidden("only the requesting member may book".to_string()).into(),
        );
    }
    if request_offer_id != payload.offer_id {
        return Err(
            CoreError::InvalidInput("offer does not match the service request".to_string()).into(),
        );
    }
    if request_status != RequestStatus::Pending {
        return Err(CoreError::InvalidState(format!(
            "service request is already {}",
            request_status.as_str()
        ))
        .into());
    }

    let offer_row = sqlx::query(
        r#"
        SELECT o.provider_id, o.title, o.rate_per_hour, m.name AS provider_name
        FROM offers o
        JOIN members m ON m.id = o.provider_id
        WHERE o.id = $1
        "#,
    )
    .bind(payload.offer_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(offer_row) = offer_row else {
        return Err(CoreError::not_found("offer").into());
    };
    let provider_id: Uuid = offer_row.try_get("provider_id")?;
    let offer_title: String = offer_row.try_get("title")?;
    let rate_per_hour: Decimal = offer_row.try_get("rate_per_hour")?;
    let provider_name: String = offer_row.try_get("provider_name")?;

    let booking_id = Uuid::new_v4();
    let escrow_id = Uuid::new_v4();
    let now = Utc::now();
    let held_amount = settlement_amount(rate_per_hour, payload.duration_minutes);

    sqlx::query(
        r#"
        INSERT INTO bookings (
            id, request_id, provider_id, member_id, start_time, duration_minutes,
            status, escrow_id, rated, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, 'CONFIRMED', $7, FALSE, $8)
        "#,
    )
    .bind(booking_id)
    .bind(payload.request_id)
    .bind(provider_id)
    .bind(authed.id)
    .bind(payload.start_time)
    .bind(payload.duration_minutes)
    .bind(escrow_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO escrows (id, booking_id, amount, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        "#,
    )
    .bind(escrow_id)
    .bind(booking_id)
    .bind(held_amount)
    .bind(EscrowStatus::Held.as_str())
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE service_requests SET status = 'ACCEPTED' WHERE id = $1")
        .bind(payload.request_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(BookingView {
            id: booking_id,
            request_id: payload.request_id,
            provider_id,
            member_id: authed.id,
            start_time: payload.start_time,
            duration_minutes: payload.duration_minutes,
            status: BookingStatus::Confirmed,
            escrow_id,
            rated: false,
            created_at: now,
            offer_title: Some(offer_title),
            other_party_name: Some(provider_name),
        }),
    ))
}

async fn list_bookings_for_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<BookingView>>, ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;
    ensure_self_or_admin(&authed, member_id)?;
    let limit = clamp_limit(query.limit, 100, 500);

    let rows = sqlx::query(
        r#"
        SELECT
            b.id, b.request_id, b.provider_id, b.member_id, b.start_time,
            b.duration_minutes, b.status, b.escrow_id, b.rated, b.created_at,
            o.title AS offer_title,
            CASE WHEN b.member_id = $1 THEN pm.name ELSE rm.name END AS other_party_name
        FROM bookings b
        JOIN service_requests sr ON sr.id = b.request_id
        JOIN offers o ON o.id = sr.offer_id
        JOIN members pm ON pm.id = b.provider_id
        JOIN members rm ON rm.id = b.member_id
        WHERE b.member_id = $1 OR b.provider_id = $1
        ORDER BY b.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(member_id)
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(booking_view(&row)?);
    }

    Ok(Json(items))
}

/// The settlement path. Booking row, then both member rows, are locked
/// inside one transaction; the paired postings, escrow release, and the
/// CONFIRMED -> COMPLETED transition commit together or not at all.
async fn complete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<CompleteBookingResponse>, ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;

    let mut tx = state.pool.begin().await?;

    let booking_row = sqlx::query(
        r#"
        SELECT
            b.id, b.provider_id, b.member_id, b.duration_minutes,
            b.status, b.escrow_id, sr.offer_id
        FROM bookings b
        JOIN service_requests sr ON sr.id = b.request_id
        WHERE b.id = $1
        FOR UPDATE OF b
        "#,
    )
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(booking_row) = booking_row else {
        return Err(CoreError::not_found("booking").into());
    };
    let provider_id: Uuid = booking_row.try_get("provider_id")?;
    let requester_id: Uuid = booking_row.try_get("member_id")?;
    let duration_minutes: i32 = booking_row.try_get("duration_minutes")?;
    let escrow_id: Uuid = booking_row.try_get("escrow_id")?;
    let offer_id: Uuid = booking_row.try_get("offer_id")?;
    let status = BookingStatus::parse(&booking_row.try_get::<String, _>("status")?)?;

    if authed.id != provider_id {
        return Err(
            CoreError::Forbidden("only the provider may complete a booking".to_string()).into(),
        );
    }
    status.ensure_completable()?;

    let rate_per_hour = sqlx::query_scalar::<_, Decimal>(
        "SELECT rate_per_hour FROM offers WHERE id = $1",
    )
    .bind(offer_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(rate_per_hour) = rate_per_hour else {
        return Err(CoreError::not_found("offer").into());
    };

    let amount = settlement_amount(rate_per_hour, duration_minutes);
    let pair = SettlementPair::for_booking(booking_id, requester_id, provider_id, amount);

    // Ascending-id lock order keeps concurrent settlements touching the
    // same members from deadlocking.
    sqlx::query("SELECT id FROM members WHERE id = $1 OR id = $2 ORDER BY id FOR UPDATE")
        .bind(requester_id)
        .bind(provider_id)
        .fetch_all(&mut *tx)
        .await?;

    let now = Utc::now();
    let mut entry_ids = [Uuid::nil(); 2];
    for (index, posting) in pair.postings().into_iter().enumerate() {
        let prior = latest_balance(&mut tx, posting.member_id).await?;
        let balance_after = apply_to_balance(prior, posting.amount);
        entry_ids[index] = insert_ledger_entry(&mut tx, posting, balance_after, now).await?;
    }

    sqlx::query("UPDATE escrows SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(escrow_id)
        .bind(EscrowStatus::Released.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE bookings SET status = 'COMPLETED' WHERE id = $1")
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "booking {} settled: {} credits from {} to {}",
        booking_id, amount, requester_id, provider_id
    );

    Ok(Json(CompleteBookingResponse {
        booking_id,
        status: BookingStatus::Completed,
        amount,
        debit_entry_id: entry_ids[0],
        credit_entry_id: entry_ids[1],
    }))
}

async fn rate_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<RateBookingRequest>,
) -> Result<(StatusCode, Json<RatingView>), ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;
    let score = validate_score(payload.score)?;
    let comment = optional_text(payload.comment.as_deref());

    let mut tx = state.pool.begin().await?;

    let booking_row = sqlx::query(
        r#"
        SELECT id, provider_id, member_id, status, rated
        FROM bookings
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(booking_row) = booking_row else {
        return Err(CoreError::not_found("booking").into());
    };
    let provider_id: Uuid = booking_row.try_get("provider_id")?;
    let member_id: Uuid = booking_row.try_get("member_id")?;
    let rated: bool = booking_row.try_get("rated")?;
    let status = BookingStatus::parse(&booking_row.try_get::<String, _>("status")?)?;

    let rated_id = if authed.id == member_id {
        provider_id
    } else if authed.id == provider_id {
        member_id
    } else {
        return Err(
            CoreError::Forbidden("only a party to the booking may rate it".to_string()).into(),
        );
    };

    if rated {
        return Err(CoreError::Conflict("booking has already been rated".to_string()).into());
    }
    status.ensure_ratable()?;

    let rating_id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO ratings (id, booking_id, rater_id, rated_id, score, comment, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(rating_id)
    .bind(booking_id)
    .bind(authed.id)
    .bind(rated_id)
    .bind(score)
    .bind(&comment)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE bookings SET rated = TRUE WHERE id = $1")
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;

    // Keep the member's displayed rating in step with received scores.
    sqlx::query(
        r#"
        UPDATE members
        SET rating = (SELECT COALESCE(AVG(score), 0) FROM ratings WHERE rated_id = $1)
        WHERE id = $1
        "#,
    )
    .bind(rated_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(RatingView {
            id: rating_id,
            booking_id,
            rater_id: authed.id,
            rated_id,
            score,
            comment,
            created_at: now,
        }),
    ))
}

async fn file_dispute(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<FileDisputeRequest>,
) -> Result<(StatusCode, Json<DisputeView>), ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;
    let reason = required_text(&payload.reason, "reason")?;

    let mut tx = state.pool.begin().await?;

    let booking_row = sqlx::query(
        r#"
        SELECT id, provider_id, member_id
        FROM bookings
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(booking_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(booking_row) = booking_row else {
        return Err(CoreError::not_found("booking").into());
    };
    let provider_id: Uuid = booking_row.try_get("provider_id")?;
    let member_id: Uuid = booking_row.try_get("member_id")?;
    if authed.id != provider_id && authed.id != member_id {
        return Err(
            CoreError::Forbidden("only a party to the booking may dispute it".to_string()).into(),
        );
    }

    let dispute_id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO disputes (id, booking_id, reason, status, resolution, admin_id, created_at)
        VALUES ($1, $2, $3, 'OPEN', NULL, NULL, $4)
        "#,
    )
    .bind(dispute_id)
    .bind(booking_id)
    .bind(&reason)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    // A dispute supersedes any prior status, completed bookings
    // included.
    sqlx::query("UPDATE bookings SET status = 'DISPUTED' WHERE id = $1")
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(DisputeView {
            id: dispute_id,
            booking_id,
            reason,
            status: DisputeStatus::Open,
            resolution: None,
            admin_id: None,
            created_at: now,
        }),
    ))
}

async fn list_disputes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DisputeView>>, ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;
    require_admin(&authed)?;
    let limit = clamp_limit(query.limit, 100, 500);

    let rows = sqlx::query(
        r#"
        SELECT id, booking_id, reason, status, resolution, admin_id, created_at
        FROM disputes
        ORDER BY CASE WHEN status = 'OPEN' THEN 0 ELSE 1 END, created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(dispute_view(&row)?);
    }

    Ok(Json(items))
}

async fn resolve_dispute(
    State(state): State<AppState>,
    Path(dispute_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<ResolveDisputeRequest>,
) -> Result<Json<DisputeView>, ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;
    require_admin(&authed)?;

    let closing_status = DisputeStatus::parse_resolution(&payload.status)?;
    let resolution = required_text(&payload.resolution, "resolution")?;

    let mut tx = state.pool.begin().await?;

    let row = sqlx::query(
        r#"
        SELECT id, booking_id, reason, status, created_at
        FROM disputes
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(dispute_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        return Err(CoreError::not_found("dispute").into());
    };
    let current = DisputeStatus::parse(&row.try_get::<String, _>("status")?)?;
    if current != DisputeStatus::Open {
        return Err(CoreError::InvalidState(format!(
            "dispute is already {}",
            current.as_str()
        ))
        .into());
    }
    let booking_id: Uuid = row.try_get("booking_id")?;
    let reason: String = row.try_get("reason")?;
    let created_at = row.try_get("created_at")?;

    // The booking keeps its DISPUTED status; closure is recorded on the
    // dispute alone.
    sqlx::query("UPDATE disputes SET status = $2, resolution = $3, admin_id = $4 WHERE id = $1")
        .bind(dispute_id)
        .bind(closing_status.as_str())
        .bind(&resolution)
        .bind(authed.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(DisputeView {
        id: dispute_id,
        booking_id,
        reason,
        status: closing_status,
        resolution: Some(resolution),
        admin_id: Some(authed.id),
        created_at,
    }))
}

async fn adjust_ledger(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AdjustLedgerRequest>,
) -> Result<(StatusCode, Json<LedgerEntryView>), ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;
    require_admin(&authed)?;

    if payload.amount == Decimal::ZERO {
        return Err(CoreError::InvalidInput("amount must be non-zero".to_string()).into());
    }
    let reason = required_text(&payload.reason, "reason")?;

    let mut tx = state.pool.begin().await?;

    let member_row = sqlx::query("SELECT id FROM members WHERE id = $1 FOR UPDATE")
        .bind(payload.member_id)
        .fetch_optional(&mut *tx)
        .await?;
    if member_row.is_none() {
        return Err(CoreError::not_found("member").into());
    }

    let posting = adjustment(payload.member_id, payload.amount, &reason);
    let prior = latest_balance(&mut tx, payload.member_id).await?;
    let balance_after = apply_to_balance(prior, posting.amount);
    let now = Utc::now();
    let entry_id = insert_ledger_entry(&mut tx, &posting, balance_after, now).await?;

    tx.commit().await?;

    info!(
        "ledger adjusted for member {} by {} ({})",
        payload.member_id, posting.amount, reason
    );

    Ok((
        StatusCode::CREATED,
        Json(LedgerEntryView {
            id: entry_id,
            member_id: posting.member_id,
            amount: posting.amount,
            txn_type: posting.txn_type,
            balance_after,
            related_booking_id: None,
            notes: Some(posting.notes),
            created_at: now,
        }),
    ))
}

async fn list_ledger_for_member(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<LedgerEntryView>>, ApiError> {
    let authed = authenticate(&state.pool, &headers).await?;
    ensure_self_or_admin(&authed, member_id)?;
    let limit = clamp_limit(query.limit, 100, 500);

    let rows = sqlx::query(
        r#"
        SELECT id, member_id, amount, txn_type, balance_after,
               related_booking_id, notes, created_at
        FROM ledger_entries
        WHERE member_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(member_id)
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(ledger_entry_view(&row)?);
    }

    Ok(Json(items))
}

async fn authenticate(pool: &PgPool, headers: &HeaderMap) -> Result<AuthedMember, ApiError> {
    let token = bearer_token(headers)?;

    let row = sqlx::query(
        r#"
        SELECT m.id, m.name, m.avatar_url, m.rating, m.is_admin
        FROM sessions s
        JOIN members m ON m.id = s.member_id
        WHERE s.token = $1 AND s.expires_at > $2
        "#,
    )
    .bind(token)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Err(
            CoreError::Unauthenticated("invalid or expired session token".to_string()).into(),
        );
    };

    Ok(AuthedMember {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        avatar_url: row.try_get("avatar_url")?,
        rating: row.try_get("rating")?,
        is_admin: row.try_get("is_admin")?,
    })
}

fn require_admin(authed: &AuthedMember) -> Result<(), ApiError> {
    if authed.is_admin {
        Ok(())
    } else {
        Err(CoreError::Forbidden("admin privileges required".to_string()).into())
    }
}

fn ensure_self_or_admin(authed: &AuthedMember, member_id: Uuid) -> Result<(), ApiError> {
    if authed.id == member_id || authed.is_admin {
        Ok(())
    } else {
        Err(CoreError::Forbidden("not permitted for another member".to_string()).into())
    }
}

async fn create_session(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    member_id: Uuid,
) -> Result<String, sqlx::Error> {
    let token = new_session_token();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO sessions (token, member_id, created_at, expires_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&token)
    .bind(member_id)
    .bind(now)
    .bind(session_expiry(now))
    .execute(&mut **tx)
    .await?;

    Ok(token)
}

/// A member's balance is the balance_after of their latest entry, zero
/// if they have none. Callers must hold the member-row lock.
async fn latest_balance(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    member_id: Uuid,
) -> Result<Decimal, sqlx::Error> {
    let balance = sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT balance_after
        FROM ledger_entries
        WHERE member_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(member_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(balance.unwrap_or(Decimal::ZERO))
}

async fn insert_ledger_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    posting: &Posting,
    balance_after: Decimal,
    now: chrono::DateTime<Utc>,
) -> Result<Uuid, sqlx::Error> {
    let entry_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO ledger_entries (
            id, member_id, amount, txn_type, balance_after,
            related_booking_id, notes, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(entry_id)
    .bind(posting.member_id)
    .bind(posting.amount)
    .bind(posting.txn_type.as_str())
    .bind(balance_after)
    .bind(posting.related_booking_id)
    .bind(&posting.notes)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(entry_id)
}

fn member_view(row: &PgRow) -> Result<MemberView, ApiError> {
    Ok(MemberView {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        contact: row.try_get("contact")?,
        avatar_url: row.try_get("avatar_url")?,
        bio: row.try_get("bio")?,
        rating: row.try_get("rating")?,
        is_provider: row.try_get("is_provider")?,
        is_admin: row.try_get("is_admin")?,
        created_at: row.try_get("created_at")?,
    })
}

fn offer_view(row: &PgRow) -> Result<OfferView, ApiError> {
    Ok(OfferView {
        id: row.try_get("id")?,
        provider_id: row.try_get("provider_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        skills: row.try_get("skills")?,
        rate_per_hour: row.try_get("rate_per_hour")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        provider_name: row.try_get("provider_name")?,
        provider_avatar_url: row.try_get("provider_avatar_url")?,
        provider_rating: row.try_get("provider_rating")?,
    })
}

fn booking_view(row: &PgRow) -> Result<BookingView, ApiError> {
    Ok(BookingView {
        id: row.try_get("id")?,
        request_id: row.try_get("request_id")?,
        provider_id: row.try_get("provider_id")?,
        member_id: row.try_get("member_id")?,
        start_time: row.try_get("start_time")?,
        duration_minutes: row.try_get("duration_minutes")?,
        status: BookingStatus::parse(&row.try_get::<String, _>("status")?)?,
        escrow_id: row.try_get("escrow_id")?,
        rated: row.try_get("rated")?,
        created_at: row.try_get("created_at")?,
        offer_title: row.try_get("offer_title")?,
        other_party_name: row.try_get("other_party_name")?,
    })
}

fn dispute_view(row: &PgRow) -> Result<DisputeView, ApiError> {
    Ok(DisputeView {
        id: row.try_get("id")?,
        booking_id: row.try_get("booking_id")?,
        reason: row.try_get("reason")?,
        status: DisputeStatus::parse(&row.try_get::<String, _>("status")?)?,
        resolution: row.try_get("resolution")?,
        admin_id: row.try_get("admin_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn ledger_entry_view(row: &PgRow) -> Result<LedgerEntryView, ApiError> {
    Ok(LedgerEntryView {
        id: row.try_get("id")?,
        member_id: row.try_get("member_id")?,
        amount: row.try_get("amount")?,
        txn_type: chronobank_core::TxnType::parse(&row.try_get::<String, _>("txn_type")?)?,
        balance_after: row.try_get("balance_after")?,
        related_booking_id: row.try_get("related_booking_id")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, CoreError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| CoreError::Unauthenticated("missing authorization header".to_string()))?;
    let value = value
        .to_str()
        .map_err(|_| CoreError::Unauthenticated("malformed authorization header".to_string()))?;
    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        CoreError::Unauthenticated("authorization header must carry a bearer token".to_string())
    })?;
    let token = token.trim();
    if token.is_empty() {
        return Err(CoreError::Unauthenticated(
            "authorization header must carry a bearer token".to_string(),
        ));
    }

    Ok(token)
}

fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

fn required_text(value: &str, field_name: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidInput(format!("{field_name} is required")));
    }

    Ok(trimmed.to_string())
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn normalize_email(value: &str) -> Result<String, CoreError> {
    let normalized = value.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(CoreError::InvalidInput("email is required".to_string()));
    }
    if !normalized.contains('@') {
        return Err(CoreError::InvalidInput("email is invalid".to_string()));
    }

    Ok(normalized)
}

fn normalize_skills(skills: &[String]) -> Vec<String> {
    skills
        .iter()
        .map(|skill| skill.trim())
        .filter(|skill| !skill.is_empty())
        .map(str::to_string)
        .collect()
}

async fn ensure_schema(pool: &PgPool) -> AnyResult<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            contact TEXT,
            avatar_url TEXT,
            bio TEXT,
            rating NUMERIC NOT NULL DEFAULT 0,
            is_provider BOOLEAN NOT NULL DEFAULT FALSE,
            is_admin BOOLEAN NOT NULL DEFAULT FALSE,
            password_salt TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            member_id UUID NOT NULL REFERENCES members(id),
            created_at TIMESTAMPTZ NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS offers (
            id UUID PRIMARY KEY,
            provider_id UUID NOT NULL REFERENCES members(id),
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            skills TEXT[] NOT NULL DEFAULT '{}',
            rate_per_hour NUMERIC NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS service_requests (
            id UUID PRIMARY KEY,
            offer_id UUID NOT NULL REFERENCES offers(id),
            member_id UUID NOT NULL REFERENCES members(id),
            note TEXT,
            status TEXT NOT NULL DEFAULT 'PENDING',
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY,
            request_id UUID NOT NULL REFERENCES service_requests(id),
            provider_id UUID NOT NULL REFERENCES members(id),
            member_id UUID NOT NULL REFERENCES members(id),
            start_time TIMESTAMPTZ NOT NULL,
            duration_minutes INTEGER NOT NULL,
            status TEXT NOT NULL,
            escrow_id UUID NOT NULL,
            rated BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS escrows (
            id UUID PRIMARY KEY,
            booking_id UUID NOT NULL REFERENCES bookings(id),
            amount NUMERIC NOT NULL,
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS ledger_entries (
            id UUID PRIMARY KEY,
            member_id UUID NOT NULL REFERENCES members(id),
            amount NUMERIC NOT NULL,
            txn_type TEXT NOT NULL,
            balance_after NUMERIC NOT NULL,
            related_booking_id UUID REFERENCES bookings(id),
            notes TEXT,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_ledger_entries_member_created
        ON ledger_entries (member_id, created_at DESC)
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            id UUID PRIMARY KEY,
            booking_id UUID NOT NULL REFERENCES bookings(id),
            rater_id UUID NOT NULL REFERENCES members(id),
            rated_id UUID NOT NULL REFERENCES members(id),
            score SMALLINT NOT NULL,
            comment TEXT,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS disputes (
            id UUID PRIMARY KEY,
            booking_id UUID NOT NULL REFERENCES bookings(id),
            reason TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'OPEN',
            resolution TEXT,
            admin_id UUID REFERENCES members(id),
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

/// Demo fixture: one admin, the four showcase providers, and their six
/// offers. Fixed ids plus ON CONFLICT DO NOTHING keep re-runs harmless.
async fn seed_demo_data(pool: &PgPool) -> AnyResult<()> {
    let now = Utc::now();

    let members: [(&str, &str, &str, Option<&str>, Option<&str>, Decimal, bool, bool); 5] = [
        (
            "9f0d7d3e-0000-4000-8000-000000000001",
            "ChronoBank Admin",
            "admin@chronobank.dev",
            None,
            None,
            Decimal::ZERO,
            false,
            true,
        ),
        (
            "9f0d7d3e-0000-4000-8000-000000000002",
            "Alice Johnson",
            "alice@example.com",
            Some("https://i.pravatar.cc/150?u=alice"),
            Some("Experienced web developer with a passion for creating beautiful and functional user interfaces."),
            Decimal::new(49, 1),
            true,
            false,
        ),
        (
            "9f0d7d3e-0000-4000-8000-000000000003",
            "Bob Williams",
            "bob@example.com",
            Some("https://i.pravatar.cc/150?u=bob"),
            Some("Graphic designer specializing in branding and digital illustration. Let's make your brand stand out."),
            Decimal::new(48, 1),
            true,
            false,
        ),
        (
            "9f0d7d3e-0000-4000-8000-000000000004",
            "Charlie Brown",
            "charlie@example.com",
            Some("https://i.pravatar.cc/150?u=charlie"),
            Some("Professional writer and editor. I can help with blog posts, marketing copy, and more."),
            Decimal::new(50, 1),
            true,
            false,
        ),
        (
            "9f0d7d3e-0000-4000-8000-000000000005",
            "Diana Prince",
            "diana@example.com",
            Some("https://i.pravatar.cc/150?u=diana"),
            Some("Digital marketing consultant with expertise in SEO and social media strategy."),
            Decimal::new(47, 1),
            true,
            false,
        ),
    ];

    for (id, name, email, avatar_url, bio, rating, is_provider, is_admin) in members {
        let salt = new_salt();
        let password_hash = hash_password(SEED_PASSWORD, &salt);
        sqlx::query(
            r#"
            INSERT INTO members (
                id, name, email, contact, avatar_url, bio, rating,
                is_provider, is_admin, password_salt, password_hash, created_at
            )
            VALUES ($1, $2, $3, NULL, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(Uuid::parse_str(id)?)
        .bind(name)
        .bind(email)
        .bind(avatar_url)
        .bind(bio)
        .bind(rating)
        .bind(is_provider)
        .bind(is_admin)
        .bind(&salt)
        .bind(&password_hash)
        .bind(now)
        .execute(pool)
        .await?;
    }

    let offers: [(&str, &str, &str, &str, &[&str], Decimal); 6] = [
        (
            "c4b2a1d0-0000-4000-8000-000000000001",
            "9f0d7d3e-0000-4000-8000-000000000002",
            "React Component Development",
            "I will build custom, reusable React components for your web application. High-quality, tested, and documented code.",
            &["React", "TypeScript", "Frontend"],
            Decimal::ONE,
        ),
        (
            "c4b2a1d0-0000-4000-8000-000000000002",
            "9f0d7d3e-0000-4000-8000-000000000003",
            "Custom Logo Design",
            "Get a unique and memorable logo for your business. Includes multiple concepts and revisions.",
            &["Graphic Design", "Branding", "Illustration"],
            Decimal::new(15, 1),
        ),
        (
            "c4b2a1d0-0000-4000-8000-000000000003",
            "9f0d7d3e-0000-4000-8000-000000000004",
            "Blog Post Writing (500 words)",
            "Engaging and SEO-friendly blog posts on any topic. Perfect for content marketing and driving traffic.",
            &["Writing", "Copywriting", "SEO"],
            Decimal::new(75, 2),
        ),
        (
            "c4b2a1d0-0000-4000-8000-000000000004",
            "9f0d7d3e-0000-4000-8000-000000000005",
            "Social Media Strategy Session",
            "A one-hour consultation to review your social media presence and create an actionable growth strategy.",
            &["Marketing", "Social Media", "Strategy"],
            Decimal::ONE,
        ),
        (
            "c4b2a1d0-0000-4000-8000-000000000005",
            "9f0d7d3e-0000-4000-8000-000000000002",
            "Frontend Performance Audit",
            "I will analyze your website's frontend performance and provide a detailed report with recommendations for improvement.",
            &["Performance", "Web Vitals", "Frontend"],
            Decimal::TWO,
        ),
        (
            "c4b2a1d0-0000-4000-8000-000000000006",
            "9f0d7d3e-0000-4000-8000-000000000003",
            "Business Card Design",
            "Professional and stylish business card design that reflects your brand identity.",
            &["Graphic Design", "Print Design"],
            Decimal::new(5, 1),
        ),
    ];

    for (id, provider_id, title, description, skills, rate_per_hour) in offers {
        let skills: Vec<String> = skills.iter().map(|skill| skill.to_string()).collect();
        sqlx::query(
            r#"
            INSERT INTO offers (
                id, provider_id, title, description, skills, rate_per_hour, is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(Uuid::parse_str(id)?)
        .bind(Uuid::parse_str(provider_id)?)
        .bind(title)
        .bind(description)
        .bind(&skills)
        .bind(rate_per_hour)
        .bind(now)
        .execute(pool)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn limit_clamps_to_bounds() {
        assert_eq!(clamp_limit(None, 50, 100), 50);
        assert_eq!(clamp_limit(Some(10), 50, 100), 10);
        assert_eq!(clamp_limit(Some(0), 50, 100), 1);
        assert_eq!(clamp_limit(Some(-5), 50, 100), 1);
        assert_eq!(clamp_limit(Some(10_000), 50, 100), 100);
    }

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok123"));
        assert_eq!(bearer_token(&headers).unwrap(), "tok123");
    }

    #[test]
    fn error_kinds_map_to_statuses() {
        assert_eq!(
            status_for(&CoreError::not_found("booking")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&CoreError::Forbidden("nope".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&CoreError::Unauthenticated("nope".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&CoreError::InvalidInput("nope".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&CoreError::InvalidState("nope".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&CoreError::Conflict("nope".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&CoreError::Internal("nope".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn email_normalization() {
        assert_eq!(
            normalize_email("  Alice@Example.COM ").unwrap(),
            "alice@example.com"
        );
        assert!(normalize_email("").is_err());
        assert!(normalize_email("not-an-email").is_err());
    }

    #[test]
    fn required_text_rejects_blank() {
        assert_eq!(required_text("  hello  ", "title").unwrap(), "hello");
        let err = required_text("   ", "title").unwrap_err();
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn optional_text_drops_blank_values() {
        assert_eq!(optional_text(Some("  note ")), Some("note".to_string()));
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn skills_are_trimmed_and_pruned() {
        let skills = vec![
            " React ".to_string(),
            String::new(),
            "TypeScript".to_string(),
            "  ".to_string(),
        ];
        assert_eq!(
            normalize_skills(&skills),
            vec!["React".to_string(), "TypeScript".to_string()]
        );
    }

    #[test]
    fn self_or_admin_guard() {
        let member = AuthedMember {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            avatar_url: None,
            rating: Decimal::ZERO,
            is_admin: false,
        };
        assert!(ensure_self_or_admin(&member, member.id).is_ok());
        assert!(ensure_self_or_admin(&member, Uuid::new_v4()).is_err());
        assert!(require_admin(&member).is_err());

        let admin = AuthedMember {
            is_admin: true,
            ..member.clone()
        };
        assert!(ensure_self_or_admin(&admin, Uuid::new_v4()).is_ok());
        assert!(require_admin(&admin).is_ok());
    }
}
