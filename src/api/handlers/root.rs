use axum::response::IntoResponse;

// axum handler for the landing route
pub async fn root() -> impl IntoResponse {
    format!(
        "{} {} - adaptive quiz API",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}
