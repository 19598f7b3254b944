use dotenvy::dotenv;

use portcullis::logging::init_tracing;
use portcullis::rbac::bootstrap::ensure_seed_data;
use portcullis::router::init_router;
use portcullis::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let state = init_app_state().await;

    sqlx::migrate!("./migrations")
        .run(&state.db)
        .await
        .expect("Failed to run migrations");

    ensure_seed_data(&state.db, &state.rbac_config)
        .await
        .expect("Failed to write seed data");

    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    println!("🚀 Server running on http://localhost:3000");
    println!("📚 Swagger UI available at http://localhost:3000/swagger-ui");
    println!("📖 Scalar UI available at http://localhost:3000/scalar");
    axum::serve(listener, app).await.unwrap();
}
