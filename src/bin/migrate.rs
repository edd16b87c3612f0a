use furniture_store_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,furniture_store_api=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url, 1).await?;
    run_migrations(&orm).await?;
    tracing::info!("migrations applied");
    Ok(())
}
