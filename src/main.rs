use anyhow::Context;
use finance_accounting::{app, config::Settings, db, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env().context("load settings")?;
    telemetry::init_tracing(&settings);

    tracing::info!(">>> start app");
    let app_state = AppState::init(settings).await?;
    db::migrate(&app_state.db).await?;

    let run = app_state.config.run.clone();
    app::serve(app::build_app(app_state), &run).await?;
    tracing::info!("<<< dispose app");
    Ok(())
}
