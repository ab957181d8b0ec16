use std::{process, sync::Arc};

use futures::FutureExt;
use hottake::{
    application::{error::AppError, feed::FeedService, repos::TakesRepo, takes::TakeService},
    config,
    infra::{
        db::{GatewayTakes, PostgresRepositories},
        error::InfraError,
        gateway::StoreGateway,
        http::{ApiState, build_router},
        telemetry,
    },
};
use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let gateway = Arc::new(build_store_gateway(&settings)?);
    let takes_repo: Arc<dyn TakesRepo> = Arc::new(GatewayTakes::new(Arc::clone(&gateway)));

    let feed = Arc::new(FeedService::new(
        Arc::clone(&takes_repo),
        settings.feed.page_size.get(),
    ));
    let takes = Arc::new(TakeService::new(takes_repo));

    let state = ApiState {
        feed,
        takes,
        store: gateway,
    };
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "hottake::serve",
        addr = %settings.server.addr,
        await_connection = settings.database.await_connection,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

/// The gateway connects on first use: nothing dials the database at
/// startup, and with `await_connection` disabled not even the first
/// request blocks on it.
fn build_store_gateway(
    settings: &config::Settings,
) -> Result<StoreGateway<Arc<PostgresRepositories>>, AppError> {
    let database_url = settings
        .database
        .url
        .clone()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;
    let max_connections = settings.database.max_connections.get();

    let connector = move || {
        let url = database_url.clone();
        async move {
            let pool = PostgresRepositories::connect(&url, max_connections)
                .await
                .map_err(|err| Arc::new(InfraError::database(err.to_string())))?;
            PostgresRepositories::run_migrations(&pool)
                .await
                .map_err(|err| Arc::new(InfraError::database(err.to_string())))?;
            Ok(Arc::new(PostgresRepositories::new(pool)))
        }
        .boxed()
    };

    Ok(StoreGateway::new(
        connector,
        settings.database.await_connection,
    ))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
        info!(target = "hottake::serve", "received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!(target = "hottake::serve", "received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
