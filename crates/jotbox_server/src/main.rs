//! Server entry point.

use clap::Parser;
use jotbox_core::init_logging;
use jotbox_server::{build_router, AppState, ServeArgs};
use log::{error, info, warn};
use std::process::ExitCode;
use tokio::signal::unix::{signal, SignalKind};

#[tokio::main]
async fn main() -> ExitCode {
    let args = ServeArgs::parse();

    if let Err(err) = init_logging(&args.log_level, args.log_dir.as_deref()) {
        eprintln!("jotbox: logging init failed: {err}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conn = args.database_url.open()?;
    info!(
        "event=db_ready module=server status=ok database={}",
        args.database_url.describe()
    );

    let state = AppState::new(conn, args.secret_key.expose(), args.session_ttl());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(args.bind_address()).await?;
    info!(
        "event=server_start module=server status=ok addr={} session_ttl_hours={}",
        listener.local_addr()?,
        args.session_ttl_hours
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("event=signal_setup module=server status=error signal=SIGTERM error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("event=signal_setup module=server status=error signal=SIGINT error={err}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = interrupt => info!("event=shutdown module=server status=ok signal=SIGINT"),
        _ = terminate => info!("event=shutdown module=server status=ok signal=SIGTERM"),
    }
}
