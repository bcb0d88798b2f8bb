//! Demo bot
//!
//! Run with:
//! ```bash
//! CORD_APPLICATION_TOKEN=... cargo run -p cord-gateway
//! ```
//!
//! Logs every message it sees and answers `ping` by updating its presence.

use anyhow::Context as _;
use cord_common::{try_init_tracing, try_init_tracing_with_config, CordConfig, TracingConfig};
use cord_gateway::protocol::{Activity, PresenceUpdatePayload, Status};
use cord_gateway::{Client, WebSocketConnector};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match CordConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = try_init_tracing();
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = format!("{e:#}"), "Gateway client stopped");
        std::process::exit(1);
    }
}

async fn run(config: CordConfig) -> anyhow::Result<()> {
    info!(
        env = ?config.env,
        intents = %config.intents,
        gateway_url = %config.gateway_url,
        "Configuration loaded"
    );

    let mut client = Client::builder(&config)
        .on_message(|ctx, message| {
            let author = message.author().map(|user| user.tag());
            info!(
                channel_id = message.channel_id().unwrap_or("-"),
                author = author.as_deref().unwrap_or("-"),
                content = message.content(),
                "Message"
            );

            if message.content() == "ping" && !message.is_from_bot() {
                let presence =
                    PresenceUpdatePayload::new(Status::Online).with_activity(Activity::playing("pong"));
                if let Err(e) = ctx.update_presence(&presence) {
                    error!(error = %e, "Failed to queue presence update");
                }
            }
        })
        .on_transport_error(|e| error!(error = %e, "Transport error"))
        .build()
        .context("Failed to build gateway client")?;

    client
        .run(&WebSocketConnector::new())
        .await
        .context("Gateway session ended")?;

    info!("Bye");
    Ok(())
}
