//! Wall runner: drives a session against a live sticker server.

use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wall::loader::HttpImageLoader;
use wall::physics::RigidWorld;
use wall::render::{render_frame, DebugFlags, NullPainter};
use wall::{ChannelStatus, Config, WallSession};

/// Simulation step interval.
const TICK_MS: u64 = 16;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,wall=debug")),
        )
        .init();

    info!("Sticker Wall v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!("Loaded configuration");
    info!("  Endpoint: {}", config.network.endpoint);
    info!("  Canvas: {}x{}", config.display.width, config.display.height);
    info!("  Max stickers: {}", config.stickers.max_count);

    // Sticker paths are relative to the host the channel lives on.
    let mut loader = HttpImageLoader::new(http_base(&config.network.endpoint)?);

    let started = Instant::now();
    let now = move || started.elapsed().as_millis() as u64;

    let mut session = WallSession::new(config.clone(), Box::new(RigidWorld::new()), now());
    session.restore(&mut loader);

    // Channel driver feeds events and status changes back to this loop.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (status_tx, mut status_rx) = watch::channel(ChannelStatus::Connecting);
    tokio::spawn(wall::sync::run(config.network.clone(), event_tx, status_tx));

    let mut painter = NullPainter;
    let flags = DebugFlags::from_config(&config.debug);

    let mut ticker = tokio::time::interval(Duration::from_millis(TICK_MS));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now_ms = now();
                session.step(now_ms, TICK_MS, &mut loader);
                render_frame(&mut session, &mut painter, flags, now_ms);
            }
            event = event_rx.recv() => {
                match event {
                    Some(message) => session.handle_message(message, &mut loader, now()),
                    None => {
                        warn!("Channel driver stopped");
                        break;
                    }
                }
            }
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = status_rx.borrow_and_update().clone();
                info!("{}", status.message());
                if let (ChannelStatus::Open, Some(bot)) = (&status, session.bot()) {
                    info!("Send your sticker to @{}", bot.username);
                }
                if status == ChannelStatus::Failed {
                    break;
                }
            }
        }
    }

    info!("Wall stopped with {} stickers", session.sticker_count());
    Ok(())
}

/// HTTP origin of the websocket endpoint, for fetching sticker images.
fn http_base(endpoint: &str) -> anyhow::Result<url::Url> {
    let ws = url::Url::parse(endpoint)?;
    let scheme = if ws.scheme() == "wss" { "https" } else { "http" };
    let host = ws.host_str().unwrap_or("127.0.0.1");
    let base = match ws.port() {
        Some(port) => format!("{scheme}://{host}:{port}/"),
        None => format!("{scheme}://{host}/"),
    };
    Ok(url::Url::parse(&base)?)
}
