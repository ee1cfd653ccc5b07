use anyhow::Result;
use fitbelt::config::AppConfig;
use fitbelt::device_status::DeviceStatus;
use fitbelt::metrics_store::MetricsStore;
use fitbelt::models::{ConnectionStatus, DayKey, DayMetrics};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

fn load_config() -> Result<AppConfig> {
    let path = AppConfig::path();
    if !std::path::Path::new(&path).exists() {
        tracing::warn!(path = %path, "Config file not found; using defaults");
        return Ok(AppConfig::default());
    }
    AppConfig::load()
}

/// Logs every device transition until the status reaches `target`.
async fn follow_until(
    rx: &mut broadcast::Receiver<fitbelt::models::DeviceState>,
    target: ConnectionStatus,
) -> Result<()> {
    loop {
        match rx.recv().await {
            Ok(state) => {
                tracing::info!(
                    powered_on = state.powered_on,
                    status = %state.status,
                    "Device status"
                );
                if state.status == target {
                    return Ok(());
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Device status observer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                anyhow::bail!("device status channel closed before reaching {target}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "Starting"
    );
    let app_config = load_config()?;

    let mut metrics =
        MetricsStore::with_demo_data(&app_config.metrics, app_config.events.broadcast_capacity);
    let seeded = serde_json::to_string(&*metrics.snapshot())?;
    tracing::info!(days = metrics.len(), snapshot = %seeded, "Metrics seeded");

    let today = DayKey::today();
    metrics.update_day(
        today,
        DayMetrics {
            breath_count: 1_200,
            step_count: 4_321,
            stair_count: 12,
            stand_minute: Some(35),
        },
    );
    let updated = serde_json::to_string(&metrics.get_day(today))?;
    tracing::info!(day = %today, metrics = %updated, "Today updated");

    let device = DeviceStatus::from_config(&app_config)?;
    let mut rx = device.subscribe();

    let demo = async {
        device.change_power()?;
        follow_until(&mut rx, ConnectionStatus::Connected).await?;
        device.change_power()?;
        follow_until(&mut rx, ConnectionStatus::Off).await
    };

    tokio::select! {
        result = demo => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal");
        }
    }

    Ok(())
}
