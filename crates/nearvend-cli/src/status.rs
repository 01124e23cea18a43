//! The `status` command: one-shot or polled online-status checks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use nearvend_client::{DiscoveryClient, OnlineStatus};
use nearvend_core::AppConfig;
use nearvend_engine::online_status_cache;

pub(crate) async fn run_status(
    config: &AppConfig,
    ids: &[String],
    watch: bool,
) -> anyhow::Result<()> {
    let client = Arc::new(DiscoveryClient::new(config)?);
    let cache = online_status_cache(
        client,
        Duration::from_secs(config.status_min_fetch_interval_secs),
    );

    let statuses = cache
        .fetch_batch(ids)
        .await
        .map_err(|e| anyhow::anyhow!("status fetch failed: {e}"))?;
    print_statuses(ids, &statuses);

    if watch {
        let interval = Duration::from_secs(config.status_poll_interval_secs);
        let _subscription = cache.poll(ids.to_vec(), interval);
        println!();
        println!(
            "polling every {}s; ctrl-c to stop",
            config.status_poll_interval_secs
        );
        loop {
            tokio::time::sleep(interval).await;
            let statuses = cache.cached(ids).await;
            println!();
            print_statuses(ids, &statuses);
        }
    }

    Ok(())
}

fn print_statuses(ids: &[String], statuses: &HashMap<String, OnlineStatus>) {
    println!("{:<24}STATUS", "VENDOR");
    for id in ids {
        let status = statuses.get(id).map_or("unknown", |status| {
            if status.is_online {
                "online"
            } else {
                "offline"
            }
        });
        println!("{id:<24}{status}");
    }
}
