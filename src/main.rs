use anyhow::{anyhow, Result};
use httpasn::{Config, RangeTable, RedirectMap, Resolver, SharedConfig, SharedResolver};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("httpasn".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;
    let redirects = Arc::new(RedirectMap::try_from_file(&config.redirects_path)?);
    tracing::info!(
        "loaded {} redirect targets from {}",
        redirects.len(),
        config.redirects_path.display()
    );

    let allow = config.allow_set(&redirects);
    let table = {
        let (path, allow) = (config.database_path.clone(), allow.clone());
        tokio::task::spawn_blocking(move || RangeTable::try_from_file(path, &allow)).await??
    };
    let resolver: SharedResolver = Arc::new(Resolver::new(table));

    tracing::info!("HTTP listening on {}", &config.http_bind_addr);
    let http_server = httpasn::api::new(config.clone(), resolver.clone(), redirects);
    let http_handle = tokio::spawn(http_server);

    let reload_handle = tokio::spawn(reload_on_hangup(config.clone(), resolver, allow));

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(http_res) = http_handle => {
            if let Err(err) = http_res {
                return Err(err.into())
            }
        }
        Ok(reload_res) = reload_handle => {
            if let Err(err) = reload_res {
                return Err(err)
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

/// Rebuild the range table from the configured database each time SIGHUP is received.
#[cfg(unix)]
async fn reload_on_hangup(
    config: SharedConfig,
    resolver: SharedResolver,
    allow: httpasn::AllowSet,
) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    while hangup.recv().await.is_some() {
        tracing::info!("reloading {}", config.database_path.display());
        let (config, resolver, allow) = (config.clone(), resolver.clone(), allow.clone());
        let res = tokio::task::spawn_blocking(move || {
            resolver.reload_from_file(&config.database_path, &allow)
        })
        .await?;
        if let Err(err) = res {
            tracing::error!("reload failed, keeping current ASN ranges: {err:?}");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn reload_on_hangup(
    _config: SharedConfig,
    _resolver: SharedResolver,
    _allow: httpasn::AllowSet,
) -> Result<()> {
    std::future::pending().await
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "httpasn=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            tracing::debug!("loaded config from {config_file}");
            let config = Config::try_from_file(&config_file)?;
            Ok(Arc::new(config))
        }
    }
}
