mod commands;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use skypeek_core::{Config, ConfigError};
use skypeek_ui::{render, AutocompleteSettings, WeatherWidget};
use skypeek_weather::WeatherClient;
use tokio::io::{AsyncBufReadExt, BufReader};

use commands::Input;

#[tokio::main]
async fn main() -> Result<()> {
    skypeek_core::init()?;

    let (config, _) = Config::load_validated().inspect_err(|e| {
        if let Some(cause) = e.downcast_ref::<ConfigError>() {
            eprintln!("{}", cause.user_message());
        }
    })?;
    let timeout = config.api.request_timeout_secs.map(Duration::from_secs);
    let client = Arc::new(
        WeatherClient::new(&config.api.base_url, timeout).context("Failed to create weather client")?,
    );

    match client.health().await {
        Ok(health) => tracing::info!(
            "Backend {} at {} is {}",
            health.service,
            client.base_url(),
            health.status
        ),
        Err(e) => tracing::warn!("Backend health check failed: {}", e),
    }

    let settings = AutocompleteSettings::from(&config.autocomplete);
    let (widget, handle) = WeatherWidget::new(settings, client.clone(), client);
    let widget_task = tokio::spawn(widget.run());

    let mut view_rx = handle.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            let view = view_rx.borrow_and_update().clone();
            println!("{}\n", render::render(&view, Utc::now()));
            if view_rx.changed().await.is_err() {
                break;
            }
        }
    });

    println!("{}\n", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match commands::parse(&line) {
            Ok(Input::Event(event)) => handle.send(event).await?,
            Ok(Input::Help) => println!("{}\n", commands::HELP),
            Ok(Input::Quit) => break,
            Err(e) => eprintln!("{e}"),
        }
    }

    drop(handle);
    widget_task.await.context("Widget task panicked")?;
    printer.await.context("Render task panicked")?;

    tracing::info!("SkyPeek stopped");
    Ok(())
}
