#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod pipeline;
mod sensor;
mod types;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossbeam_channel::bounded;
use gpui::Application;
use gpui_component;

use sensor::{BackendKind, SensorSession};
use ui::ViewMode;

#[derive(Parser)]
#[command(name = "depth-studio", about = "Multi-channel depth sensor viewer")]
struct Cli {
    /// Frame source to open.
    #[arg(long, value_enum, default_value_t = BackendKind::Auto)]
    backend: BackendKind,

    /// Channel shown when the window opens.
    #[arg(long, value_enum, default_value_t = ViewMode::Depth)]
    view: ViewMode,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // Frames queue up only briefly; a slow paint drops frames at the sender
    // instead of growing the channel.
    let (event_tx, event_rx) = bounded(8);

    let session = SensorSession::open(cli.backend, event_tx);
    if let Err(err) = &session {
        log::error!("failed to open sensor: {err}");
    }

    Application::new()
        .with_assets(gpui_component_assets::Assets)
        .run(move |app| {
            gpui_component::init(app);

            if let Err(err) = ui::launch_ui(app, event_rx, session, cli.view) {
                eprintln!("failed to launch ui: {err:?}");
            }
        });

    Ok(())
}
