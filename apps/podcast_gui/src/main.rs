//! Podcast Player GUI

mod state;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use eframe::egui;
use podcast_api::ApiClient;
use podcast_config::AppConfig;
use podcast_player::spawn_engine;

use state::{AppState, Route};
use ui::{EpisodeView, Header, HomeView, PlayerDeck, PodcastTheme};

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()
        .context("failed to build logger instance")?;

    let config = podcast_config::load_config().context("failed to load configuration")?;
    log::info!("using episode API at {}", config.api.base_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("Podcastr"),
        ..Default::default()
    };

    eframe::run_native(
        "Podcastr",
        options,
        Box::new(move |cc| {
            PodcastTheme::apply(&cc.egui_ctx);
            Ok(Box::new(PodcastApp::new(config)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("failed to run frontend: {e}"))
}

struct PodcastApp {
    state: AppState,
}

impl PodcastApp {
    fn new(config: AppConfig) -> Self {
        let engine = spawn_engine(config.engine.clone());
        let source = Arc::new(ApiClient::new(&config.api));

        Self {
            state: AppState::new(engine, source, config.listing, config.engine.volume),
        }
    }
}

impl eframe::App for PodcastApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let changed = self.state.poll();

        egui::TopBottomPanel::top("header")
            .resizable(false)
            .show(ctx, |ui| {
                Header::show(ui);
            });

        egui::SidePanel::right("player_deck")
            .resizable(false)
            .exact_width(360.0)
            .show(ctx, |ui| {
                PlayerDeck::show(ui, &mut self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none()
                .inner_margin(egui::Margin::symmetric(32.0, 16.0))
                .show(ui, |ui| match self.state.route.clone() {
                    Route::Home => HomeView::show(ui, &mut self.state),
                    Route::Episode(_) => EpisodeView::show(ui, &mut self.state),
                });
        });

        if changed {
            ctx.request_repaint();
        } else if self.state.store.state().is_playing() || self.state.is_fetching() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
