//! 播放器面板

use egui::{RichText, Ui};
use podcast_player::format_duration;

use crate::state::AppState;
use crate::ui::theme::PodcastTheme;

pub struct PlayerDeck;

impl PlayerDeck {
    pub fn show(ui: &mut Ui, state: &mut AppState) {
        egui::Frame::none()
            .fill(PodcastTheme::PURPLE_500)
            .inner_margin(egui::Margin::symmetric(24.0, 32.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.set_min_height(ui.available_height());

                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new("🎧 Playing now")
                            .color(PodcastTheme::TEXT_ON_PURPLE)
                            .size(16.0)
                            .strong(),
                    );
                    ui.add_space(32.0);

                    Self::current_episode(ui, state);
                    ui.add_space(32.0);

                    Self::progress(ui, state);
                    ui.add_space(16.0);

                    Self::transport_controls(ui, state);
                    ui.add_space(16.0);

                    Self::volume_control(ui, state);

                    if let Some(error) = state.store.state().error() {
                        ui.add_space(16.0);
                        ui.label(RichText::new(error).color(PodcastTheme::ERROR).size(12.0));
                    }
                });
            });
    }

    fn current_episode(ui: &mut Ui, state: &AppState) {
        egui::Frame::none()
            .fill(PodcastTheme::PURPLE_400)
            .rounding(egui::Rounding::same(24.0))
            .inner_margin(egui::Margin::same(24.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.set_min_height(160.0);
                ui.vertical_centered(|ui| {
                    if let Some(episode) = state.store.state().current_episode() {
                        ui.label(
                            RichText::new(&episode.title)
                                .color(PodcastTheme::TEXT_ON_PURPLE)
                                .size(18.0)
                                .strong(),
                        );
                        ui.label(RichText::new(&episode.members).color(PodcastTheme::TEXT_ON_PURPLE));
                    } else {
                        ui.add_space(48.0);
                        ui.label(
                            RichText::new("Choose a podcast to listen")
                                .color(PodcastTheme::TEXT_ON_PURPLE)
                                .size(16.0)
                                .strong(),
                        );
                    }
                });
            });
    }

    fn progress(ui: &mut Ui, state: &mut AppState) {
        let duration = state
            .store
            .state()
            .current_episode()
            .map(|e| e.duration)
            .unwrap_or(0);
        let progress = state.store.state().progress().unwrap_or(0);
        let shown = state.seek_preview.unwrap_or(progress);

        ui.horizontal(|ui| {
            ui.label(RichText::new(format_duration(shown)).color(PodcastTheme::TEXT_ON_PURPLE).size(12.0));

            let slider_width = (ui.available_width() - 56.0).max(60.0);
            if duration > 0 {
                let mut value = shown;
                let response = ui.add_sized(
                    [slider_width, 16.0],
                    egui::Slider::new(&mut value, 0..=duration)
                        .show_value(false)
                        .trailing_fill(true),
                );

                if response.changed() {
                    state.seek_preview = Some(value);
                }
                if response.drag_stopped() || (response.changed() && !response.dragged()) {
                    state.seek(value);
                }
            } else {
                // 没有曲目时显示空进度条
                let (rect, _) = ui.allocate_exact_size(egui::vec2(slider_width, 4.0), egui::Sense::hover());
                ui.painter().rect_filled(rect, 2.0, PodcastTheme::PURPLE_300);
            }

            ui.label(RichText::new(format_duration(duration)).color(PodcastTheme::TEXT_ON_PURPLE).size(12.0));
        });
    }

    fn transport_controls(ui: &mut Ui, state: &mut AppState) {
        let player = state.store.state();
        let has_episode = player.current_episode().is_some();
        let can_shuffle = has_episode && player.can_shuffle();
        let has_previous = has_episode && player.has_previous();
        let has_next = has_episode && player.has_next();
        let is_playing = player.is_playing();
        let is_shuffling = player.is_shuffling();
        let is_looping = player.is_looping();

        ui.horizontal(|ui| {
            if Self::toggle_button(ui, "🔀", is_shuffling, can_shuffle)
                .on_hover_text("Shuffle")
                .clicked()
            {
                state.update_player(|store| store.toggle_shuffle());
            }

            if ui.add_enabled(has_previous, egui::Button::new("⏮")).clicked() {
                state.update_player(|store| store.play_previous());
            }

            let play_label = if is_playing { "⏸" } else { "▶" };
            if ui
                .add_enabled(
                    has_episode,
                    egui::Button::new(RichText::new(play_label).size(24.0)).fill(PodcastTheme::PURPLE_400),
                )
                .clicked()
            {
                state.update_player(|store| store.toggle_play());
            }

            if ui.add_enabled(has_next, egui::Button::new("⏭")).clicked() {
                state.update_player(|store| store.play_next());
            }

            if Self::toggle_button(ui, "🔁", is_looping, has_episode)
                .on_hover_text("Repeat")
                .clicked()
            {
                state.update_player(|store| store.toggle_loop());
            }
        });
    }

    fn toggle_button(ui: &mut Ui, icon: &str, active: bool, enabled: bool) -> egui::Response {
        let text = if active {
            RichText::new(icon).color(PodcastTheme::GREEN)
        } else {
            RichText::new(icon)
        };
        ui.add_enabled(enabled, egui::Button::new(text).selected(active))
    }

    fn volume_control(ui: &mut Ui, state: &mut AppState) {
        ui.horizontal(|ui| {
            let icon = if state.volume > 0.5 {
                "🔊"
            } else if state.volume > 0.0 {
                "🔉"
            } else {
                "🔇"
            };
            ui.label(icon);

            let mut volume = state.volume;
            let slider = egui::Slider::new(&mut volume, 0.0..=1.0).show_value(false);
            if ui.add_sized([120.0, 16.0], slider).changed() {
                state.set_volume(volume);
            }
        });
    }
}
