//! 首页 - 最新节目与全部节目

use egui::{RichText, ScrollArea, Ui};
use podcast_api::HomeListing;
use podcast_player::Episode;

use crate::state::{AppState, Remote};
use crate::ui::theme::PodcastTheme;

pub struct HomeView;

enum HomeAction {
    Open(String),
    Play(usize),
    Retry,
}

impl HomeView {
    pub fn show(ui: &mut Ui, state: &mut AppState) {
        let current_id = state.store.state().current_episode().map(|e| e.id.clone());

        let action = match &state.listing {
            Remote::Loading => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.spinner();
                });
                None
            }
            Remote::Failed(message) => Self::failed(ui, message),
            Remote::Ready(listing) => ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| Self::listing(ui, listing, current_id.as_deref()))
                .inner,
        };

        match action {
            Some(HomeAction::Open(id)) => state.open_episode(&id),
            Some(HomeAction::Play(index)) => state.play_from_listing(index),
            Some(HomeAction::Retry) => state.refresh_listing(),
            None => {}
        }
    }

    fn failed(ui: &mut Ui, message: &str) -> Option<HomeAction> {
        let mut action = None;
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(RichText::new("Could not load episodes").color(PodcastTheme::ERROR).size(16.0));
            ui.label(RichText::new(message).color(PodcastTheme::TEXT_BODY).size(12.0));
            ui.add_space(8.0);
            if ui.button("Try again").clicked() {
                action = Some(HomeAction::Retry);
            }
        });
        action
    }

    fn listing(ui: &mut Ui, listing: &HomeListing, current_id: Option<&str>) -> Option<HomeAction> {
        let mut action = None;

        if listing.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(RichText::new("No episodes yet").color(PodcastTheme::TEXT_BODY));
            });
            return None;
        }

        Self::section_title(ui, "Latest episodes");
        for (index, episode) in listing.latest.iter().enumerate() {
            let is_current = current_id == Some(episode.id.as_str());
            if let Some(a) = Self::card(ui, episode, index, is_current) {
                action = Some(a);
            }
            ui.add_space(8.0);
        }

        if !listing.older.is_empty() {
            ui.add_space(16.0);
            Self::section_title(ui, "All episodes");

            egui::Grid::new("all_episodes")
                .num_columns(5)
                .striped(true)
                .spacing([24.0, 12.0])
                .show(ui, |ui| {
                    for header in ["Podcast", "Members", "Date", "Duration", ""] {
                        ui.label(RichText::new(header).color(PodcastTheme::TEXT_BODY).size(11.0));
                    }
                    ui.end_row();

                    for (index, episode) in listing.older.iter().enumerate() {
                        if ui.link(episode.title.as_str()).clicked() {
                            action = Some(HomeAction::Open(episode.id.clone()));
                        }
                        ui.label(RichText::new(&episode.members).color(PodcastTheme::TEXT_BODY));
                        ui.label(episode.published_at.as_deref().unwrap_or("-"));
                        ui.label(episode.display_duration());
                        if Self::play_button(ui, current_id == Some(episode.id.as_str())) {
                            action = Some(HomeAction::Play(listing.older_queue_index(index)));
                        }
                        ui.end_row();
                    }
                });
        }

        action
    }

    fn section_title(ui: &mut Ui, title: &str) {
        ui.label(
            RichText::new(title)
                .color(PodcastTheme::TEXT_HEADING)
                .size(20.0)
                .strong(),
        );
        ui.add_space(8.0);
    }

    fn card(ui: &mut Ui, episode: &Episode, index: usize, is_current: bool) -> Option<HomeAction> {
        let mut action = None;

        egui::Frame::none()
            .fill(PodcastTheme::BG_CARD)
            .stroke(egui::Stroke::new(1.0, PodcastTheme::BG_BORDER))
            .rounding(egui::Rounding::same(16.0))
            .inner_margin(egui::Margin::same(16.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        let title = RichText::new(&episode.title).size(15.0).strong().color(
                            if is_current {
                                PodcastTheme::PURPLE_500
                            } else {
                                PodcastTheme::TEXT_HEADING
                            },
                        );
                        if ui.link(title).clicked() {
                            action = Some(HomeAction::Open(episode.id.clone()));
                        }
                        ui.label(RichText::new(&episode.members).color(PodcastTheme::TEXT_BODY).size(12.0));
                        ui.label(
                            RichText::new(format!(
                                "{}  ·  {}",
                                episode.published_at.as_deref().unwrap_or("-"),
                                episode.display_duration()
                            ))
                            .color(PodcastTheme::TEXT_BODY)
                            .size(12.0),
                        );
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if Self::play_button(ui, is_current) {
                            action = Some(HomeAction::Play(index));
                        }
                    });
                });
            });

        action
    }

    fn play_button(ui: &mut Ui, is_current: bool) -> bool {
        let color = if is_current {
            PodcastTheme::PURPLE_500
        } else {
            PodcastTheme::GREEN
        };
        ui.add(egui::Button::new(RichText::new("▶").color(color).size(16.0)))
            .on_hover_text("Play episode")
            .clicked()
    }
}
