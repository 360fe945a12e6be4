//! 单集详情页

use egui::{RichText, ScrollArea, Ui};
use podcast_api::strip_html;
use podcast_player::Episode;

use crate::state::{AppState, Remote};
use crate::ui::theme::PodcastTheme;

pub struct EpisodeView;

enum EpisodeAction {
    Back,
    Play(Episode),
}

impl EpisodeView {
    pub fn show(ui: &mut Ui, state: &mut AppState) {
        let mut action = None;

        if ui.button("⬅ Back").clicked() {
            action = Some(EpisodeAction::Back);
        }
        ui.add_space(8.0);

        match &state.episode {
            None | Some(Remote::Loading) => {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.spinner();
                });
            }
            Some(Remote::Failed(message)) => {
                ui.label(RichText::new("Could not load episode").color(PodcastTheme::ERROR).size(16.0));
                ui.label(RichText::new(message).color(PodcastTheme::TEXT_BODY));
            }
            Some(Remote::Ready(episode)) => {
                if let Some(a) = Self::details(ui, episode) {
                    action = Some(a);
                }
            }
        }

        match action {
            Some(EpisodeAction::Back) => state.go_home(),
            Some(EpisodeAction::Play(episode)) => state.play_episode(episode),
            None => {}
        }
    }

    fn details(ui: &mut Ui, episode: &Episode) -> Option<EpisodeAction> {
        let mut action = None;

        ui.horizontal(|ui| {
            ui.label(
                RichText::new(&episode.title)
                    .color(PodcastTheme::TEXT_HEADING)
                    .size(24.0)
                    .strong(),
            );
            if ui
                .add(egui::Button::new(RichText::new("▶ Play").color(PodcastTheme::TEXT_ON_PURPLE)).fill(PodcastTheme::GREEN))
                .clicked()
            {
                action = Some(EpisodeAction::Play(episode.clone()));
            }
        });

        ui.horizontal(|ui| {
            ui.label(RichText::new(&episode.members).color(PodcastTheme::TEXT_BODY));
            if let Some(date) = &episode.published_at {
                ui.label(RichText::new(date).color(PodcastTheme::TEXT_BODY));
            }
            ui.label(RichText::new(episode.display_duration()).color(PodcastTheme::TEXT_BODY));
        });

        ui.separator();

        if let Some(description) = &episode.description {
            ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                ui.label(RichText::new(strip_html(description)).color(PodcastTheme::TEXT_BODY));
            });
        }

        action
    }
}
