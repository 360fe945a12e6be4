//! 顶部标题栏

use chrono::{Local, NaiveDate};
use egui::{Align, Layout, RichText, Ui};

use crate::ui::theme::PodcastTheme;

pub struct Header;

impl Header {
    pub fn show(ui: &mut Ui) {
        let today = header_date(Local::now().date_naive());

        egui::Frame::none()
            .fill(PodcastTheme::BG_CARD)
            .inner_margin(egui::Margin::symmetric(32.0, 16.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("🎧 Podcastr")
                            .color(PodcastTheme::PURPLE_500)
                            .size(22.0)
                            .strong(),
                    );
                    ui.separator();
                    ui.label(RichText::new("The best podcasts for you!").color(PodcastTheme::TEXT_BODY));

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(RichText::new(today).color(PodcastTheme::TEXT_BODY));
                    });
                });
            });
    }
}

/// 形如 `Mo, Jan. 22` 的日期
pub fn header_date(date: NaiveDate) -> String {
    let weekday: String = date.format("%a").to_string().chars().take(2).collect();
    format!("{}, {}", weekday, date.format("%b. %-d"))
}
