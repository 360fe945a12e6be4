//! 主题定义

use egui::{Color32, Rounding, Stroke, Style, Visuals};

/// 浅色主题，紫色强调色
pub struct PodcastTheme;

impl PodcastTheme {
    pub const BG_PAGE: Color32 = Color32::from_rgb(247, 248, 250);
    pub const BG_CARD: Color32 = Color32::from_rgb(255, 255, 255);
    pub const BG_BORDER: Color32 = Color32::from_rgb(230, 232, 235);
    pub const PURPLE_300: Color32 = Color32::from_rgb(145, 100, 250);
    pub const PURPLE_400: Color32 = Color32::from_rgb(130, 87, 229);
    pub const PURPLE_500: Color32 = Color32::from_rgb(105, 66, 200);
    pub const GREEN: Color32 = Color32::from_rgb(4, 211, 97);
    pub const TEXT_HEADING: Color32 = Color32::from_rgb(73, 73, 86);
    pub const TEXT_BODY: Color32 = Color32::from_rgb(128, 128, 147);
    pub const TEXT_ON_PURPLE: Color32 = Color32::from_rgb(255, 255, 255);
    pub const ERROR: Color32 = Color32::from_rgb(229, 72, 77);

    /// 应用主题到 egui context
    pub fn apply(ctx: &egui::Context) {
        let mut style = Style::default();
        let mut visuals = Visuals::light();

        visuals.panel_fill = Self::BG_PAGE;
        visuals.window_fill = Self::BG_CARD;
        visuals.extreme_bg_color = Self::BG_BORDER;
        visuals.faint_bg_color = Self::BG_CARD;

        visuals.widgets.noninteractive.bg_fill = Self::BG_CARD;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Self::TEXT_BODY);
        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, Self::BG_BORDER);
        visuals.widgets.noninteractive.rounding = Rounding::same(8.0);

        visuals.widgets.inactive.bg_fill = Self::BG_CARD;
        visuals.widgets.inactive.weak_bg_fill = Self::BG_CARD;
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Self::TEXT_HEADING);
        visuals.widgets.inactive.rounding = Rounding::same(8.0);

        visuals.widgets.hovered.bg_fill = Self::PURPLE_300.gamma_multiply(0.25);
        visuals.widgets.hovered.weak_bg_fill = Self::PURPLE_300.gamma_multiply(0.25);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Self::PURPLE_500);
        visuals.widgets.hovered.rounding = Rounding::same(8.0);

        visuals.widgets.active.bg_fill = Self::PURPLE_400;
        visuals.widgets.active.weak_bg_fill = Self::PURPLE_400;
        visuals.widgets.active.fg_stroke = Stroke::new(1.0, Self::TEXT_ON_PURPLE);
        visuals.widgets.active.rounding = Rounding::same(8.0);

        visuals.selection.bg_fill = Self::GREEN.gamma_multiply(0.6);
        visuals.selection.stroke = Stroke::new(1.0, Self::GREEN);
        visuals.hyperlink_color = Self::PURPLE_400;

        visuals.window_rounding = Rounding::same(16.0);
        visuals.window_stroke = Stroke::new(1.0, Self::BG_BORDER);

        style.visuals = visuals;

        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        style.spacing.window_margin = egui::Margin::same(16.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);

        ctx.set_style(style);
    }
}
