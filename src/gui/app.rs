use std::sync::mpsc;

use eframe::egui;

use crate::core::state::ImageOpened;
use crate::gui::config::ViewerConfig;
use crate::gui::widget::GifView;

/// Demo viewer: URI entry plus Load/Unload/Play/Pause/Reload controls around
/// a single [`GifView`].
pub struct GifViewerApp {
    config: ViewerConfig,
    uri_input: String,
    view: GifView,
    show_viewer: bool,
    status_message: String,
    opened_receiver: mpsc::Receiver<ImageOpened>,
}

impl GifViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> anyhow::Result<Self> {
        let config = ViewerConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config: {}", e);
            ViewerConfig::default()
        });

        let mut view = GifView::new();
        view.set_animating(config.animate);
        view.set_can_load(config.can_load);

        let (opened_sender, opened_receiver) = mpsc::channel();
        view.set_on_image_opened(Box::new(move |opened| {
            if let Err(e) = opened_sender.send(opened) {
                log::error!("Failed to forward ImageOpened event: {}", e);
            }
        }));

        Ok(Self {
            uri_input: config.last_uri.clone().unwrap_or_default(),
            config,
            view,
            show_viewer: true,
            status_message: String::new(),
            opened_receiver,
        })
    }
}

impl eframe::App for GifViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(opened) = self.opened_receiver.try_recv() {
            self.status_message = format!(
                "Image opened: {}x{}",
                opened.pixel_width, opened.pixel_height
            );
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("URI:");
                ui.text_edit_singleline(&mut self.uri_input);

                if ui.button("Load").clicked() {
                    let uri = self.uri_input.trim().to_string();
                    if !uri.is_empty() {
                        self.config.last_uri = Some(uri.clone());
                        self.view.set_uri_source(Some(uri));
                        self.status_message.clear();
                    }
                }
                if ui.button("Unload").clicked() {
                    self.view.set_uri_source(None);
                    self.status_message.clear();
                }
                if ui.button("Play").clicked() {
                    self.config.animate = true;
                    self.view.set_animating(true);
                }
                if ui.button("Pause").clicked() {
                    self.config.animate = false;
                    self.view.set_animating(false);
                }
                if ui.button("Reload").clicked() {
                    self.view.reload();
                    self.status_message.clear();
                }

                let was_shown = self.show_viewer;
                ui.checkbox(&mut self.show_viewer, "Show viewer");
                if was_shown && !self.show_viewer {
                    self.view.detach();
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.label(&self.status_message);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.show_viewer {
                self.view.show(ui);
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.config.save() {
            log::error!("Failed to save config: {}", e);
        }
    }
}
