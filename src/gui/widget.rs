use std::time::{Duration, Instant};

use eframe::egui;

use crate::core::controller::{GifController, ImageOpenedHandler};
use crate::core::state::VisualState;

/// egui binding for [`GifController`].
///
/// Immediate mode has no retained tree, so "attached" means the widget was
/// shown this session: the first `show` applies the template and attaches,
/// an explicit [`GifView::detach`] (or drop) detaches. Window activation
/// comes from the frame input, and the measured image size is reported back
/// to the controller as the size-changed signal.
pub struct GifView {
    controller: GifController,
    texture: Option<egui::TextureHandle>,
    texture_dirty: bool,
    attached: bool,
    last_reported: Option<egui::Vec2>,
}

impl GifView {
    pub fn new() -> Self {
        Self {
            controller: GifController::new(),
            texture: None,
            texture_dirty: false,
            attached: false,
            last_reported: None,
        }
    }

    pub fn set_uri_source(&mut self, uri: Option<String>) {
        self.texture = None;
        self.last_reported = None;
        self.controller.set_uri_source(uri);
    }

    pub fn set_can_load(&mut self, can_load: bool) {
        self.controller.set_can_load(can_load);
    }

    pub fn set_animating(&mut self, animating: bool) {
        self.controller.set_animating(animating);
    }

    pub fn reload(&mut self) {
        self.texture = None;
        self.last_reported = None;
        self.controller.reload();
    }

    pub fn set_on_image_opened(&mut self, handler: ImageOpenedHandler) {
        self.controller.set_on_image_opened(handler);
    }

    pub fn controller(&self) -> &GifController {
        &self.controller
    }

    /// Detaches from the render tree: stops the timer and tears the image
    /// down. The next `show` re-attaches and reloads.
    pub fn detach(&mut self) {
        if self.attached {
            self.attached = false;
            self.texture = None;
            self.last_reported = None;
            self.controller.on_detach();
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        if !self.attached {
            self.attached = true;
            self.controller.on_template_applied();
            self.controller.on_attach();
        }

        self.controller
            .set_window_activated(ui.ctx().input(|i| i.focused));
        self.controller.poll();
        if self.controller.tick(Instant::now()) {
            self.texture_dirty = true;
        }

        let response = match self.controller.visual_state() {
            VisualState::Unloaded => {
                if self.controller.uri_source().is_some() {
                    ui.label(self.controller.progress_label())
                } else {
                    ui.allocate_response(egui::Vec2::ZERO, egui::Sense::hover())
                }
            }
            VisualState::Failed => {
                let response = ui.link("Failed to load image. Retry");
                if response.clicked() {
                    self.reload();
                }
                response
            }
            VisualState::Loaded => self.show_frame(ui),
        };

        if self.controller.is_timer_running() {
            ui.ctx().request_repaint_after(Duration::from_millis(16));
        }

        response
    }

    fn show_frame(&mut self, ui: &mut egui::Ui) -> egui::Response {
        if self.texture.is_none() || self.texture_dirty {
            if let Some(frame) = self.controller.frame_image() {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [frame.width as usize, frame.height as usize],
                    &frame.rgba,
                );
                match &mut self.texture {
                    Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
                    None => {
                        self.texture = Some(ui.ctx().load_texture(
                            "gif-view-frame",
                            image,
                            egui::TextureOptions::NEAREST,
                        ));
                    }
                }
                self.texture_dirty = false;
            }
        }

        let size = self
            .controller
            .surface_size()
            .map(|(w, h)| egui::Vec2::new(w as f32, h as f32))
            .unwrap_or(egui::Vec2::ZERO);

        let response = match &self.texture {
            Some(texture) => ui.add(egui::Image::new(egui::load::SizedTexture::new(
                texture.id(),
                size,
            ))),
            None => ui.allocate_response(size, egui::Sense::hover()),
        };

        // The measured size is the size-changed signal the controller waits
        // for before firing ImageOpened.
        let measured = response.rect.size();
        if self.last_reported != Some(measured) {
            self.last_reported = Some(measured);
            self.controller.on_size_changed(measured.y, measured.x);
        }

        response
    }
}

impl Default for GifView {
    fn default() -> Self {
        Self::new()
    }
}
