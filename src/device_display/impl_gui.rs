use crate::device_display::interface::DeviceDisplay;
use eframe::egui;
use image::DynamicImage;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const LABEL_AREA_HEIGHT: f32 = 64.0;

#[derive(Default)]
struct Surface {
    text: String,
    preview_size: Option<(u32, u32)>,
    preview: Option<egui::ColorImage>,
    preview_generation: u64,
    closed: bool,
}

/// Window half of the GUI display. Must run on the main thread.
pub struct DisplayWindow {
    surface: Arc<Mutex<Surface>>,
    bounds: (u32, u32),
    preview_texture: Option<egui::TextureHandle>,
    uploaded_generation: u64,
}

impl DisplayWindow {
    /// Blocks until the window is closed, by the user or by `DeviceDisplay::close`.
    pub fn run(self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let (width, height) = self.bounds;
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([width as f32, height as f32 + LABEL_AREA_HEIGHT])
                .with_resizable(true),
            ..Default::default()
        };

        eframe::run_native("Live Classifier", options, Box::new(|_cc| Box::new(self)))
            .map_err(|e| e.to_string())?;

        Ok(())
    }
}

impl eframe::App for DisplayWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let (text, preview_size) = {
            let Ok(surface) = self.surface.lock() else {
                return;
            };

            if surface.closed {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }

            if surface.preview_generation != self.uploaded_generation {
                if let Some(image) = &surface.preview {
                    match &mut self.preview_texture {
                        Some(texture) => texture.set(image.clone(), egui::TextureOptions::LINEAR),
                        None => {
                            self.preview_texture = Some(ctx.load_texture(
                                "preview",
                                image.clone(),
                                egui::TextureOptions::LINEAR,
                            ))
                        }
                    }
                }
                self.uploaded_generation = surface.preview_generation;
            }

            (surface.text.clone(), surface.preview_size)
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                match (&self.preview_texture, preview_size) {
                    (Some(texture), Some((w, h))) => {
                        ui.image((texture.id(), egui::vec2(w as f32, h as f32)));
                    }
                    (_, Some((w, h))) => {
                        ui.allocate_space(egui::vec2(w as f32, h as f32));
                    }
                    _ => {}
                }

                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new(text.trim_end())
                        .monospace()
                        .size(24.0),
                );
            });
        });

        ctx.request_repaint_after(Duration::from_millis(50));
    }
}

pub struct DeviceDisplayGui {
    surface: Arc<Mutex<Surface>>,
    bounds: (u32, u32),
}

impl DeviceDisplayGui {
    pub fn new(bounds: (u32, u32)) -> Self {
        Self {
            surface: Arc::new(Mutex::new(Surface::default())),
            bounds,
        }
    }

    pub fn window(&self) -> DisplayWindow {
        DisplayWindow {
            surface: self.surface.clone(),
            bounds: self.bounds,
            preview_texture: None,
            uploaded_generation: 0,
        }
    }

    fn surface(&self) -> Result<std::sync::MutexGuard<'_, Surface>, Box<dyn Error + Send + Sync>> {
        self.surface.lock().map_err(|e| e.to_string().into())
    }
}

impl DeviceDisplay for DeviceDisplayGui {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.surface()?.text.clear();
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.surface()?.text.push_str(text);
        Ok(())
    }

    fn text(&self) -> String {
        self.surface()
            .map(|surface| surface.text.clone())
            .unwrap_or_default()
    }

    fn bounds(&self) -> (u32, u32) {
        self.bounds
    }

    fn bind_preview(&mut self, size: (u32, u32)) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.surface()?.preview_size = Some(size);
        Ok(())
    }

    fn show_preview(&mut self, frame: &DynamicImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        let rgba = frame.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());

        let mut surface = self.surface()?;
        surface.preview = Some(image);
        surface.preview_generation += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.surface()?.closed = true;
        Ok(())
    }
}
