use crate::device_display::interface::DeviceDisplay;
use image::DynamicImage;
use std::error::Error;

const WIDTH: usize = 32;

pub struct DeviceDisplayConsole {
    text: String,
    bounds: (u32, u32),
    preview_size: Option<(u32, u32)>,
    preview_frames: u64,
}

impl DeviceDisplayConsole {
    pub fn new(bounds: (u32, u32)) -> Self {
        Self {
            text: String::new(),
            bounds,
            preview_size: None,
            preview_frames: 0,
        }
    }

    fn render_display(&self) {
        println!("┌{}┐", "─".repeat(WIDTH));
        let lines: Vec<&str> = self.text.lines().collect();
        if lines.is_empty() {
            println!("│{}│", " ".repeat(WIDTH));
        }
        for line in lines {
            println!("│{:<width$}│", truncate(line), width = WIDTH);
        }
        let status = match self.preview_size {
            Some((w, h)) => format!("preview {}x{} ({} frames)", w, h, self.preview_frames),
            None => "no preview".to_string(),
        };
        println!("├{}┤", "─".repeat(WIDTH));
        println!("│{:<width$}│", truncate(&status), width = WIDTH);
        println!("└{}┘", "─".repeat(WIDTH));
    }
}

fn truncate(line: &str) -> String {
    line.chars().take(WIDTH).collect()
}

impl DeviceDisplay for DeviceDisplayConsole {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.render_display();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.text.clear();
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.text.push_str(text);
        self.render_display();
        Ok(())
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn bounds(&self) -> (u32, u32) {
        self.bounds
    }

    fn bind_preview(&mut self, size: (u32, u32)) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.preview_size = Some(size);
        Ok(())
    }

    fn show_preview(&mut self, _frame: &DynamicImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        // Frames are counted, not drawn
        self.preview_frames += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.render_display();
        Ok(())
    }
}
