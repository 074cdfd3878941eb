// SPDX-License-Identifier: GPL-3.0-only

//! Terminal preview
//!
//! Renders the camera feed to the terminal using Unicode half-block characters
//! for improved vertical resolution.

use super::{Preview, SessionInfo};
use crate::backends::camera::types::CameraFrame;
use crate::constants::timing;
use crate::errors::PreviewError;
use crate::media::converter::sample_display_rgb;
use crate::media::encoders::EncodedPacket;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, Stdout, stdout};
use tracing::{info, warn};

const STOP_HINT: &str = "Esc/q: stop recording";

/// Preview on the controlling terminal (alternate screen, raw mode)
pub struct TerminalPreview {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    frame_widget: FrameWidget,
    status_message: String,
}

impl TerminalPreview {
    /// Take over the terminal
    pub fn new() -> Result<Self, PreviewError> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        info!("Terminal preview started");
        Ok(Self {
            terminal,
            frame_widget: FrameWidget::new(),
            status_message: format!("Recording | {}", STOP_HINT),
        })
    }

    fn draw(&mut self) -> io::Result<()> {
        let frame_widget = &self.frame_widget;
        let status_message = &self.status_message;

        self.terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let camera_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };
            f.render_widget(frame_widget, camera_area);

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            f.render_widget(
                StatusBar {
                    message: status_message,
                },
                status_area,
            );
        })?;

        Ok(())
    }
}

impl Preview for TerminalPreview {
    fn recording_started(&mut self, info: &SessionInfo<'_>) {
        self.status_message = session_status(info);
    }

    fn show(&mut self, frame: &CameraFrame) -> Result<(), PreviewError> {
        self.frame_widget.update_frame(frame.clone());
        self.draw()?;
        Ok(())
    }

    fn poll_stop(&mut self) -> bool {
        match event::poll(timing::KEY_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    is_stop_key(key.code, key.modifiers)
                }
                Ok(_) => false,
                Err(e) => {
                    warn!(error = %e, "Failed to read terminal event");
                    false
                }
            },
            Ok(false) => false,
            Err(e) => {
                warn!(error = %e, "Failed to poll terminal events");
                false
            }
        }
    }

    fn packet_written(&mut self, index: u64, packet: &EncodedPacket) {
        self.status_message = format!(
            "{} packets | {} | {}",
            index + 1,
            packet.head_hex(),
            STOP_HINT
        );
    }
}

impl Drop for TerminalPreview {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn session_status(info: &SessionInfo<'_>) -> String {
    format!(
        "{} | {} {}x{}@{} | {}",
        info.output.display(),
        info.encoder,
        info.width,
        info.height,
        info.fps,
        STOP_HINT
    )
}

/// Esc, 'q' and Ctrl+C stop the recording
fn is_stop_key(code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Widget that renders a camera frame using half-block characters
struct FrameWidget {
    frame: Option<CameraFrame>,
}

impl FrameWidget {
    fn new() -> Self {
        Self { frame: None }
    }

    fn update_frame(&mut self, frame: CameraFrame) {
        self.frame = Some(frame);
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, ratatui::style::Style::default());
            }
            return;
        };

        let Some((display_width, display_height)) =
            fit_to_area(frame.width, frame.height, area.width, area.height)
        else {
            return;
        };

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        // Each terminal cell shows 2 vertical pixels: upper half (▀) is fg, lower is bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (r, g, b) = sample_display_rgb(frame, src_x, src_y_top);
                let top_color = Color::Rgb(r, g, b);
                let (r, g, b) = sample_display_rgb(frame, src_x, src_y_bottom);
                let bottom_color = Color::Rgb(r, g, b);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top_color);
                    cell.set_bg(bottom_color);
                }
            }
        }
    }
}

/// Cell size of a frame scaled into `cols`x`rows` keeping its aspect ratio
///
/// Rows count double because of the half-block rendering. Returns `None`
/// when nothing would be visible.
fn fit_to_area(width: u32, height: u32, cols: u16, rows: u16) -> Option<(u16, u16)> {
    if width == 0 || height == 0 || cols == 0 || rows == 0 {
        return None;
    }

    let frame_aspect = width as f64 / height as f64;
    let term_width = cols as f64;
    let term_height = (rows as f64) * 2.0;

    let (w, h) = if term_width / term_height > frame_aspect {
        // Terminal is wider - fit to height
        (term_height * frame_aspect, term_height)
    } else {
        // Terminal is taller - fit to width
        (term_width, term_width / frame_aspect)
    };

    let (cells_w, cells_h) = ((w as u16).min(cols), ((h / 2.0) as u16).min(rows));
    if cells_w == 0 || cells_h == 0 {
        None
    } else {
        Some((cells_w, cells_h))
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::PixelFormat;

    #[test]
    fn test_stop_keys() {
        assert!(is_stop_key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(is_stop_key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(is_stop_key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!is_stop_key(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(!is_stop_key(KeyCode::Enter, KeyModifiers::NONE));
    }

    #[test]
    fn test_fit_keeps_aspect_ratio() {
        // 4:3 frame in an 80x24 terminal is bounded by height (48 pixel rows)
        assert_eq!(fit_to_area(640, 480, 80, 24), Some((64, 24)));
        // Wide frame in a tall terminal is bounded by width
        assert_eq!(fit_to_area(1920, 480, 40, 40), Some((40, 5)));
        assert_eq!(fit_to_area(640, 480, 0, 24), None);
    }

    #[test]
    fn test_frame_widget_paints_half_blocks() {
        let frame =
            CameraFrame::from_bytes(PixelFormat::RGB24, 2, 2, vec![200, 10, 20].repeat(4), 0);
        let mut widget = FrameWidget::new();
        widget.update_frame(frame);

        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(200, 10, 20));
        assert_eq!(cell.bg, Color::Rgb(200, 10, 20));
    }

    #[test]
    fn test_session_status_line() {
        let info = SessionInfo {
            output: std::path::Path::new("out.h264"),
            encoder: "x264enc",
            width: 100,
            height: 75,
            fps: 30,
        };
        assert_eq!(
            session_status(&info),
            "out.h264 | x264enc 100x75@30 | Esc/q: stop recording"
        );
    }

    #[test]
    fn test_status_bar_truncates() {
        let area = Rect::new(0, 0, 4, 1);
        let mut buf = Buffer::empty(area);
        StatusBar {
            message: "recording",
        }
        .render(area, &mut buf);
        assert_eq!(buf[(3, 0)].symbol(), "o");
    }
}
