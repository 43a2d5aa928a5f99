use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
        Widget,
    },
};
use unicode_width::UnicodeWidthStr;

use crate::chart::{ChartOutcome, ChartRenderer, DrawCommand, Ink, Point, RecordingSurface, TextAlign};

/// Virtual pixels per terminal cell. The chart geometry is laid out in these
/// units and scaled back onto the cell grid by the canvas.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

pub fn ink_color(ink: Ink) -> Color {
    match ink {
        Ink::Series => Color::Blue,
        Ink::Axis => Color::DarkGray,
        Ink::Label => Color::White,
        Ink::Muted => Color::Gray,
    }
}

/// Per-word timing chart for the results overlay
pub struct TimingChart<'a> {
    word_times: &'a [f64],
}

impl<'a> TimingChart<'a> {
    pub fn new(word_times: &'a [f64]) -> Self {
        Self { word_times }
    }

    /// Lay out the chart for a terminal area of the given size
    pub fn draw(&self, area: Rect) -> (RecordingSurface, ChartOutcome) {
        let mut surface = RecordingSurface::new(
            area.width as f64 * CELL_WIDTH_PX,
            area.height as f64 * CELL_HEIGHT_PX,
        );
        let outcome = ChartRenderer.render(self.word_times, &mut surface);
        (surface, outcome)
    }
}

impl Widget for TimingChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let (surface, _) = self.draw(area);
        let width = area.width as f64 * CELL_WIDTH_PX;
        let height = area.height as f64 * CELL_HEIGHT_PX;

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for command in &surface.commands {
                    paint(ctx, command, height);
                }
            })
            .render(area, buf);
    }
}

// the surface grows downwards, the canvas upwards
fn flip(p: Point, height: f64) -> (f64, f64) {
    (p.x, height - p.y)
}

fn paint(ctx: &mut Context, command: &DrawCommand, height: f64) {
    match command {
        DrawCommand::Clear => {}
        DrawCommand::Polyline { points, ink } => {
            for pair in points.windows(2) {
                segment(ctx, pair[0], pair[1], *ink, height);
            }
        }
        DrawCommand::Marker { at, radius, ink } => {
            let (x, y) = flip(*at, height);
            ctx.draw(&Circle {
                x,
                y,
                radius: *radius,
                color: ink_color(*ink),
            });
        }
        DrawCommand::Line { from, to, ink } => segment(ctx, *from, *to, *ink, height),
        DrawCommand::Text {
            at,
            text,
            align,
            ink,
        } => {
            let text_px = text.width() as f64 * CELL_WIDTH_PX;
            let x = match align {
                TextAlign::Left => at.x,
                TextAlign::Center => at.x - text_px / 2.0,
                TextAlign::Right => at.x - text_px,
            };
            let (x, y) = flip(Point::new(x.max(0.0), at.y), height);
            ctx.print(x, y, Span::styled(text.clone(), Style::default().fg(ink_color(*ink))));
        }
        DrawCommand::VerticalText { at, text, ink } => {
            let count = text.chars().count() as f64;
            let top = at.y - count * CELL_HEIGHT_PX / 2.0;
            let style = Style::default().fg(ink_color(*ink));
            for (i, c) in text.chars().enumerate() {
                let (x, y) = flip(Point::new(at.x, top + i as f64 * CELL_HEIGHT_PX), height);
                ctx.print(x, y, Span::styled(c.to_string(), style));
            }
        }
    }
}

fn segment(ctx: &mut Context, from: Point, to: Point, ink: Ink, height: f64) {
    let (x1, y1) = flip(from, height);
    let (x2, y2) = flip(to, height);
    ctx.draw(&CanvasLine {
        x1,
        y1,
        x2,
        y2,
        color: ink_color(ink),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Surface, NO_DATA, NO_VALID_DATA};
    use assert_matches::assert_matches;

    fn rendered(times: &[f64], area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        TimingChart::new(times).render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_empty_series_shows_placeholder() {
        let area = Rect::new(0, 0, 60, 20);
        assert!(rendered(&[], area).contains(NO_DATA));
    }

    #[test]
    fn test_invalid_series_shows_placeholder() {
        let area = Rect::new(0, 0, 60, 20);
        assert!(rendered(&[f64::NAN, -1.0], area).contains(NO_VALID_DATA));
    }

    #[test]
    fn test_series_is_plotted() {
        let area = Rect::new(0, 0, 80, 20);
        let chart = TimingChart::new(&[0.4, 1.2, 0.8]);
        let (surface, outcome) = chart.draw(area);
        assert_matches!(outcome, ChartOutcome::Plotted { points: 3 });
        assert_eq!(surface.width(), 640.0);
        assert_eq!(surface.height(), 320.0);

        let text = rendered(&[0.4, 1.2, 0.8], area);
        assert!(text.contains("Word Index"));
        assert!(text.contains("1.20"));
    }

    #[test]
    fn test_zero_area_is_ignored() {
        let area = Rect::new(0, 0, 0, 0);
        let mut buffer = Buffer::empty(area);
        TimingChart::new(&[1.0]).render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }

    #[test]
    fn test_ink_colors_are_distinct() {
        assert_ne!(ink_color(Ink::Series), ink_color(Ink::Axis));
        assert_ne!(ink_color(Ink::Label), ink_color(Ink::Axis));
    }
}
