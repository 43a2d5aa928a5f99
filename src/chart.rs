//! Per-word timing chart.
//!
//! The layout is computed in surface pixels with the origin at the top-left
//! corner and y growing downwards. Drawing goes through [`Surface`] so the
//! same algorithm can target a terminal canvas or a recorder in tests.

pub const LEFT_PAD: f64 = 50.0;
pub const RIGHT_PAD: f64 = 20.0;
pub const TOP_PAD: f64 = 20.0;
pub const BOTTOM_PAD: f64 = 50.0;
pub const MARKER_RADIUS: f64 = 4.0;
pub const MAX_X_TICKS: usize = 10;
pub const Y_STEPS: usize = 5;

pub const X_AXIS_LABEL: &str = "Word Index";
pub const Y_AXIS_LABEL: &str = "Time (s)";
pub const NO_DATA: &str = "No data available";
pub const NO_VALID_DATA: &str = "No valid data";
pub const PLACEHOLDER_AT: Point = Point { x: 20.0, y: 60.0 };

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Role of a drawing command, mapped to a colour by the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
    Series,
    Axis,
    Label,
    Muted,
}

/// A 2-D target the chart can be drawn on
pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn clear(&mut self);
    fn polyline(&mut self, points: &[Point], ink: Ink);
    fn marker(&mut self, at: Point, radius: f64, ink: Ink);
    fn line(&mut self, from: Point, to: Point, ink: Ink);
    fn text(&mut self, at: Point, text: &str, align: TextAlign, ink: Ink);
    /// Text rotated a quarter turn counter-clockwise, centred on `at`
    fn vertical_text(&mut self, at: Point, text: &str, ink: Ink);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Polyline { points: Vec<Point>, ink: Ink },
    Marker { at: Point, radius: f64, ink: Ink },
    Line { from: Point, to: Point, ink: Ink },
    Text { at: Point, text: String, align: TextAlign, ink: Ink },
    VerticalText { at: Point, text: String, ink: Ink },
}

/// Surface that just remembers what was drawn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } | DrawCommand::VerticalText { text, .. } => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect()
    }

    pub fn markers(&self) -> Vec<Point> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Marker { at, .. } => Some(*at),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn polyline(&mut self, points: &[Point], ink: Ink) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            ink,
        });
    }

    fn marker(&mut self, at: Point, radius: f64, ink: Ink) {
        self.commands.push(DrawCommand::Marker { at, radius, ink });
    }

    fn line(&mut self, from: Point, to: Point, ink: Ink) {
        self.commands.push(DrawCommand::Line { from, to, ink });
    }

    fn text(&mut self, at: Point, text: &str, align: TextAlign, ink: Ink) {
        self.commands.push(DrawCommand::Text {
            at,
            text: text.to_string(),
            align,
            ink,
        });
    }

    fn vertical_text(&mut self, at: Point, text: &str, ink: Ink) {
        self.commands.push(DrawCommand::VerticalText {
            at,
            text: text.to_string(),
            ink,
        });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub at: Point,
    pub label: String,
}

/// Everything needed to draw the chart, in surface pixels
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub graph_width: f64,
    pub graph_height: f64,
    pub max: f64,
    pub points: Vec<Point>,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
}

impl ChartLayout {
    /// `None` when no finite positive value survives filtering
    pub fn compute(word_times: &[f64], width: f64, height: f64) -> Option<Self> {
        let values = valid_values(word_times);
        if values.is_empty() {
            return None;
        }

        let max = values.iter().copied().fold(1.0_f64, f64::max);
        let graph_width = (width - LEFT_PAD - RIGHT_PAD).max(0.0);
        let graph_height = (height - TOP_PAD - BOTTOM_PAD).max(0.0);
        let n = values.len();

        let x_at = |idx: usize| -> f64 {
            if n == 1 {
                LEFT_PAD + graph_width / 2.0
            } else {
                LEFT_PAD + (idx as f64 / (n - 1) as f64) * graph_width
            }
        };
        let y_at = |v: f64| -> f64 { TOP_PAD + graph_height - (v / max) * graph_height };

        let points = values
            .iter()
            .enumerate()
            .map(|(idx, &v)| Point::new(x_at(idx), y_at(v)))
            .collect();

        let x_tick_count = n.min(MAX_X_TICKS);
        let x_ticks = (0..x_tick_count)
            .map(|i| {
                let spread = (x_tick_count - 1).max(1);
                let idx = i * (n - 1) / spread;
                Tick {
                    at: Point::new(x_at(idx), height - 28.0),
                    label: (idx + 1).to_string(),
                }
            })
            .collect();

        let y_ticks = (0..=Y_STEPS)
            .map(|i| {
                let val = (i as f64 / Y_STEPS as f64) * max;
                Tick {
                    at: Point::new(LEFT_PAD - 8.0, y_at(val) + 4.0),
                    label: format!("{val:.2}"),
                }
            })
            .collect();

        Some(Self {
            width,
            height,
            graph_width,
            graph_height,
            max,
            points,
            x_ticks,
            y_ticks,
        })
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(LEFT_PAD, TOP_PAD + self.graph_height)
    }
}

/// Finite, strictly positive samples, in input order
pub fn valid_values(word_times: &[f64]) -> Vec<f64> {
    word_times
        .iter()
        .copied()
        .filter(|t| t.is_finite() && *t > 0.0)
        .collect()
}

/// What a render call ended up drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartOutcome {
    Placeholder(&'static str),
    Plotted { points: usize },
}

/// Draws per-word times as a line-and-points series with axes and ticks
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartRenderer;

impl ChartRenderer {
    /// Clear `surface` and draw the chart for `word_times` on it. Safe to call
    /// repeatedly.
    pub fn render<S: Surface + ?Sized>(&self, word_times: &[f64], surface: &mut S) -> ChartOutcome {
        surface.clear();

        if word_times.is_empty() {
            surface.text(PLACEHOLDER_AT, NO_DATA, TextAlign::Left, Ink::Muted);
            return ChartOutcome::Placeholder(NO_DATA);
        }

        let Some(layout) = ChartLayout::compute(word_times, surface.width(), surface.height())
        else {
            surface.text(PLACEHOLDER_AT, NO_VALID_DATA, TextAlign::Left, Ink::Muted);
            return ChartOutcome::Placeholder(NO_VALID_DATA);
        };

        surface.polyline(&layout.points, Ink::Series);
        for &p in &layout.points {
            surface.marker(p, MARKER_RADIUS, Ink::Series);
        }

        let origin = layout.bottom_left();
        surface.line(
            origin,
            Point::new(LEFT_PAD + layout.graph_width, origin.y),
            Ink::Axis,
        );
        surface.line(Point::new(LEFT_PAD, TOP_PAD), origin, Ink::Axis);

        surface.text(
            Point::new(LEFT_PAD + layout.graph_width / 2.0, layout.height - 8.0),
            X_AXIS_LABEL,
            TextAlign::Center,
            Ink::Label,
        );
        surface.vertical_text(
            Point::new(12.0, TOP_PAD + layout.graph_height / 2.0),
            Y_AXIS_LABEL,
            Ink::Label,
        );

        for tick in &layout.x_ticks {
            surface.text(tick.at, &tick.label, TextAlign::Center, Ink::Label);
        }
        for tick in &layout.y_ticks {
            surface.text(tick.at, &tick.label, TextAlign::Right, Ink::Label);
        }

        ChartOutcome::Plotted {
            points: layout.points.len(),
        }
    }
}
