use crate::playback::ChartView;
use imgui::{MouseButton, StyleColor, Ui};

const CURSOR_COLOR: [f32; 4] = [1.0, 0.2, 0.2, 1.0];
const LINE_COLOR: [f32; 4] = [0.29, 0.75, 0.75, 1.0];

/// Plot geometry the cached polyline was projected for
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlotKey {
    range: (f64, f64),
    pos_min: [f32; 2],
    pos_max: [f32; 2],
}

/// Time-series line chart with a vertical playback cursor
pub struct LineChart {
    title: String,
    y_label: String,
    labels: Vec<String>,
    /// (time, value) pairs in insertion order
    points: Vec<[f64; 2]>,
    cursor: Option<f64>,
    y_range: (f64, f64),
    /// History entries per x unit, used for the cursor readout lookup
    samples_per_unit: f64,
    /// Visible time window in seconds (zoom level)
    time_window_secs: f32,
    /// Keep the newest sample at the right edge
    follow: bool,
    /// Right edge of the window when not following
    view_end: f64,
    /// Set by `update()`; the polyline is rebuilt on the next draw
    dirty: bool,
    polyline: Vec<[f32; 2]>,
    polyline_key: Option<PlotKey>,
}

impl LineChart {
    pub fn new(title: &str, y_label: &str, samples_per_unit: f64) -> Self {
        Self {
            title: title.to_string(),
            y_label: y_label.to_string(),
            labels: Vec::new(),
            points: Vec::new(),
            cursor: None,
            y_range: (-20.0, 20.0),
            samples_per_unit,
            time_window_secs: 20.0,
            follow: true,
            view_end: 0.0,
            dirty: false,
            polyline: Vec::new(),
            polyline_key: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_time_window(&mut self, secs: f32) {
        self.time_window_secs = secs.clamp(0.5, 100.0);
    }

    pub fn set_follow(&mut self, follow: bool) {
        if !follow {
            self.view_end = self.visible_range().1;
        }
        self.follow = follow;
    }

    /// Cursor position and the charted value underneath it.
    ///
    /// The value is the sample at `round(x * samples_per_unit)`, clamped to
    /// the recorded range.
    pub fn cursor_readout(&self) -> Option<(f64, f64)> {
        let x = self.cursor.filter(|x| x.is_finite())?;
        let last = self.points.len().checked_sub(1)?;
        let index = (x * self.samples_per_unit).round().max(0.0) as usize;
        Some((x, self.points[index.min(last)][1]))
    }

    /// Visible time span `(start, end)`
    pub fn visible_range(&self) -> (f64, f64) {
        let window = self.time_window_secs as f64;
        let end = if self.follow {
            self.points.last().map(|p| p[0]).unwrap_or(0.0)
        } else {
            self.view_end
        };
        let start = end - window;
        if start < 0.0 {
            (0.0, window)
        } else {
            (start, end)
        }
    }

    fn zoom(&mut self, wheel: f32) {
        let factor = if wheel > 0.0 { 1.0 / 1.25 } else { 1.25 };
        self.set_time_window(self.time_window_secs * factor);
    }

    fn pan(&mut self, delta_secs: f64) {
        if self.follow {
            self.set_follow(false);
        }
        self.view_end = (self.view_end - delta_secs).max(self.time_window_secs as f64);
    }

    /// Reproject the visible samples into screen space.
    ///
    /// Only runs when the chart was marked dirty or the plot geometry
    /// (visible range, widget rect) moved since the last projection.
    /// Returns whether the polyline was rebuilt.
    fn prepare_polyline(&mut self, range: (f64, f64), pos_min: [f32; 2], pos_max: [f32; 2]) -> bool {
        let key = PlotKey { range, pos_min, pos_max };
        if !self.dirty && self.polyline_key == Some(key) {
            return false;
        }

        let (time_start, time_end) = range;
        let (min_val, max_val) = self.y_range;
        self.polyline = self.points.iter()
            .filter(|p| p[0] >= time_start && p[0] <= time_end)
            .map(|p| [
                time_to_x(p[0], time_start, time_end, pos_min, pos_max),
                value_to_y(p[1], min_val, max_val, pos_min, pos_max),
            ])
            .collect();
        self.polyline_key = Some(key);
        self.dirty = false;
        true
    }

    pub fn render(&mut self, ui: &Ui) {
        ui.text("Window:");
        ui.same_line();
        if ui.small_button("-") {
            self.set_time_window(self.time_window_secs - 5.0);
        }
        ui.same_line();
        ui.text(format!("{:.1}s", self.time_window_secs));
        ui.same_line();
        if ui.small_button("+") {
            self.set_time_window(self.time_window_secs + 5.0);
        }
        ui.same_line();
        let mut follow = self.follow;
        if ui.checkbox("Follow", &mut follow) {
            self.set_follow(follow);
        }

        let avail = ui.content_region_avail();
        let size = [avail[0].max(50.0), (avail[1] - 22.0).max(120.0)];
        let pos_min = ui.cursor_screen_pos();
        let pos_max = [pos_min[0] + size[0], pos_min[1] + size[1]];

        ui.invisible_button(format!("##{}_area", self.title), size);
        if ui.is_item_hovered() {
            let wheel = ui.io().mouse_wheel;
            if wheel != 0.0 {
                self.zoom(wheel);
            }
        }
        if ui.is_item_active() && ui.is_mouse_dragging(MouseButton::Left) {
            let dx = ui.io().mouse_delta[0] as f64;
            self.pan(dx / size[0] as f64 * self.time_window_secs as f64);
        }

        let (time_start, time_end) = self.visible_range();
        let (min_val, max_val) = self.y_range;
        self.prepare_polyline((time_start, time_end), pos_min, pos_max);
        {
            let draw_list = ui.get_window_draw_list();

            draw_list.add_rect(pos_min, pos_max, ui.style_color(StyleColor::FrameBg))
                .filled(true)
                .build();

            // Horizontal grid every quarter of the value range
            for i in 0..=4 {
                let value = min_val + (max_val - min_val) * i as f64 / 4.0;
                let y = value_to_y(value, min_val, max_val, pos_min, pos_max);
                let color = if value == 0.0 { [0.5, 0.5, 0.5, 0.5] } else { [0.4, 0.4, 0.4, 0.2] };
                draw_list.add_line([pos_min[0], y], [pos_max[0], y], color).build();
                draw_list.add_text([pos_min[0] + 3.0, y - 14.0], [0.6, 0.6, 0.6, 0.8], format!("{:.0}", value));
            }

            if self.polyline.len() >= 2 {
                draw_list.add_polyline(self.polyline.clone(), LINE_COLOR).thickness(2.0).build();
            }

            if let Some((x, y)) = self.cursor_readout().or_else(|| self.cursor.map(|x| (x, 0.0))) {
                if x >= time_start && x <= time_end {
                    let px = time_to_x(x, time_start, time_end, pos_min, pos_max);
                    draw_list.add_line([px, pos_min[1]], [px, pos_max[1]], CURSOR_COLOR)
                        .thickness(2.0)
                        .build();
                    if !self.points.is_empty() {
                        let py = value_to_y(y, min_val, max_val, pos_min, pos_max);
                        draw_list.add_text([px + 5.0, py - 18.0], CURSOR_COLOR, format!("({:.1}, {:.2})", x, y));
                    }
                }
            }

            draw_list.add_text(
                [pos_min[0] + 5.0, pos_max[1] - 15.0],
                [0.6, 0.6, 0.6, 0.8],
                format!("{:.1}s", time_start),
            );
            draw_list.add_text(
                [pos_max[0] - 45.0, pos_max[1] - 15.0],
                [0.6, 0.6, 0.6, 0.8],
                format!("{:.1}s", time_end),
            );
        }

        let latest = self.points.last().map(|p| p[1]).unwrap_or(0.0);
        let at = self.labels.last().map(String::as_str).unwrap_or("-");
        ui.text(format!("{}: {:.2} at t={} ({} samples)", self.y_label, latest, at, self.points.len()));
    }
}

#[cfg(test)]
impl LineChart {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p[1])
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn cursor(&self) -> Option<f64> {
        self.cursor
    }

    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    pub fn time_window(&self) -> f32 {
        self.time_window_secs
    }
}

impl ChartView for LineChart {
    fn append_sample(&mut self, label: &str, value: f64) {
        // Labels are formatted times; fall back to the sample slot if one isn't
        let x = label.trim().parse::<f64>()
            .unwrap_or(self.points.len() as f64 / self.samples_per_unit);
        self.labels.push(label.to_string());
        self.points.push([x, value]);
    }

    fn clear(&mut self) {
        self.labels.clear();
        self.points.clear();
        self.cursor = None;
        self.view_end = 0.0;
    }

    fn set_cursor(&mut self, x: f64) {
        self.cursor = Some(x);
    }

    fn update(&mut self) {
        self.dirty = true;
    }
}

fn value_to_y(value: f64, min: f64, max: f64, pos_min: [f32; 2], pos_max: [f32; 2]) -> f32 {
    let range = max - min;
    if range == 0.0 {
        return (pos_min[1] + pos_max[1]) / 2.0;
    }
    let normalized = ((value - min) / range).clamp(0.0, 1.0);
    pos_max[1] - (normalized as f32) * (pos_max[1] - pos_min[1])
}

fn time_to_x(time: f64, time_start: f64, time_end: f64, pos_min: [f32; 2], pos_max: [f32; 2]) -> f32 {
    let total = time_end - time_start;
    if total <= 0.0 {
        return (pos_min[0] + pos_max[0]) / 2.0;
    }
    let normalized = ((time - time_start) / total).clamp(0.0, 1.0);
    pos_min[0] + (normalized as f32) * (pos_max[0] - pos_min[0])
}
