use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Point, Rectangle, Renderer, Subscription, Task, Theme,
};
use mapvalcore::render::{Figure, Rgb, Rgba, Trace, Viewport};
use mapvalcore::report::FlatRow;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const BRIDGE_URL: &str = "http://127.0.0.1:9000";

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Lanelet2 Map Validator".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_secs(1)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Light
}

#[derive(Debug)]
struct Visualizer {
    map_path: String,
    session: Option<SessionView>,
    figure: Option<Figure>,
    figure_revision: Option<u64>,
    status: String,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    SessionFetched(Result<SessionView, String>),
    FigureFetched(Result<Figure, String>),
    MapPathChanged(String),
    Upload,
    Delete,
    RowPressed(usize),
    ActionDone(Result<SessionView, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                map_path: String::new(),
                session: None,
                figure: None,
                figure_revision: None,
                status: "Connecting to dashboard...".into(),
            },
            Task::perform(fetch_session(), Message::SessionFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(fetch_session(), Message::SessionFetched),
            Message::SessionFetched(Ok(session)) => state.apply_session(session),
            Message::SessionFetched(Err(err)) => {
                state.status = format!("Dashboard unreachable: {err}");
                Task::none()
            }
            Message::FigureFetched(Ok(figure)) => {
                state.figure = Some(figure);
                Task::none()
            }
            Message::FigureFetched(Err(err)) => {
                state.figure_revision = None;
                state.status = format!("Figure error: {err}");
                Task::none()
            }
            Message::MapPathChanged(value) => {
                state.map_path = value;
                Task::none()
            }
            Message::Upload => {
                let path = state.map_path.trim().to_string();
                if path.is_empty() {
                    state.status = "Enter the path of a .osm map first.".into();
                    return Task::none();
                }
                state.status = format!("Uploading {path}...");
                Task::perform(upload_map(path), Message::ActionDone)
            }
            Message::Delete => Task::perform(post_action("delete", None), Message::ActionDone),
            Message::RowPressed(index) => {
                let selected = state.session.as_ref().and_then(|s| s.selected_row);
                let row = if selected == Some(index) {
                    None
                } else {
                    Some(index)
                };
                Task::perform(
                    post_action("select", Some(json!({ "row": row }))),
                    Message::ActionDone,
                )
            }
            Message::ActionDone(Ok(session)) => state.apply_session(session),
            Message::ActionDone(Err(err)) => {
                state.status = format!("Request failed: {err}");
                Task::none()
            }
        }
    }

    fn apply_session(&mut self, session: SessionView) -> Task<Message> {
        self.status = session.status.clone();
        let stale = self.figure_revision != Some(session.revision);
        self.figure_revision = Some(session.revision);
        self.session = Some(session);
        if stale {
            Task::perform(fetch_figure(), Message::FigureFetched)
        } else {
            Task::none()
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let session = state.session.as_ref();

        let uploaded = session
            .and_then(|s| s.uploaded_file.clone())
            .unwrap_or_else(|| "no map uploaded".into());
        let selected = session
            .and_then(|s| s.selected_id.clone())
            .unwrap_or_else(|| "none".into());

        let warnings = session
            .map(|s| s.warnings.as_slice())
            .unwrap_or_default()
            .iter()
            .fold(Column::new().spacing(4), |col, warning| {
                col.push(text(format!("warning: {warning}")).size(12))
            });

        let failure_panel = match session.and_then(|s| s.failure.as_ref()) {
            Some(failure) => column![
                text(failure.message.clone()).size(14),
                text(format!(
                    "exit code: {}",
                    failure
                        .exit_code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "n/a".into())
                ))
                .size(12),
                text("stdout").size(12),
                Container::new(scrollable(text(failure.stdout.clone()).size(11)).height(Length::Fixed(120.0)))
                    .padding(4),
                text("stderr").size(12),
                Container::new(scrollable(text(failure.stderr.clone()).size(11)).height(Length::Fixed(120.0)))
                    .padding(4),
            ]
            .spacing(4),
            None => Column::new(),
        };

        let control_column = column![
            text("Map validation").size(26),
            text_input("Path to .osm map", &state.map_path)
                .on_input(Message::MapPathChanged)
                .on_submit(Message::Upload)
                .padding(6),
            row![
                button("Upload & validate").on_press(Message::Upload).padding(10),
                button("Delete uploads").on_press(Message::Delete).padding(10),
            ]
            .spacing(10),
            text(format!("uploaded: {uploaded}")).size(14),
            text(format!("selected id: {selected}")).size(18),
            text(&state.status).size(14),
            warnings,
            failure_panel,
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(380.0));

        let map_canvas = Canvas::new(MapFigure {
            figure: state.figure.clone(),
        })
        .width(Length::Fill)
        .height(Length::Fixed(620.0));

        let header = text(
            session
                .map(|s| s.columns.join(" | "))
                .unwrap_or_default(),
        )
        .size(12);
        let rows = session.map(|s| s.rows.as_slice()).unwrap_or_default();
        let selected_row = session.and_then(|s| s.selected_row);
        let table = if rows.is_empty() {
            Column::new().push(text("No validation results").size(12))
        } else {
            rows.iter()
                .enumerate()
                .fold(Column::new().spacing(2), |col, (idx, flat)| {
                    let marker = if selected_row == Some(idx) { "▶ " } else { "" };
                    col.push(
                        button(text(format!("{marker}{}", flat.display_cells().join(" | "))).size(12))
                            .on_press(Message::RowPressed(idx))
                            .width(Length::Fill)
                            .padding(4),
                    )
                })
        };

        let results_column = column![
            text(format!(
                "Map ({} shapes)",
                session.map(|s| s.shape_count).unwrap_or_default()
            ))
            .size(18),
            map_canvas,
            text("Validation results").size(18),
            header,
            Container::new(scrollable(table).height(Length::Fill)).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![control_column, results_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SessionView {
    #[serde(default)]
    revision: u64,
    #[serde(default)]
    uploaded_file: Option<String>,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<FlatRow>,
    #[serde(default)]
    selected_row: Option<usize>,
    #[serde(default)]
    selected_id: Option<String>,
    #[serde(default)]
    shape_count: usize,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    failure: Option<FailureView>,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Clone, Deserialize)]
struct FailureView {
    message: String,
    exit_code: Option<i32>,
    #[serde(default)]
    stdout: String,
    #[serde(default)]
    stderr: String,
}

async fn fetch_session() -> Result<SessionView, String> {
    let response = reqwest::get(format!("{BRIDGE_URL}/session"))
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<SessionView>()
        .await
        .map_err(|e| e.to_string())
}

async fn fetch_figure() -> Result<Figure, String> {
    let response = reqwest::get(format!("{BRIDGE_URL}/figure"))
        .await
        .map_err(|e| e.to_string())?;
    response.json::<Figure>().await.map_err(|e| e.to_string())
}

async fn upload_map(path: String) -> Result<SessionView, String> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("{path}: {e}"))?;
    let name = std::path::Path::new(&path)
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("{path}: not a file path"))?
        .to_string();
    let response = reqwest::Client::new()
        .post(format!("{BRIDGE_URL}/upload"))
        .query(&[("name", name)])
        .body(bytes)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    session_from(response).await
}

async fn post_action(
    action: &'static str,
    body: Option<serde_json::Value>,
) -> Result<SessionView, String> {
    let request = reqwest::Client::new().post(format!("{BRIDGE_URL}/{action}"));
    let request = match body {
        Some(body) => request.json(&body),
        None => request,
    };
    let response = request.send().await.map_err(|e| e.to_string())?;
    session_from(response).await
}

async fn session_from(response: reqwest::Response) -> Result<SessionView, String> {
    if response.status().is_success() {
        response
            .json::<SessionView>()
            .await
            .map_err(|e| e.to_string())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_else(|_| "".into());
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or(text);
        Err(format!("{}: {}", status, message))
    }
}

/// Maps map coordinates into a canvas of `width` x `height` with one scale
/// for both axes, y pointing up.
#[derive(Debug, Clone, Copy)]
struct Fit {
    viewport: Viewport,
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl Fit {
    fn new(viewport: Viewport, width: f32, height: f32) -> Self {
        let span_x = viewport.width().max(f64::EPSILON) as f32;
        let span_y = viewport.height().max(f64::EPSILON) as f32;
        let scale = (width / span_x).min(height / span_y);
        Self {
            viewport,
            scale,
            offset_x: (width - span_x * scale) / 2.0,
            offset_y: (height - span_y * scale) / 2.0,
        }
    }

    fn point(&self, x: f64, y: f64) -> Point {
        Point::new(
            self.offset_x + (x - self.viewport.x_min) as f32 * self.scale,
            self.offset_y + (self.viewport.y_max - y) as f32 * self.scale,
        )
    }
}

fn line_color(rgb: Rgb) -> Color {
    Color::from_rgb8(rgb.r, rgb.g, rgb.b)
}

fn fill_color(rgba: Rgba) -> Color {
    Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.opacity())
}

/// Every multi-point trace is drawn as a semi-transparent region, matching the SVG export.
fn trace_fill(trace: &Trace) -> Option<Color> {
    (trace.x.len() > 1).then(|| fill_color(trace.fill_color))
}

#[derive(Clone)]
struct MapFigure {
    figure: Option<Figure>,
}

impl MapFigure {
    fn draw_trace(frame: &mut Frame, trace: &Trace, fit: &Fit) {
        let color = line_color(trace.line_color);
        if trace.x.len() == 1 {
            let marker = Path::circle(fit.point(trace.x[0], trace.y[0]), 3.0);
            frame.fill(&marker, color);
            return;
        }

        let closed = trace.kind.is_polygon();
        let path = Path::new(|builder| {
            for (i, (x, y)) in trace.x.iter().zip(&trace.y).enumerate() {
                let point = fit.point(*x, *y);
                if i == 0 {
                    builder.move_to(point);
                } else {
                    builder.line_to(point);
                }
            }
            if closed {
                builder.close();
            }
        });
        if let Some(fill) = trace_fill(trace) {
            frame.fill(&path, fill);
        }
        frame.stroke(
            &path,
            Stroke::default()
                .with_width(trace.line_width)
                .with_color(color),
        );
    }
}

impl canvas::Program<Message> for MapFigure {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::WHITE);

        if let Some(figure) = &self.figure {
            if let Some(viewport) = figure.viewport {
                let fit = Fit::new(viewport, bounds.width, bounds.height);
                for trace in figure.traces.iter().filter(|t| !t.highlighted) {
                    Self::draw_trace(&mut frame, trace, &fit);
                }
                for trace in figure.traces.iter().filter(|t| t.highlighted) {
                    Self::draw_trace(&mut frame, trace, &fit);
                }
            }
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapvalcore::map::{RegulatoryKind, ShapeKind};

    #[test]
    fn fit_keeps_equal_scale_and_flips_y() {
        let viewport = Viewport {
            x_min: 0.0,
            x_max: 10.0,
            y_min: 0.0,
            y_max: 10.0,
        };
        let fit = Fit::new(viewport, 200.0, 100.0);
        assert_eq!(fit.scale, 10.0);
        assert_eq!(fit.point(0.0, 10.0), Point::new(50.0, 0.0));
        assert_eq!(fit.point(10.0, 0.0), Point::new(150.0, 100.0));
    }

    fn trace(kind: ShapeKind, points: usize) -> Trace {
        Trace {
            id: 1,
            name: "id: 1".into(),
            kind,
            x: vec![0.0; points],
            y: vec![0.0; points],
            line_color: Rgb::BLUE,
            fill_color: Rgba::SKY,
            line_width: 1.0,
            highlighted: false,
        }
    }

    #[test]
    fn every_multi_point_trace_is_filled() {
        let expected = Color::from_rgba8(135, 206, 235, 0.5);
        assert_eq!(trace_fill(&trace(ShapeKind::Lane, 5)), Some(expected));
        assert_eq!(trace_fill(&trace(ShapeKind::LineString, 2)), Some(expected));
        assert_eq!(
            trace_fill(&trace(ShapeKind::Regulatory(RegulatoryKind::StopLine), 1)),
            None
        );
    }

    #[test]
    fn session_view_tolerates_missing_fields() {
        let view: SessionView = serde_json::from_str(r#"{"revision": 3}"#).unwrap();
        assert_eq!(view.revision, 3);
        assert!(view.rows.is_empty());
        assert!(view.failure.is_none());
    }
}
