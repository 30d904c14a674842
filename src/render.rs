//! Terminal chart renderer
//!
//! Draws a [`ChartModel`] with ratatui: attention runs colored by label,
//! meditation as one magenta line, and a reference line at the threshold.
//! The chart stays open until `q` or `Esc` is pressed.

use crate::chart::ChartModel;
use ratatui::{
    crossterm::event::{self, Event, KeyCode, KeyEventKind},
    layout::{Constraint, Layout},
    style::{Color, Style},
    symbols::Marker,
    widgets::{Axis, Block, Chart, Dataset, GraphType, Paragraph},
    DefaultTerminal, Frame,
};
use thiserror::Error;

/// Rendering failures. These never affect computed summaries.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No interactive terminal available for the chart")]
    NoDisplay,

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Switch to the alternate screen, undoing any partial setup on failure
fn enter_terminal<T>(
    init: impl FnOnce() -> std::io::Result<T>,
    restore: impl FnOnce(),
) -> Result<T, RenderError> {
    init().map_err(|e| {
        restore();
        RenderError::Io(e)
    })
}

const ABOVE_COLOR: Color = Color::Green;
const BELOW_COLOR: Color = Color::Blue;
const MEDITATION_COLOR: Color = Color::Magenta;

/// Interactive chart window
pub struct ChartRenderer {
    title: String,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new("Attention and Meditation Scores Over Time")
    }
}

impl ChartRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Open the chart and block until the user closes it
    pub fn show(&self, model: &ChartModel) -> Result<(), RenderError> {
        if !atty::is(atty::Stream::Stdout) {
            return Err(RenderError::NoDisplay);
        }

        let mut terminal = enter_terminal(ratatui::try_init, ratatui::restore)?;
        let result = self.run(&mut terminal, model);
        ratatui::restore();
        result
    }

    fn run(&self, terminal: &mut DefaultTerminal, model: &ChartModel) -> Result<(), RenderError> {
        loop {
            terminal.draw(|frame| self.draw(frame, model))?;
            match event::read()? {
                Event::Key(key)
                    if key.kind == KeyEventKind::Press
                        && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) =>
                {
                    return Ok(());
                }
                _ => {}
            }
        }
    }

    fn draw(&self, frame: &mut Frame, model: &ChartModel) {
        let [chart_area, footer_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());

        let threshold_line = [
            (model.x_bounds[0], model.threshold),
            (model.x_bounds[1], model.threshold),
        ];

        let mut datasets = Vec::with_capacity(model.attention_runs.len() + 2);
        let mut above_named = false;
        let mut below_named = false;

        for run in &model.attention_runs {
            let (color, name) = if run.label.is_above() {
                let name = (!above_named).then_some("Attention (above)");
                above_named = true;
                (ABOVE_COLOR, name)
            } else {
                let name = (!below_named).then_some("Attention (below)");
                below_named = true;
                (BELOW_COLOR, name)
            };

            let marker = if run.points.len() == 1 {
                Marker::Dot
            } else {
                Marker::Braille
            };
            let mut dataset = Dataset::default()
                .marker(marker)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(&run.points);
            if let Some(name) = name {
                dataset = dataset.name(name);
            }
            datasets.push(dataset);
        }

        datasets.push(
            Dataset::default()
                .name("Meditation")
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(MEDITATION_COLOR))
                .data(&model.meditation),
        );
        datasets.push(
            Dataset::default()
                .marker(Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(&threshold_line),
        );

        let x_axis = Axis::default()
            .title("Time (seconds)")
            .bounds(model.x_bounds)
            .labels(axis_labels(model.x_bounds));
        let y_axis = Axis::default()
            .title("Score")
            .bounds(model.y_bounds)
            .labels(axis_labels(model.y_bounds));

        let chart = Chart::new(datasets)
            .block(Block::bordered().title(self.title.as_str()))
            .x_axis(x_axis)
            .y_axis(y_axis);

        let footer = Paragraph::new(format!(
            " {} s | threshold {} | q to quit",
            model.session_duration, model.threshold
        ));

        frame.render_widget(chart, chart_area);
        frame.render_widget(footer, footer_area);
    }
}

fn axis_labels(bounds: [f64; 2]) -> Vec<String> {
    vec![
        format!("{:.0}", bounds[0]),
        format!("{:.0}", (bounds[0] + bounds[1]) / 2.0),
        format!("{:.0}", bounds[1]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Session;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_axis_labels() {
        assert_eq!(axis_labels([0.0, 120.0]), vec!["0", "60", "120"]);
        assert_eq!(axis_labels([-5.0, 105.0]), vec!["-5", "50", "105"]);
    }

    #[test]
    fn test_terminal_setup_failure_is_error() {
        let mut restored = false;
        let result: Result<(), _> = enter_terminal(
            || Err(std::io::Error::new(std::io::ErrorKind::Unsupported, "no tty")),
            || restored = true,
        );

        assert!(matches!(result, Err(RenderError::Io(ref e)) if e.to_string() == "no tty"));
        assert!(restored);
    }

    #[test]
    fn test_terminal_setup_success_keeps_screen() {
        let mut restored = false;
        let result = enter_terminal(|| Ok(42), || restored = true);

        assert_eq!(result.unwrap(), 42);
        assert!(!restored);
    }

    #[test]
    fn test_draw_to_buffer() {
        let session = Session::new(vec![10.0, 80.0, 90.0, 20.0], vec![40.0, 45.0, 50.0, 55.0])
            .unwrap();
        let model = ChartModel::build(&session);
        let renderer = ChartRenderer::default();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| renderer.draw(frame, &model)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Attention and Meditation Scores Over Time"));
        assert!(text.contains("q to quit"));
    }
}
