use chrono::{DateTime, NaiveDateTime};
use eframe::egui::{Color32, Ui};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoint, PlotPoints};

use crate::color::SeriesColors;
use crate::data::model::ResampledSeries;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Chart traces
// ---------------------------------------------------------------------------

/// One plotted series, broken into runs of consecutive present values so a
/// missing bucket shows as a gap instead of a bridged or zeroed line.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub color: Color32,
    /// `[unix seconds, value]` runs.
    pub segments: Vec<Vec<[f64; 2]>>,
}

pub fn build_traces(
    resampled: &ResampledSeries,
    series: &[String],
    colors: &SeriesColors,
) -> Vec<Trace> {
    series
        .iter()
        .filter_map(|name| {
            let points = resampled.series(name)?;
            let mut segments = Vec::new();
            let mut run = Vec::new();
            for (start, value) in points {
                match value {
                    Some(v) => run.push([to_x(start), v]),
                    None if !run.is_empty() => segments.push(std::mem::take(&mut run)),
                    None => {}
                }
            }
            if !run.is_empty() {
                segments.push(run);
            }
            Some(Trace {
                name: name.clone(),
                color: colors.color_for(name),
                segments,
            })
        })
        .collect()
}

fn to_x(ts: NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64
}

fn format_x(x: f64, pattern: &str) -> String {
    DateTime::from_timestamp(x as i64, 0)
        .map(|dt| dt.naive_utc().format(pattern).to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Time-series plot (central panel)
// ---------------------------------------------------------------------------

/// Render the actual-vs-predicted chart for the current page.
pub fn series_plot(ui: &mut Ui, state: &AppState) {
    let (Some(out), Some(colors), Some(spec)) =
        (&state.output, &state.colors, state.current_spec())
    else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No data to show (File → Open data folder…)");
        });
        return;
    };

    ui.strong(&spec.chart_title);
    let traces = build_traces(&out.resampled, &out.series, colors);

    Plot::new("series_plot")
        .legend(Legend::default())
        .x_axis_label("Time")
        .y_axis_label(spec.value_label.as_str())
        .x_axis_formatter(|mark: GridMark, _range| format_x(mark.value, "%Y-%m-%d"))
        .label_formatter(|name: &str, value: &PlotPoint| {
            let when = format_x(value.x, "%Y-%m-%d %H:%M");
            if name.is_empty() {
                when
            } else {
                format!("{name}\n{when}\n{:.2}", value.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for trace in traces {
                for segment in trace.segments {
                    let line = Line::new(PlotPoints::from(segment))
                        .name(&trace.name)
                        .color(trace.color)
                        .width(1.5);
                    plot_ui.line(line);
                }
            }
        });
}
