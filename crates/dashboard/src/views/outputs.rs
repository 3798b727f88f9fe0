//! Output rendering. The server's visualization payload picks the renderer;
//! without one the output is shown as a download card labelled with the
//! heuristic classification.

use farmvibes_common::classifier::output_icon;
use farmvibes_common::colormap::{color_for_value, interpolate_colormap, ColormapName};
use farmvibes_common::formatting::{format_file_size, format_percent};
use farmvibes_common::visualization::{
    CategoricalVisualization, ContinuousVisualization, MultispectralVisualization,
    TimeSeriesVisualization, VisualizationMeta,
};
use farmvibes_common::{resolve_kind, RunOutput, Visualization};
use tracing::warn;

const COLORMAP_SAMPLES: usize = 5;
const GRADIENT_STEPS: usize = 9;

pub fn render_output(output: &RunOutput) -> String {
    match output.parsed_visualization() {
        Ok(Some(viz)) => render_visualization(&output.name, &viz),
        Ok(None) => render_download_card(output),
        Err(e) => {
            warn!(output = %output.name, error = %e, "Ignoring malformed visualization payload.");
            render_download_card(output)
        }
    }
}

pub fn render_visualization(name: &str, viz: &Visualization) -> String {
    let mut lines = header(name, viz.meta());
    match viz {
        Visualization::TimeSeries(ts) => time_series(ts, &mut lines),
        Visualization::Categorical(cat) => categorical(cat, &mut lines),
        Visualization::Continuous(cont) => continuous(cont, &mut lines),
        Visualization::Multispectral(ms) => multispectral(ms, &mut lines),
    }
    lines.join("\n")
}

fn header(name: &str, meta: &VisualizationMeta) -> Vec<String> {
    let title = if meta.title.is_empty() { name } else { &meta.title };
    let mut lines = vec![format!("== {title} ==")];
    if let Some(description) = &meta.description {
        lines.push(description.clone());
    }
    if let Some(bounds) = &meta.bounds {
        lines.push(format!(
            "Bounds: N {:.4} S {:.4} E {:.4} W {:.4}",
            bounds.north, bounds.south, bounds.east, bounds.west
        ));
    }
    lines
}

fn time_series(ts: &TimeSeriesVisualization, lines: &mut Vec<String>) {
    if let (Some(first), Some(last)) = (ts.data.first(), ts.data.last()) {
        lines.push(format!(
            "{} points from {} to {}",
            ts.data.len(),
            first.date_label(),
            last.date_label()
        ));
    } else {
        lines.push("No data points.".to_string());
        return;
    }
    if let Some(label) = &ts.y_axis_label {
        lines.push(format!("Y axis: {label}"));
    }

    // Payloads without a series list plot every numeric key of the first point.
    let keys: Vec<(String, String, Option<String>)> = if ts.series.is_empty() {
        ts.data[0]
            .values
            .keys()
            .map(|key| (key.clone(), key.clone(), None))
            .collect()
    } else {
        ts.series
            .iter()
            .map(|s| (s.key.clone(), s.name.clone(), s.unit.clone()))
            .collect()
    };

    for (key, label, unit) in keys {
        let unit = unit.or_else(|| ts.meta.unit.clone()).unwrap_or_default();
        match ts.summarize(&key) {
            Some(summary) => lines.push(format!(
                "  {label}: {} points, min {:.2}, max {:.2}, last {:.2}{}",
                summary.points,
                summary.min,
                summary.max,
                summary.last,
                if unit.is_empty() { String::new() } else { format!(" {unit}") }
            )),
            None => lines.push(format!("  {label}: no values")),
        }
    }
}

fn categorical(cat: &CategoricalVisualization, lines: &mut Vec<String>) {
    if let Some(stats) = &cat.statistics {
        lines.push(format!("Total pixels: {}", stats.total_pixels));
    }
    let shares = cat.class_shares();
    if shares.is_empty() {
        lines.push("No classes.".to_string());
        return;
    }
    let width = shares.iter().map(|s| s.label.len()).max().unwrap_or(0);
    lines.push("Legend:".to_string());
    for share in shares {
        let mut line = format!("  {:<width$}  {}", share.label, share.color);
        if cat.statistics.is_some() {
            line.push_str(&format!(
                "  {:>6}  ({} px)",
                format_percent(share.percentage, 1),
                share.pixel_count
            ));
        }
        lines.push(line);
    }
}

fn continuous(cont: &ContinuousVisualization, lines: &mut Vec<String>) {
    let unit = cont
        .meta
        .unit
        .as_deref()
        .map(|u| format!(" {u}"))
        .unwrap_or_default();
    lines.push(format!("Range: {:.2} to {:.2}{unit}", cont.min, cont.max));
    if let Some(stats) = &cont.statistics {
        lines.push(format!(
            "Mean {:.2}, median {:.2}, std {:.2}",
            stats.mean, stats.median, stats.std
        ));
    }

    let colormap = cont.colormap.unwrap_or_default();
    match (&cont.custom_colormap, colormap) {
        (Some(custom), ColormapName::Custom) => {
            lines.push("Colormap: custom".to_string());
            for (value, color) in custom {
                lines.push(format!("  {value}: {color}"));
            }
        }
        _ => {
            lines.push(format!("Colormap: {}", colormap.as_str()));
            let stops = colormap.stops();
            for i in 0..COLORMAP_SAMPLES {
                let value = cont.min
                    + (cont.max - cont.min) * i as f64 / (COLORMAP_SAMPLES - 1) as f64;
                if let Some(color) = color_for_value(value, cont.min, cont.max, stops) {
                    lines.push(format!("  {value:>10.2}{unit}  {color}"));
                }
            }
            lines.push(format!(
                "Gradient: {}",
                interpolate_colormap(stops, GRADIENT_STEPS).join(" ")
            ));
        }
    }
}

fn multispectral(ms: &MultispectralVisualization, lines: &mut Vec<String>) {
    lines.push(format!("Bands ({}):", ms.bands.len()));
    for band in &ms.bands {
        let (rows, cols) = band.dimensions();
        let mut line = format!(
            "  {}: {rows}x{cols}, range {:.2} to {:.2}",
            band.name, band.min, band.max
        );
        if let Some(nodata) = band.nodata {
            line.push_str(&format!(", nodata {nodata}"));
        }
        lines.push(line);
    }
    if let Some(composite) = &ms.default_composite {
        let band_name = |index: usize| {
            ms.bands
                .get(index)
                .map_or_else(|| format!("#{index}"), |b| b.name.clone())
        };
        lines.push(format!(
            "RGB composite: {} / {} / {}",
            band_name(composite.red),
            band_name(composite.green),
            band_name(composite.blue)
        ));
    }
}

pub fn render_download_card(output: &RunOutput) -> String {
    let mut lines = vec![
        format!("[{}] {}", output_icon(&output.output_type, &output.mime_type), output.name),
        format!("Type: {}", output.output_type),
    ];
    if !output.mime_type.is_empty() {
        lines.push(format!("MIME: {}", output.mime_type));
    }
    if !output.url.is_empty() {
        lines.push(format!("Download: {}", output.url));
    }
    let size = output
        .stats
        .as_ref()
        .and_then(|stats| stats.get("size"))
        .and_then(serde_json::Value::as_u64);
    if let Some(bytes) = size {
        lines.push(format!("Size: {}", format_file_size(bytes)));
    }
    lines.push(format!("Detected as: {}", resolve_kind(output)));
    lines.join("\n")
}
