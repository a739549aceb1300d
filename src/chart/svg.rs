//! SVG output through plotters.

use std::path::Path;

use plotters::{
    coord::{cartesian::Cartesian2d, types::RangedCoordf32},
    drawing::DrawingAreaErrorKind,
    prelude::*,
    style::{FontDesc, FontFamily, FontStyle},
};
use tracing::debug;

use crate::{
    chart::{AccumulationChart, ChartRenderer, Overlay, TemperatureChart, TemperatureDay, Tick},
    error::{GhcndError, Result},
};

const RECORD_COLOR: RGBColor = RGBColor(200, 191, 168);
const AVERAGE_COLOR: RGBColor = RGBColor(154, 145, 128);
const ACTUAL_COLOR: RGBColor = RGBColor(90, 59, 73);
const MAX_RECORD_COLOR: RGBColor = RGBColor(204, 0, 0);
const MIN_RECORD_COLOR: RGBColor = RGBColor(0, 51, 204);

const DRY_COLOR: RGBColor = RGBColor(230, 225, 210);
const WET_COLOR: RGBColor = RGBColor(110, 140, 180);
const MAX_COLOR: RGBColor = RGBColor(0, 70, 160);
const MIN_COLOR: RGBColor = RGBColor(180, 110, 20);
const CURRENT_COLOR: RGBColor = RGBColor(200, 0, 40);

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for GhcndError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        GhcndError::Render { reason: e.to_string() }
    }
}

/// Draws charts as fixed-size SVG files.
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer {
    pub size: (u32, u32),
}

impl Default for SvgRenderer {
    fn default() -> Self {
        SvgRenderer { size: (1500, 800) }
    }
}

fn font(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

impl ChartRenderer for SvgRenderer {
    fn render_temperature(&self, chart: &TemperatureChart, file_path: &Path) -> Result<()> {
        let root = SVGBackend::new(file_path, self.size).into_drawing_area();
        root.fill(&WHITE)?;
        let area = root.titled(&chart.header.title, font(28.0))?;

        let (y_min, y_max) = (chart.y_range.0 as f32, chart.y_range.1 as f32);
        let n = chart.days.len() as f32;

        let mut plot = ChartBuilder::on(&area)
            .margin(20)
            .caption(&chart.header.subtitle, font(18.0))
            .set_label_area_size(LabelAreaPosition::Left, 50)
            .set_label_area_size(LabelAreaPosition::Bottom, 10)
            .build_cartesian_2d(-1f32..n + 1.0, y_min..y_max)?;

        plot.configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .y_desc(format!("Temperature ({})", chart.unit.symbol()))
            .y_label_formatter(&|v| format!("{:.0}", v))
            .label_style(font(14.0))
            .draw()?;

        let bars = |low: fn(&TemperatureDay) -> Option<f32>,
                    high: fn(&TemperatureDay) -> Option<f32>,
                    width: f32,
                    color: RGBColor| {
            let offset = (1.0 - width) / 2.0;
            chart.days.iter().enumerate().filter_map(move |(i, day)| {
                let (lo, hi) = (low(day)?, high(day)?);
                let x = i as f32 + offset;
                Some(Rectangle::new([(x, lo), (x + width, hi)], color.filled()))
            })
        };

        plot.draw_series(bars(|d| d.record_min, |d| d.record_max, 0.9, RECORD_COLOR))?
            .label("Record")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], RECORD_COLOR.filled()));
        plot.draw_series(bars(|d| d.average_min, |d| d.average_max, 0.9, AVERAGE_COLOR))?
            .label("Normal")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], AVERAGE_COLOR.filled()));
        plot.draw_series(bars(|d| d.actual_min, |d| d.actual_max, 0.5, ACTUAL_COLOR))?
            .label("Observed")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], ACTUAL_COLOR.filled()));

        plot.draw_series(
            chart
                .max_records()
                .map(|(i, v)| Circle::new((i as f32 + 0.5, v), 3, MAX_RECORD_COLOR.filled())),
        )?
        .label("New max record")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, MAX_RECORD_COLOR.filled()));
        plot.draw_series(
            chart
                .min_records()
                .map(|(i, v)| Circle::new((i as f32 + 0.5, v), 3, MIN_RECORD_COLOR.filled())),
        )?
        .label("New min record")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, MIN_RECORD_COLOR.filled()));

        draw_ticks(&mut plot, &chart.ticks, y_min, y_max)?;

        plot.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .label_font(font(14.0))
            .position(SeriesLabelPosition::LowerRight)
            .draw()?;

        root.present()?;
        debug!("Rendered {}", file_path.display());

        Ok(())
    }

    fn render_accumulation(&self, chart: &AccumulationChart, file_path: &Path) -> Result<()> {
        let root = SVGBackend::new(file_path, self.size).into_drawing_area();
        root.fill(&WHITE)?;
        let area = root.titled(&chart.title(), font(28.0))?;

        let y_max = chart.y_max.max(1) as f32;
        let mut plot = ChartBuilder::on(&area)
            .margin(20)
            .caption(&chart.header.subtitle, font(18.0))
            .set_label_area_size(LabelAreaPosition::Left, 50)
            .set_label_area_size(LabelAreaPosition::Bottom, 10)
            .build_cartesian_2d(0f32..366f32, 0f32..y_max)?;

        plot.configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .y_desc("Inches")
            .y_label_formatter(&|v| format!("{:.0}", v))
            .label_style(font(14.0))
            .draw()?;

        let count = chart.background.len().max(2) - 1;
        for (rank, values) in chart.background.iter().enumerate() {
            let color = blend(DRY_COLOR, WET_COLOR, rank as f64 / count as f64);
            plot.draw_series(LineSeries::new(points(values), color.stroke_width(1)))?;
        }

        let overlays = [
            (&chart.average, BLACK, 2),
            (&chart.min, MIN_COLOR, 2),
            (&chart.max, MAX_COLOR, 2),
            (&chart.current, CURRENT_COLOR, 3),
        ];
        for (overlay, color, width) in overlays {
            if let Some(Overlay { label, values }) = overlay {
                plot.draw_series(LineSeries::new(points(values), color.stroke_width(width)))?
                    .label(label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width)));
            }
        }

        draw_ticks(&mut plot, &chart.ticks, 0.0, y_max)?;

        plot.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK.mix(0.3))
            .label_font(font(14.0))
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;

        root.present()?;
        debug!("Rendered {}", file_path.display());

        Ok(())
    }
}

type Plot<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf32, RangedCoordf32>>;

/// Month labels along the bottom edge with a faint guide line at each.
fn draw_ticks(plot: &mut Plot<'_, '_>, ticks: &[Tick], y_min: f32, y_max: f32) -> Result<()> {
    plot.draw_series(ticks.iter().map(|tick| {
        let x = tick.position as f32;
        PathElement::new(vec![(x, y_min), (x, y_max)], BLACK.mix(0.15))
    }))?;
    plot.draw_series(ticks.iter().map(|tick| {
        Text::new(
            tick.label.clone(),
            (tick.position as f32 + 1.0, y_min + (y_max - y_min) * 0.02),
            font(12.0).color(&BLACK),
        )
    }))?;

    Ok(())
}

fn points(values: &[f32]) -> impl Iterator<Item = (f32, f32)> + '_ {
    values.iter().enumerate().map(|(i, v)| (i as f32, *v))
}

fn blend(from: RGBColor, to: RGBColor, t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}
