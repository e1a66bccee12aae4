//! SVG charts rendered with plotters.

use plotters::prelude::*;

use crate::{Portal, ServiceError, SizeSeriesPoint, WaterBodyFilter, WaterBodyRecord};

const CHART_SIZE: (u32, u32) = (900, 450);

fn chart_error(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Chart(e.to_string())
}

/// Date part of an RFC 3339 timestamp.
fn short_date(timestamp: &str) -> String {
    timestamp.split('T').next().unwrap_or(timestamp).to_owned()
}

/// Cumulative size line with a marker per upload.
pub fn size_over_time_svg(points: &[SizeSeriesPoint]) -> Result<String, ServiceError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let top = points.iter().map(|p| p.cumulative_size).max().unwrap_or(0).max(1);
        let mut chart = ChartBuilder::on(&root)
            .caption("Size of Uploaded Files Over Time", ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..points.len().max(1), 0..top + top / 10 + 1)
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .x_desc("Upload time")
            .y_desc("Total size")
            .x_label_formatter(&|i: &usize| {
                points.get(*i).map(|p| short_date(&p.timestamp)).unwrap_or_default()
            })
            .draw()
            .map_err(chart_error)?;

        let series = || points.iter().enumerate().map(|(i, p)| (i, p.cumulative_size));
        chart
            .draw_series(LineSeries::new(series(), &BLUE))
            .map_err(chart_error)?;
        chart
            .draw_series(series().map(|xy| Circle::new(xy, 4, BLUE.filled())))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

/// One bar per water body, labelled by name.  Records without an area are skipped.
pub fn water_body_area_svg(records: &[WaterBodyRecord]) -> Result<String, ServiceError> {
    let bars: Vec<(&str, f64)> = records
        .iter()
        .filter_map(|r| r.area_sq_m.map(|a| (r.name.as_str(), a)))
        .collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let top = bars.iter().map(|(_, a)| *a).fold(0.0_f64, f64::max).max(1.0);
        let mut chart = ChartBuilder::on(&root)
            .caption("Water Body Areas", ("sans-serif", 22))
            .margin(12)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(0..bars.len().max(1), 0.0..top * 1.1)
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len().max(1))
            .x_label_formatter(&|i: &usize| {
                bars.get(*i).map(|(name, _)| (*name).to_owned()).unwrap_or_default()
            })
            .y_desc("Area (square meters)")
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(bars.iter().enumerate().map(|(i, (_, area))| {
                Rectangle::new([(i, 0.0), (i + 1, *area)], BLUE.mix(0.7).filled())
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

/// Pie label: the name, with the coordinates when both are known.
fn share_label(record: &WaterBodyRecord) -> String {
    match (record.latitude, record.longitude) {
        (Some(lat), Some(lon)) => format!("{} ({lat:.4}, {lon:.4})", record.name),
        _ => record.name.clone(),
    }
}

/// Pie of each water body's share of the total area, one Viridis colour per slice.
/// Records without a positive area are left out; with none left only the title is drawn.
pub fn water_body_share_svg(records: &[WaterBodyRecord]) -> Result<String, ServiceError> {
    let slices: Vec<(&WaterBodyRecord, f64)> = records
        .iter()
        .filter_map(|r| r.area_sq_m.filter(|a| *a > 0.0).map(|a| (r, a)))
        .collect();
    let sizes: Vec<f64> = slices.iter().map(|(_, a)| *a).collect();
    let labels: Vec<String> = slices.iter().map(|(r, _)| share_label(r)).collect();
    let last = slices.len().saturating_sub(1).max(1) as f64;
    let colors: Vec<RGBColor> = (0..slices.len())
        .map(|i| ViridisRGB::get_color(i as f64 / last))
        .collect();

    let (width, height) = CHART_SIZE;
    let center = (width as i32 / 2, height as i32 / 2 + 15);
    let radius = f64::from(height) * 0.3;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;
        root.titled("Water Body Area Share", ("sans-serif", 22)).map_err(chart_error)?;

        if !sizes.is_empty() {
            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            pie.start_angle(-90.0);
            pie.label_style(("sans-serif", 14));
            pie.percentages(("sans-serif", 12).into_font().color(&WHITE));
            root.draw(&pie).map_err(chart_error)?;
        }

        root.present().map_err(chart_error)?;
    }
    Ok(svg)
}

impl Portal {
    pub async fn size_over_time_chart(&self) -> Result<String, ServiceError> {
        size_over_time_svg(&self.size_over_time().await?)
    }

    /// Bar chart of the filtered records of a water body dataset.
    pub async fn water_body_chart(
        &self,
        dataset: &str,
        filter: &WaterBodyFilter,
    ) -> Result<String, ServiceError> {
        let records = filter.apply(&self.water_body_records(dataset).await?);
        water_body_area_svg(&records)
    }

    /// Area-share pie of the filtered records of a water body dataset.
    pub async fn water_body_share_chart(
        &self,
        dataset: &str,
        filter: &WaterBodyFilter,
    ) -> Result<String, ServiceError> {
        let records = filter.apply(&self.water_body_records(dataset).await?);
        water_body_share_svg(&records)
    }
}
