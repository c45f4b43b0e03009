use crate::core::Storage;
use crate::domain::model::{Aggregates, ChartKind, ChartOutcome, ChartStatus, GroupValue, SalesTable};
use anyhow::{anyhow, Context};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use std::io::Cursor;
use std::ops::Range;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub figures_dir: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            figures_dir: "reports/figures".to_string(),
            width: 1200,
            height: 600,
        }
    }
}

impl ChartOptions {
    pub fn path_for(&self, chart: ChartKind) -> String {
        Path::new(&self.figures_dir)
            .join(chart.file_name())
            .to_string_lossy()
            .into_owned()
    }
}

const SLICE_COLORS: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Renders every chart and writes the PNGs through `storage`. A chart
/// that is skipped or fails to render never aborts the others.
pub fn render_charts<S: Storage>(
    table: &SalesTable,
    aggregates: &Aggregates,
    options: &ChartOptions,
    storage: &S,
) -> Vec<ChartOutcome> {
    tracing::info!("🎨 Generating visualizations...");

    let outcomes: Vec<ChartOutcome> = ChartKind::ALL
        .iter()
        .map(|&chart| {
            let status = match render_chart(chart, table, aggregates, options) {
                Ok(Some(png)) => {
                    let path = options.path_for(chart);
                    match storage.write_file(&path, &png) {
                        Ok(()) => {
                            tracing::debug!("Saved {} ({} bytes)", path, png.len());
                            ChartStatus::Written(path)
                        }
                        Err(e) => ChartStatus::Failed(e.to_string()),
                    }
                }
                Ok(None) => ChartStatus::Skipped(skip_reason(chart, table)),
                Err(e) => ChartStatus::Failed(format!("{:#}", e)),
            };

            match &status {
                ChartStatus::Skipped(reason) => {
                    tracing::info!("⏭️  Skipped {}: {}", chart.title(), reason)
                }
                ChartStatus::Failed(message) => {
                    tracing::warn!("⚠️  Could not render {}: {}", chart.title(), message)
                }
                ChartStatus::Written(_) => {}
            }

            ChartOutcome { chart, status }
        })
        .collect();

    let written = outcomes.iter().filter(|o| o.is_written()).count();
    tracing::info!(
        "📁 {} of {} visualizations saved in: {}",
        written,
        outcomes.len(),
        options.figures_dir
    );
    outcomes
}

fn skip_reason(chart: ChartKind, table: &SalesTable) -> String {
    if chart == ChartKind::TimeOfDaySales && !table.has_time_of_day {
        "no time-of-day column".to_string()
    } else if table.is_empty() {
        "no records".to_string()
    } else {
        "no positive sales to chart".to_string()
    }
}

/// `Ok(None)` means the chart has nothing to show.
fn render_chart(
    chart: ChartKind,
    table: &SalesTable,
    aggregates: &Aggregates,
    options: &ChartOptions,
) -> anyhow::Result<Option<Vec<u8>>> {
    if table.is_empty() {
        return Ok(None);
    }
    let size = (options.width, options.height);

    match chart {
        ChartKind::StateWiseSales => {
            let rows = aggregates.state_wise.sorted_desc();
            render_png(size, |area| draw_bar_chart(area, chart.title(), &rows)).map(Some)
        }
        ChartKind::GroupSales => {
            let rows = &aggregates.group_wise.values;
            if rows.iter().map(|g| g.value).sum::<f64>() <= 0.0 {
                return Ok(None);
            }
            let side = options.height.max(100);
            render_png((side, side), |area| draw_pie_chart(area, chart.title(), rows)).map(Some)
        }
        ChartKind::SalesDistribution => {
            render_png(size, |area| draw_box_plot(area, chart.title(), table)).map(Some)
        }
        ChartKind::TimeOfDaySales => match &aggregates.time_wise {
            Some(time_wise) if !time_wise.is_empty() => {
                render_png(size, |area| draw_line_chart(area, chart.title(), &time_wise.values))
                    .map(Some)
            }
            _ => Ok(None),
        },
        ChartKind::UnitSalesRelationship => {
            render_png(size, |area| draw_scatter(area, chart.title(), table)).map(Some)
        }
    }
}

/// Draws into an RGB buffer and encodes it as PNG.
fn render_png<F>(size: (u32, u32), draw: F) -> anyhow::Result<Vec<u8>>
where
    F: FnOnce(&Area<'_>) -> anyhow::Result<()>,
{
    let (width, height) = size;
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }

    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| anyhow!("pixel buffer does not match {}x{}", width, height))?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("PNG encoding failed")?;
    Ok(png)
}

fn padded_range(min: f64, max: f64) -> Range<f64> {
    if max > min {
        let pad = (max - min) * 0.05;
        (min - pad)..(max + pad)
    } else {
        (min - 0.5)..(max + 0.5)
    }
}

fn value_bounds(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

fn segment_label(labels: &[String], value: &SegmentValue<u32>) -> String {
    match value {
        SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => {
            labels.get(*idx as usize).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

fn draw_bar_chart(area: &Area<'_>, title: &str, rows: &[GroupValue]) -> anyhow::Result<()> {
    let labels: Vec<String> = rows.iter().map(|g| g.key.clone()).collect();
    let (_, max) = value_bounds(rows.iter().map(|g| g.value));
    let top = if max > 0.0 { max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 30))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..labels.len() as u32).into_segmented(), 0f64..top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v: &SegmentValue<u32>| segment_label(&labels, v))
        .x_desc("State")
        .y_desc("Sales")
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BAR_COLOR.filled())
            .margin(10)
            .data(rows.iter().enumerate().map(|(idx, g)| (idx as u32, g.value))),
    )?;

    Ok(())
}

fn draw_pie_chart(area: &Area<'_>, title: &str, rows: &[GroupValue]) -> anyhow::Result<()> {
    let area = area.titled(title, ("sans-serif", 30))?;
    let (width, height) = area.dim_in_pixel();
    let center = (width as i32 / 2, height as i32 / 2);
    let radius = f64::from(width.min(height)) * 0.35;

    let sizes: Vec<f64> = rows.iter().map(|g| g.value.max(0.0)).collect();
    let labels: Vec<String> = rows.iter().map(|g| g.key.clone()).collect();
    let colors: Vec<RGBColor> = (0..rows.len())
        .map(|idx| SLICE_COLORS[idx % SLICE_COLORS.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    pie.label_style(("sans-serif", 22).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 18).into_font().color(&WHITE));
    area.draw(&pie)?;

    Ok(())
}

fn draw_box_plot(area: &Area<'_>, title: &str, table: &SalesTable) -> anyhow::Result<()> {
    let regions: Vec<String> = table.regions().into_iter().map(str::to_string).collect();
    let quartiles: Vec<Quartiles> = regions
        .iter()
        .map(|region| Quartiles::new(&table.sales_for_region(region)))
        .collect();

    let (min, max) = value_bounds(table.records.iter().map(|r| r.sales));
    let y = padded_range(min, max);

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 30))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (0u32..regions.len() as u32).into_segmented(),
            y.start as f32..y.end as f32,
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(regions.len())
        .x_label_formatter(&|v: &SegmentValue<u32>| segment_label(&regions, v))
        .x_desc("State")
        .y_desc("Sales")
        .draw()?;

    chart.draw_series(quartiles.iter().enumerate().map(|(idx, q)| {
        Boxplot::new_vertical(SegmentValue::CenterOf(idx as u32), q)
            .width(30)
            .style(BAR_COLOR)
    }))?;

    Ok(())
}

fn draw_line_chart(area: &Area<'_>, title: &str, rows: &[GroupValue]) -> anyhow::Result<()> {
    let labels: Vec<String> = rows.iter().map(|g| g.key.clone()).collect();
    let (min, max) = value_bounds(rows.iter().map(|g| g.value));

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 30))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (0u32..labels.len() as u32).into_segmented(),
            padded_range(min, max),
        )?;

    chart
        .configure_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v: &SegmentValue<u32>| segment_label(&labels, v))
        .x_desc("Time")
        .y_desc("Average Sales")
        .draw()?;

    let points: Vec<(SegmentValue<u32>, f64)> = rows
        .iter()
        .enumerate()
        .map(|(idx, g)| (SegmentValue::CenterOf(idx as u32), g.value))
        .collect();

    chart.draw_series(LineSeries::new(points.clone(), RED.stroke_width(2)))?;
    chart.draw_series(
        points
            .into_iter()
            .map(|point| Circle::new(point, 4, RED.filled())),
    )?;

    Ok(())
}

fn draw_scatter(area: &Area<'_>, title: &str, table: &SalesTable) -> anyhow::Result<()> {
    let (unit_min, unit_max) = value_bounds(table.records.iter().map(|r| r.units));
    let (sales_min, sales_max) = value_bounds(table.records.iter().map(|r| r.sales));

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 30))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            padded_range(unit_min, unit_max),
            padded_range(sales_min, sales_max),
        )?;

    chart
        .configure_mesh()
        .x_desc("Units")
        .y_desc("Sales")
        .draw()?;

    chart.draw_series(
        table
            .records
            .iter()
            .map(|r| Circle::new((r.units, r.sales), 3, BAR_COLOR.mix(0.5).filled())),
    )?;

    Ok(())
}
