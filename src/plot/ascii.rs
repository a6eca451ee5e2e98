//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - forecast line: `-`
//! - interval bounds: `:` (drawn only on blank cells)

use chrono::NaiveDate;

use crate::domain::{ForecastSeries, WeeklyAggregate};

/// Plot the daily forecast, with interval bounds when requested and present.
pub fn render_forecast_plot(series: &ForecastSeries, show_intervals: bool, width: usize, height: usize) -> String {
    let mut lines = vec![collect(series.rows.iter().map(|r| (r.date, r.yhat)))];
    if show_intervals && series.has_intervals {
        lines.push(collect(series.rows.iter().map(|r| (r.date, r.yhat_lower))));
        lines.push(collect(series.rows.iter().map(|r| (r.date, r.yhat_upper))));
    }
    render_plot("Forecast", &lines, width, height)
}

/// Plot weekly totals.
pub fn render_weekly_plot(weekly: &WeeklyAggregate, width: usize, height: usize) -> String {
    let lines = vec![collect(weekly.points())];
    render_plot("Weekly forecast", &lines, width, height)
}

fn collect<I: Iterator<Item = (NaiveDate, Option<f64>)>>(points: I) -> Vec<(NaiveDate, f64)> {
    points.filter_map(|(d, v)| v.map(|v| (d, v))).collect()
}

/// The first line is the main series; later lines are drawn underneath it.
fn render_plot(title: &str, lines: &[Vec<(NaiveDate, f64)>], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((d_min, d_max)) = date_range(lines) else {
        return format!("Plot: {title} | no data\n");
    };
    let t_max = ((d_max - d_min).num_days() as f64).max(1.0);
    let (y_min, y_max) = y_range(lines).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for (i, line) in lines.iter().enumerate() {
        let ch = if i == 0 { '-' } else { ':' };
        let curve: Vec<(f64, f64)> = line
            .iter()
            .map(|&(d, y)| ((d - d_min).num_days() as f64, y))
            .collect();
        draw_curve(&mut grid, &curve, 0.0, t_max, y_min, y_max, ch);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {title} | {d_min} .. {d_max} | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn date_range(lines: &[Vec<(NaiveDate, f64)>]) -> Option<(NaiveDate, NaiveDate)> {
    let dates = lines.iter().flatten().map(|&(d, _)| d);
    let min = dates.clone().min()?;
    let max = dates.max()?;
    Some((min, max))
}

fn y_range(lines: &[Vec<(NaiveDate, f64)>]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in lines.iter().flatten() {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && max_y.is_finite() {
        // Flat series: centre it.
        Some((min_y - 1.0, max_y + 1.0))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    t_min: f64,
    t_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    let height = grid.len();
    let Some(width) = grid.first().map(Vec::len) else {
        return;
    };

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None if grid[yy][x] == ' ' => grid[yy][x] = ch,
            None => {}
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastRow, WeekRule, WeeklyRow};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(values: &[Option<f64>]) -> ForecastSeries {
        ForecastSeries {
            rows: d(2025, 1, 1)
                .iter_days()
                .zip(values)
                .map(|(date, &yhat)| ForecastRow {
                    date,
                    yhat,
                    yhat_lower: yhat.map(|v| v - 1.0),
                    yhat_upper: yhat.map(|v| v + 1.0),
                })
                .collect(),
            has_intervals: true,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_forecast_plot(&series(&[Some(0.0), Some(5.0), Some(10.0)]), false, 10, 5);
        let expected = concat!(
            "Plot: Forecast | 2025-01-01 .. 2025-01-03 | y=[-0.50, 10.50]\n",
            "        --\n",
            "      --  \n",
            "    --    \n",
            "  --      \n",
            "--        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn interval_bounds_never_overwrite_forecast() {
        let txt = render_forecast_plot(&series(&[Some(0.0), Some(5.0), Some(10.0)]), true, 10, 5);
        assert!(txt.contains(':'));
        // The forecast line keeps all of its cells.
        let dashes = txt.lines().skip(1).map(|l| l.matches('-').count()).sum::<usize>();
        assert_eq!(dashes, 10);
    }

    #[test]
    fn empty_weekly_plot_says_so() {
        let weekly = WeeklyAggregate {
            rule: WeekRule::default(),
            rows: vec![WeeklyRow { week_end: d(2025, 1, 5), value: None }],
        };
        assert_eq!(render_weekly_plot(&weekly, 20, 5), "Plot: Weekly forecast | no data\n");
    }
}
