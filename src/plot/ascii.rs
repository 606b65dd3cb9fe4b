//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed weekly index: `o` points joined by a `-` line
//! - stress threshold: `=` row

use crate::domain::WeeklyIndex;

/// Render the weekly index series with the stress threshold overlaid.
///
/// The x axis is the ordinal week position (dormancy gaps are not widened);
/// the y axis spans the observed values and the threshold, padded 5%.
pub fn render_weekly_ascii(
    weekly: &WeeklyIndex,
    threshold: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(first), Some(last)) = (weekly.first(), weekly.last()) else {
        return "Plot: (no data)\n".to_string();
    };

    let mut y_min = threshold;
    let mut y_max = threshold;
    for v in weekly.values() {
        y_min = y_min.min(v);
        y_max = y_max.max(v);
    }
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Threshold first, so the series can cross it visibly.
    let threshold_row = map_y(threshold, y_min, y_max, height);
    for cell in &mut grid[threshold_row] {
        if *cell == ' ' {
            *cell = '=';
        }
    }

    // Connecting line, then the points overlay.
    let n = weekly.len();
    let coords: Vec<(usize, usize)> = weekly
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let u = if n <= 1 { 0.0 } else { i as f64 / (n as f64 - 1.0) };
            let x = (u * (width as f64 - 1.0)).round() as usize;
            (x, map_y(p.index_value, y_min, y_max, height))
        })
        .collect();
    for pair in coords.windows(2) {
        draw_line(&mut grid, pair[0].0, pair[0].1, pair[1].0, pair[1].1, '-');
    }
    for &(x, y) in &coords {
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: weeks=[{}, {}] | index=[{y_min:.2}, {y_max:.2}] | threshold={threshold:.0}\n",
        first.week_ending, last.week_ending
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish); only fills blank cells.
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
    use crate::domain::{WeeklyIndex, WeeklyPoint};
    use chrono::NaiveDate;

    #[test]
    fn plot_golden_snapshot_small() {
        let weekly = WeeklyIndex::from_sorted(vec![
            WeeklyPoint {
                week_ending: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
                index_value: 200.0,
            },
            WeeklyPoint {
                week_ending: NaiveDate::from_ymd_opt(2024, 1, 13).unwrap(),
                index_value: 400.0,
            },
        ]);

        let txt = render_weekly_ascii(&weekly, 300.0, 10, 5);
        let expected = concat!(
            "Plot: weeks=[2024-01-06, 2024-01-13] | index=[190.00, 410.00] | threshold=300\n",
            "        -o\n",
            "      --  \n",
            "==========\n",
            "  --      \n",
            "o-        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_renders_placeholder() {
        let txt = render_weekly_ascii(&WeeklyIndex::default(), 300.0, 10, 5);
        assert_eq!(txt, "Plot: (no data)\n");
    }
}
