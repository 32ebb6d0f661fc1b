use crate::types::SheetAllocation;

const GAUGE_WIDTH: usize = 40;

/// Draws a one-line fill gauge, e.g. `[#######...] 98.5%`.
pub fn render_gauge(sheet: &SheetAllocation, capacity: f64) -> String {
    if capacity <= 0.0 {
        return String::new();
    }
    let ratio = (sheet.filled_area / capacity).clamp(0.0, 1.0);
    let cells = ((ratio * GAUGE_WIDTH as f64).round() as usize).min(GAUGE_WIDTH);

    let mut line = String::with_capacity(GAUGE_WIDTH + 10);
    line.push('[');
    line.extend(std::iter::repeat_n('#', cells));
    line.extend(std::iter::repeat_n('.', GAUGE_WIDTH - cells));
    line.push(']');
    line.push_str(&format!(" {:.1}%", ratio * 100.0));
    line
}

/// Lists unit counts per size, one `  WxH x N` line each.
pub fn render_summary(sheet: &SheetAllocation) -> String {
    let mut result = String::new();
    for g in sheet.summary() {
        result.push_str(&format!("  {}x{} x {}\n", g.width, g.height, g.count));
    }
    result
}
