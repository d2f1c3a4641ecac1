//! Terminal rendering of envelope bars.
//!
//! [`BarView`] is the player's [`Visualizer`]: the controller tells it when to
//! clear and what to draw, and it keeps the laid-out bars until the next
//! frame paints them with [`BarsWidget`].

use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};
use wavebars::envelope::Envelope;
use wavebars::visualizer::{Bar, Geometry, Visualizer, amplitude_to_blocks, layout_bars};

#[derive(Debug, Default)]
pub struct BarView {
    bars: Vec<Bar>,
    draw_count: usize,
}

impl BarView {
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Number of `draw` calls so far.
    pub fn draw_count(&self) -> usize {
        self.draw_count
    }
}

impl Visualizer for BarView {
    fn clear(&mut self) {
        self.bars.clear();
    }

    fn draw(&mut self, envelope: &Envelope, geometry: &Geometry) {
        self.bars = layout_bars(envelope, geometry);
        self.draw_count += 1;
    }
}

/// Paints bars bottom-up, one cell per unit, with an eighth-block cap for
/// the fractional top of each bar.
pub struct BarsWidget<'a> {
    bars: &'a [Bar],
    style: Style,
}

impl<'a> BarsWidget<'a> {
    pub fn new(bars: &'a [Bar]) -> Self {
        Self {
            bars,
            style: Style::default(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Widget for BarsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for bar in self.bars {
            let x0 = bar.x.round().max(0.0) as u16;
            let x1 = ((bar.x + bar.width).round() as u16).max(x0 + 1);
            let height = bar.height.clamp(0.0, area.height as f32);
            let full = height.floor() as u16;
            let cap = height - full as f32;

            for col in x0..x1.min(area.width) {
                let x = area.x + col;
                for row in 0..full {
                    if let Some(cell) = buf.cell_mut((x, area.bottom() - 1 - row)) {
                        cell.set_symbol("█").set_style(self.style);
                    }
                }
                if full < area.height && cap > 0.0 {
                    if let Some(cell) = buf.cell_mut((x, area.bottom() - 1 - full)) {
                        cell.set_symbol(amplitude_to_blocks(cap)).set_style(self.style);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_view_clear_and_draw() {
        let mut view = BarView::default();
        let envelope = Envelope::extract(&[1.0, 0.5], 2).unwrap();

        view.draw(&envelope, &Geometry::new(4.0, 2.0, 0.0));
        assert_eq!(view.bars().len(), 2);
        assert_eq!(view.draw_count(), 1);

        view.clear();
        assert!(view.bars().is_empty());
        assert_eq!(view.draw_count(), 1);
    }

    #[test]
    fn test_widget_paints_columns() {
        let envelope = Envelope::extract(&[1.0, 0.5], 2).unwrap();
        let bars = layout_bars(&envelope, &Geometry::new(4.0, 2.0, 0.0));
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);

        BarsWidget::new(&bars).render(area, &mut buf);

        // First bar is two cells tall, second is one
        assert_eq!(buf[(0, 0)].symbol(), "█");
        assert_eq!(buf[(1, 1)].symbol(), "█");
        assert_eq!(buf[(2, 0)].symbol(), " ");
        assert_eq!(buf[(3, 1)].symbol(), "█");
    }

    #[test]
    fn test_widget_fractional_cap() {
        let bars = [Bar {
            x: 0.0,
            width: 1.0,
            height: 1.5,
        }];
        let area = Rect::new(0, 0, 1, 3);
        let mut buf = Buffer::empty(area);

        BarsWidget::new(&bars).render(area, &mut buf);

        assert_eq!(buf[(0, 2)].symbol(), "█");
        assert_eq!(buf[(0, 1)].symbol(), "▄");
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }
}
