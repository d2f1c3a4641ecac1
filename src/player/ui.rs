use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use wavebars::playback::{AudioGraph, PlaybackState};

use super::app::App;
use super::bars::BarsWidget;

const TRACK_LIST_WIDTH: u16 = 28;

struct Areas {
    title: Rect,
    tracks: Rect,
    bars: Rect,
    status: Rect,
    controls: Rect,
}

fn split(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Min(5),    // Track list + bars
            Constraint::Length(1), // Status
            Constraint::Length(2), // Controls
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(TRACK_LIST_WIDTH), Constraint::Min(10)])
        .split(rows[1]);

    Areas {
        title: rows[0],
        tracks: columns[0],
        bars: columns[1],
        status: rows[2],
        controls: rows[3],
    }
}

fn bars_block() -> Block<'static> {
    Block::default().borders(Borders::ALL).title(" Waveform ")
}

/// Drawing area of the bars inside a terminal of size `area`.
pub fn visualizer_area(area: Rect) -> Rect {
    bars_block().inner(split(area).bars)
}

pub fn draw<G: AudioGraph>(f: &mut Frame, app: &App<G>) {
    let areas = split(f.area());

    let title = Paragraph::new("wavebars")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, areas.title);

    draw_track_list(f, areas.tracks, app);
    draw_bars(f, areas.bars, app);
    draw_status(f, areas.status, app);
    draw_controls(f, areas.controls, app);
}

fn draw_track_list<G: AudioGraph>(f: &mut Frame, area: Rect, app: &App<G>) {
    let selected = app.controller.selected();

    let items: Vec<ListItem> = app
        .catalog
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if selected == Some(entry.id()) { "▶ " } else { "  " };
            let style = if entry.is_available() {
                Style::default().fg(Color::White)
            } else {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::raw(marker),
                Span::styled(entry.id().to_string(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Tracks "))
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn bar_color(state: PlaybackState) -> Color {
    match state {
        PlaybackState::Playing => Color::Cyan,
        PlaybackState::Paused => Color::Yellow,
        PlaybackState::Stopped => Color::Blue,
    }
}

fn draw_bars<G: AudioGraph>(f: &mut Frame, area: Rect, app: &App<G>) {
    let block = bars_block();
    let inner = block.inner(area);
    f.render_widget(block, area);

    let bars = app.controller.visualizer().bars();
    if bars.is_empty() {
        let empty = Paragraph::new("No track selected")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(empty, inner);
        return;
    }

    let style = Style::default().fg(bar_color(app.controller.state()));
    f.render_widget(BarsWidget::new(bars).style(style), inner);
}

fn draw_status<G: AudioGraph>(f: &mut Frame, area: Rect, app: &App<G>) {
    let line = if let Some(message) = &app.status_message {
        Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red)))
    } else if !app.controller.controls_enabled() {
        Line::from(Span::styled(
            "Press [l] to enable playback",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        let state = app.controller.state();
        let track = app.controller.selected().unwrap_or("-");
        Line::from(vec![
            Span::styled(
                state.to_string(),
                Style::default()
                    .fg(bar_color(state))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {track}")),
        ])
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_controls<G: AudioGraph>(f: &mut Frame, area: Rect, app: &App<G>) {
    let enabled = app.controller.controls_enabled();
    let dimmed = Style::default().fg(Color::DarkGray);

    let load = if app.controller.can_load() {
        Span::styled("[l]", Style::default().fg(Color::Green))
    } else {
        Span::styled("[l]", dimmed)
    };
    let toggle = if !enabled {
        Span::styled("[space]", dimmed)
    } else if app.controller.is_playing() {
        Span::styled("[space]", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("[space]", Style::default().fg(Color::Green))
    };

    let controls = vec![
        load,
        Span::raw(" load  "),
        toggle,
        Span::raw(format!(" {}  ", app.controller.state().toggle_label())),
        Span::styled("[↑↓]", Style::default().fg(Color::Magenta)),
        Span::raw(" track  "),
        Span::styled("[1-9]", Style::default().fg(Color::Blue)),
        Span::raw(" jump  "),
        Span::styled("[q]", Style::default().fg(Color::Red)),
        Span::raw(" quit"),
    ];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    f.render_widget(Block::default().borders(Borders::TOP), area);
    f.render_widget(
        Paragraph::new(Line::from(controls)).alignment(Alignment::Center),
        rows[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visualizer_area_fits_inside_terminal() {
        let area = Rect::new(0, 0, 100, 30);
        let inner = visualizer_area(area);

        assert!(inner.width > 0 && inner.height > 0);
        assert!(inner.x >= TRACK_LIST_WIDTH);
        assert!(inner.right() < area.right());
        assert!(inner.bottom() < area.bottom());
    }

    #[test]
    fn test_visualizer_area_tiny_terminal() {
        let inner = visualizer_area(Rect::new(0, 0, 4, 4));
        assert_eq!(inner.area(), 0);
    }

    #[test]
    fn test_bar_color_follows_state() {
        assert_ne!(
            bar_color(PlaybackState::Playing),
            bar_color(PlaybackState::Paused)
        );
    }
}
