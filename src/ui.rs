//! UI rendering for the terminal player.
//!
//! `draw` renders the whole screen from the controller's view state and
//! returns a `HitMap` with the rectangles of the interactive controls, which
//! the event loop uses to route mouse input.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    widgets::{
        Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap,
        canvas::{Canvas, Circle, Line, Rectangle},
    },
};

use crate::app::{App, Focus};
use crate::icons::{IconShapes, IconSlot, Shape};
use crate::media::MediaElement;
use crate::theme::Theme;

/// Colours for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub accent: Color,
    pub muted: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                fg: Color::Gray,
                bg: Color::Black,
                accent: Color::LightCyan,
                muted: Color::DarkGray,
            },
            Theme::Light => Self {
                fg: Color::Black,
                bg: Color::White,
                accent: Color::Blue,
                muted: Color::Gray,
            },
        }
    }
}

/// What the screen decorates the player with.
pub struct Chrome<'a> {
    pub theme: Theme,
    pub header_text: &'a str,
    pub icons: &'a [IconSlot],
}

/// A pointer target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Control {
    PlayButton,
    Volume,
    Loop,
    Progress,
    /// Catalog index of a track-list row.
    Track(usize),
    ThemeToggle,
}

/// Screen rectangles of the interactive controls from the last frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitMap {
    pub play_button: Rect,
    /// Inner (border-free) area of the volume slider.
    pub volume: Rect,
    pub loop_box: Rect,
    /// Inner area of the seek bar.
    pub progress: Rect,
    /// Inner area of the track list.
    pub track_list: Rect,
    /// Catalog index of the first visible list row.
    pub list_offset: usize,
    pub list_len: usize,
    pub theme_toggle: Rect,
}

impl HitMap {
    pub fn control_at(&self, column: u16, row: u16) -> Option<Control> {
        let pos = Position::new(column, row);
        if self.play_button.contains(pos) {
            Some(Control::PlayButton)
        } else if self.volume.contains(pos) {
            Some(Control::Volume)
        } else if self.loop_box.contains(pos) {
            Some(Control::Loop)
        } else if self.progress.contains(pos) {
            Some(Control::Progress)
        } else if self.theme_toggle.contains(pos) {
            Some(Control::ThemeToggle)
        } else if self.track_list.contains(pos) {
            let index = self.list_offset + usize::from(row - self.track_list.y);
            (index < self.list_len).then_some(Control::Track(index))
        } else {
            None
        }
    }

    /// Click offset and bar width for a seek at `column`.
    pub fn progress_offset(&self, column: u16) -> (f64, f64) {
        let x = column.saturating_sub(self.progress.x);
        (f64::from(x), f64::from(self.progress.width))
    }

    /// Slider value (0-100) under `column`, clamped to the slider ends.
    pub fn volume_at(&self, column: u16) -> i32 {
        let span = self.volume.width.saturating_sub(1);
        if span == 0 {
            return 0;
        }
        let x = column.saturating_sub(self.volume.x).min(span);
        (f64::from(x) / f64::from(span) * 100.0).round() as i32
    }
}

fn control_block<'a>(title: &'a str, focused: bool, palette: Palette) -> Block<'a> {
    let border = if focused {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    };
    let block = Block::default().borders(Borders::ALL).border_style(border);
    if title.is_empty() {
        block
    } else {
        block.title(title)
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

/// Draw the icon's shapes; canvas y grows upwards, SVG y downwards.
fn draw_icon(frame: &mut Frame, area: Rect, shapes: &IconShapes, palette: Palette) {
    let vb = shapes.view_box;
    let flip = |y: f64| 2.0 * vb.min_y + vb.height - y;
    let color = palette.fg;
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .background_color(palette.bg)
        .x_bounds([vb.min_x, vb.min_x + vb.width])
        .y_bounds([vb.min_y, vb.min_y + vb.height])
        .paint(|ctx| {
            for shape in &shapes.shapes {
                match *shape {
                    Shape::Line { x1, y1, x2, y2 } => {
                        ctx.draw(&Line::new(x1, flip(y1), x2, flip(y2), color));
                    }
                    Shape::Rect {
                        x,
                        y,
                        width,
                        height,
                    } => ctx.draw(&Rectangle {
                        x,
                        y: flip(y + height),
                        width,
                        height,
                        color,
                    }),
                    Shape::Circle { x, y, radius } => ctx.draw(&Circle {
                        x,
                        y: flip(y),
                        radius,
                        color,
                    }),
                }
            }
        });
    frame.render_widget(canvas, area);
}

fn draw_header(
    frame: &mut Frame,
    area: Rect,
    chrome: &Chrome<'_>,
    focus: Focus,
    hits: &mut HitMap,
) {
    let palette = Palette::for_theme(chrome.theme);
    let mut constraints: Vec<Constraint> = chrome
        .icons
        .iter()
        .map(|_| Constraint::Length(14))
        .collect();
    constraints.push(Constraint::Min(10));
    constraints.push(Constraint::Length(5));
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (slot, cell) in chrome.icons.iter().zip(cells.iter()) {
        match slot {
            IconSlot::Inline(icon) => draw_icon(frame, *cell, &icon.shapes, palette),
            IconSlot::Reference(_) => {
                let alt = Paragraph::new(slot.label())
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(palette.muted))
                    .wrap(Wrap { trim: true });
                frame.render_widget(alt, *cell);
            }
        }
    }

    let title_cell = cells[cells.len() - 2];
    let title = Paragraph::new(chrome.header_text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.fg).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(palette.muted)),
        );
    frame.render_widget(title, title_cell);

    let toggle_cell = cells[cells.len() - 1];
    let toggle = Paragraph::new(chrome.theme.glyph())
        .alignment(Alignment::Center)
        .block(control_block("", focus == Focus::ThemeToggle, palette));
    frame.render_widget(toggle, toggle_cell);
    hits.theme_toggle = toggle_cell;
}

/// Render the entire UI and report where the controls ended up.
pub fn draw<M: MediaElement>(frame: &mut Frame, app: &App<M>, chrome: &Chrome<'_>) -> HitMap {
    let palette = Palette::for_theme(chrome.theme);
    let view = &app.view;
    let mut hits = HitMap::default();

    frame.render_widget(
        Block::default().style(Style::default().fg(palette.fg).bg(palette.bg)),
        frame.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], chrome, app.focus, &mut hits);

    // Now playing
    let track = Paragraph::new(view.track_name.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(palette.accent));
    frame.render_widget(track, chunks[1]);

    // Controls row
    let controls = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Length(12),
        ])
        .split(chunks[2]);

    let play = Paragraph::new(view.play_label.as_str())
        .alignment(Alignment::Center)
        .block(control_block("", app.focus == Focus::PlayButton, palette));
    frame.render_widget(play, controls[0]);
    hits.play_button = controls[0];

    let volume_block = control_block(" volume ", app.focus == Focus::Volume, palette);
    hits.volume = volume_block.inner(controls[1]);
    let volume = Gauge::default()
        .block(volume_block)
        .gauge_style(Style::default().fg(palette.accent).bg(palette.bg))
        .ratio(f64::from(view.volume.min(100)) / 100.0)
        .label(format!("{}%", view.volume));
    frame.render_widget(volume, controls[1]);

    let mark = if view.loop_checked { "[x] Loop" } else { "[ ] Loop" };
    let looping = Paragraph::new(mark)
        .alignment(Alignment::Center)
        .block(control_block("", app.focus == Focus::Loop, palette));
    frame.render_widget(looping, controls[2]);
    hits.loop_box = controls[2];

    // Seek bar
    let progress_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted));
    hits.progress = progress_block.inner(chunks[3]);
    let ratio = if view.progress_pct.is_finite() {
        (view.progress_pct / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let progress = Gauge::default()
        .block(progress_block)
        .gauge_style(Style::default().fg(palette.accent).bg(palette.bg))
        .ratio(ratio)
        .label(format!("{} / {}", view.elapsed, view.duration));
    frame.render_widget(progress, chunks[3]);

    // Status
    let status = Paragraph::new(view.status.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted))
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[4]);

    // Track list, windowed around the selection.
    {
        let list_block = control_block(" tracks ", app.focus == Focus::TrackSelector, palette);
        let inner = list_block.inner(chunks[5]);
        let tracks = app.catalog().tracks();
        let total = tracks.len();
        let list_height = inner.height as usize;
        let sel_pos = view.selected.min(total.saturating_sub(1));
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let items: Vec<ListItem> = tracks[start..end]
            .iter()
            .map(|t| ListItem::new(t.name.as_str()))
            .collect();
        let list = List::new(items)
            .block(list_block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[5], &mut state);

        hits.track_list = inner;
        hits.list_offset = start;
        hits.list_len = total;
    }

    // Hint overlay
    if app.hint.is_visible() {
        let text = app.hint.text();
        let width = u16::try_from(text.chars().count())
            .unwrap_or(u16::MAX)
            .saturating_add(4);
        let area = frame.area();
        let bottom = Rect {
            y: area.y + area.height.saturating_sub(4),
            height: area.height.min(3),
            ..area
        };
        let popup = centered_rect_sized(width, 3, bottom);
        frame.render_widget(Clear, popup);
        let hint = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(palette.bg).bg(palette.accent))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(hint, popup);
    }

    hits
}
