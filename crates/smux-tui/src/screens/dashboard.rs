//! Dashboard screen: streams, muxes and the server process panel.

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use smux_api::StatsField;
use smux_core::entity::EntityKind;
use smux_core::{Dashboard, EntityStatus, ProcessView, Section};

use crate::selection::Selection;
use crate::theme;
use crate::widgets::onoff::onoff_span;

pub fn render(frame: &mut Frame, area: Rect, dash: &Dashboard, sel: &Selection, now: Instant) {
    let [header, streams, muxes, process] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Percentage(60),
        Constraint::Percentage(40),
        Constraint::Length(3),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(header_line(dash, now)), header);
    render_section(frame, streams, dash, sel, Section::Stream, now);
    render_section(frame, muxes, dash, sel, Section::Mux, now);
    render_process(frame, process, dash.process());
}

fn header_line(dash: &Dashboard, now: Instant) -> Line<'static> {
    let label = dash.connection().label().text().to_owned();
    let style = if dash.connection().is_highlighted(now) {
        theme::pulse()
    } else {
        theme::title_style()
    };
    let mut spans = vec![Span::raw(" "), Span::styled(format!(" {label} "), style)];
    if dash.all_details() {
        spans.push(Span::styled("  [details]", theme::key_hint_key()));
    }
    if dash.all_relative() {
        spans.push(Span::styled("  [relative]", theme::key_hint_key()));
    }
    Line::from(spans)
}

fn block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default())
}

fn render_section(
    frame: &mut Frame,
    area: Rect,
    dash: &Dashboard,
    sel: &Selection,
    section: Section,
    now: Instant,
) {
    let entities: Vec<&EntityStatus> = match section {
        Section::Stream => dash.registry().streams().collect(),
        Section::Mux => dash.registry().muxes().collect(),
    };
    let title = match section {
        Section::Stream => format!(" Streams ({}) ", entities.len()),
        Section::Mux => format!(" Muxes ({}) ", entities.len()),
    };
    let block = block(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    let mut cursor_line = None;
    for entity in entities {
        let selected = sel.is_selected(section, entity.name());
        if selected {
            cursor_line = Some(lines.len());
        }
        lines.extend(entity_lines(entity, selected, now));
    }

    let scroll = scroll_offset(cursor_line, inner.height);
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

/// First visible line so the cursor line stays on screen.
fn scroll_offset(cursor_line: Option<usize>, height: u16) -> u16 {
    let Some(line) = cursor_line else {
        return 0;
    };
    let visible = usize::from(height.max(1));
    u16::try_from((line + 1).saturating_sub(visible)).unwrap_or(u16::MAX)
}

/// Blocked overrides the foreground but keeps the cursor background.
fn row_style(entity: &EntityStatus, selected: bool) -> Style {
    let base = if selected {
        theme::selected()
    } else if entity.is_linked() {
        theme::linked()
    } else {
        theme::row()
    };
    if entity.is_blocked() {
        base.patch(theme::blocked())
    } else {
        base
    }
}

/// Summary line plus, when expanded, the details and counter rows.
pub fn entity_lines(entity: &EntityStatus, selected: bool, now: Instant) -> Vec<Line<'static>> {
    let style = row_style(entity, selected);
    let marker = if selected { "▸ " } else { "  " };
    let stats = entity.stats();
    let msgs = |ix: usize| {
        stats.row(StatsField::NMsgs).map_or_else(String::new, |r| {
            if ix == 0 {
                r.a.text().to_owned()
            } else {
                r.b.text().to_owned()
            }
        })
    };

    let mut spans = vec![Span::styled(format!("{marker}{:<16}", entity.name()), style)];
    match entity.kind() {
        EntityKind::Stream(f) => spans.push(Span::styled(
            format!("{:<8} {:<4} {:<12} ", f.kind, f.mode, f.state),
            style,
        )),
        EntityKind::Mux(f) => spans.push(Span::styled(
            format!("{} → {:<22} ", f.src, f.dst),
            style,
        )),
    }
    for ix in 0..2 {
        if let Some(action) = entity.onoff(ix) {
            spans.push(onoff_span(action, now));
        }
    }
    spans.push(Span::styled(format!(" {:>14} {:>14}", msgs(0), msgs(1)), style));
    if entity.is_relative() {
        spans.push(Span::styled(" Δ", theme::key_hint_key()));
    }
    if entity.is_blocked() {
        spans.push(Span::styled(" waiting", theme::blocked()));
    }
    match entity.kind() {
        EntityKind::Stream(f) => spans.push(Span::styled(format!("  {}", f.opts), theme::key_hint())),
        EntityKind::Mux(_) => {
            let filters: Vec<&str> = (0..2)
                .filter_map(|ix| entity.filter(ix).map(|t| t.text()))
                .filter(|t| !t.is_empty())
                .collect();
            if !filters.is_empty() {
                spans.push(Span::styled(format!("  {}", filters.join(" | ")), theme::key_hint()));
            }
        }
    }

    let mut lines = vec![Line::from(spans)];
    if entity.details_shown() {
        lines.extend(detail_lines(entity));
    }
    lines
}

fn detail_lines(entity: &EntityStatus) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let EntityKind::Stream(f) = entity.kind() {
        if !f.error.text().is_empty() {
            lines.push(Line::styled(format!("      error: {}", f.error), theme::error_text()));
        }
        for (label, field) in [("info", &f.info), ("disp", &f.disp)] {
            if !field.text().is_empty() {
                lines.push(Line::styled(format!("      {label}: {field}"), theme::row()));
            }
        }
        for (label, ix) in [("filter A", 0), ("filter B", 1)] {
            if let Some(filter) = entity.filter(ix).filter(|t| !t.text().is_empty()) {
                lines.push(Line::styled(format!("      {label}: {filter}"), theme::row()));
            }
        }
        for state in f.statestrs2.text().lines() {
            lines.push(Line::styled(format!("      {state}"), theme::key_hint()));
        }
    }
    for row in entity.stats().rows() {
        let style = if row.dim.is_on() { theme::zero() } else { theme::row() };
        lines.push(Line::styled(
            format!("      {:<16} {:>14} {:>14}", row.field.label(), row.a, row.b),
            style,
        ));
    }
    lines
}

fn render_process(frame: &mut Frame, area: Rect, proc: &ProcessView) {
    let block = block(" Server ".into());
    let line = Line::from(vec![
        Span::styled(" mem ", theme::key_hint()),
        Span::styled(format!("{} MB (peak {})", proc.mem_curr, proc.mem_peak), theme::row()),
        Span::styled("  cpu ", theme::key_hint()),
        Span::styled(
            format!("{}% (avg {}, peak {})", proc.cpu_curr, proc.cpu_avg, proc.cpu_peak),
            theme::row(),
        ),
        Span::styled("  pid ", theme::key_hint()),
        Span::styled(proc.pid.text().to_owned(), theme::row()),
        Span::styled("  time ", theme::key_hint()),
        Span::styled(proc.time.text().to_owned(), theme::row()),
        Span::styled("  up ", theme::key_hint()),
        Span::styled(proc.uptime.text().to_owned(), theme::row()),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}
