use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use trawl_widget::{ElementId, Page};

use crate::app::{App, Mode, Pane};
use crate::filter::ALL_SOURCES;

pub const SEARCH_INPUT: ElementId = ElementId::new("search_input");
pub const SUGGESTIONS_ANCHOR: ElementId = ElementId::new("suggestions_anchor");
pub const SEARCH_RESULTS: ElementId = ElementId::new("search_results");
pub const FACET_RESULTS: ElementId = ElementId::new("facet_results");
pub const SOURCES: ElementId = ElementId::new("sources");
pub const STATUS_BAR: ElementId = ElementId::new("status_bar");

/// All element ids the widgets are bound to. Bootstrap validates these
/// against [`page_layout`] before anything renders.
pub const WIDGET_ELEMENTS: [ElementId; 5] = [
    SEARCH_INPUT,
    SUGGESTIONS_ANCHOR,
    SEARCH_RESULTS,
    FACET_RESULTS,
    SOURCES,
];

/// Compute the element layout for `area`. The same contract serves startup
/// validation and per-frame drawing, so a validated element is always
/// present later at render time.
pub fn page_layout(area: Rect) -> Page {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(body[0]);

    let mut page = Page::new();
    page.register(SEARCH_INPUT, rows[0]);
    page.register(SOURCES, side[0]);
    page.register(FACET_RESULTS, side[1]);
    page.register(SEARCH_RESULTS, body[1]);
    // Suggestions drop down from the input over the side column.
    let anchor = Rect::new(
        body[0].x,
        body[0].y,
        body[0].width,
        body[0].height.min(12),
    );
    page.register(SUGGESTIONS_ANCHOR, anchor);
    page.register(STATUS_BAR, rows[2]);
    page
}

pub fn draw(frame: &mut Frame, app: &App) {
    let page = page_layout(frame.area());

    draw_sources(frame, app, &page);
    app.container.render(frame, &page);
    draw_status(frame, app, &page);
    // Last, so the suggestion popup overlays the panes beneath it.
    app.search_box.render(frame, &page);
}

fn draw_sources(frame: &mut Frame, app: &App, page: &Page) {
    let area = match page.area(SOURCES) {
        Some(area) => area,
        None => return,
    };

    let items: Vec<ListItem> = app
        .sources
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let label = if value == ALL_SOURCES {
                "All sources"
            } else {
                value.as_str()
            };
            let applied = app.applied_source == Some(i);
            let (marker, color) = if applied {
                ("[x] ", Color::Yellow)
            } else {
                ("[ ] ", Color::White)
            };
            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(color)),
                Span::styled(label, Style::default().fg(color)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let border_color = if app.active_pane == Pane::Sources {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(" Sources "),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol(">> ");

    let mut state = ListState::default();
    state.select(Some(app.source_cursor));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_status(frame: &mut Frame, app: &App, page: &Page) {
    let area = match page.area(STATUS_BAR) {
        Some(area) => area,
        None => return,
    };

    let status = match app.mode {
        Mode::Query => Line::from(vec![
            Span::styled("Query: ", Style::default().fg(Color::Yellow)),
            Span::raw(app.search_box.input()),
            Span::styled(
                "  Enter:search Tab:complete Esc:cancel ",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Mode::Normal => {
            let source = match app.selected_source_value() {
                Some(value) if value == ALL_SOURCES => "all sources".to_string(),
                Some(value) => value.to_string(),
                None => "unfiltered".to_string(),
            };
            let mut spans = vec![Span::styled(
                format!(" {} ", source),
                Style::default().fg(Color::Cyan),
            )];

            if app.container.is_loading() {
                spans.push(Span::styled(
                    " searching... ",
                    Style::default().fg(Color::Yellow),
                ));
            }

            if !app.status_message.is_empty() {
                spans.push(Span::styled(
                    format!(" {} ", app.status_message),
                    Style::default().fg(Color::White),
                ));
            }

            spans.push(Span::styled(
                " q:quit /:query Tab:pane j/k:move Enter:apply ",
                Style::default().fg(Color::DarkGray),
            ));

            Line::from(spans)
        }
    };

    let bar = Paragraph::new(status).style(Style::default().bg(Color::Black));
    frame.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_registers_the_full_element_contract() {
        let page = page_layout(Rect::new(0, 0, 80, 24));
        for id in WIDGET_ELEMENTS {
            assert!(page.contains(id), "layout is missing {}", id);
        }
        assert!(page.contains(STATUS_BAR));
    }

    #[test]
    fn layout_registers_elements_even_on_tiny_terminals() {
        let page = page_layout(Rect::new(0, 0, 10, 3));
        for id in WIDGET_ELEMENTS {
            assert!(page.contains(id), "layout is missing {}", id);
        }
    }

    #[test]
    fn suggestion_anchor_sits_inside_the_body() {
        let page = page_layout(Rect::new(0, 0, 80, 24));
        let anchor = page.area(SUGGESTIONS_ANCHOR).unwrap();
        let input = page.area(SEARCH_INPUT).unwrap();
        assert_eq!(anchor.y, input.y + input.height);
    }
}
