use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use super::state::{BrowserState, Overlay, Picker, Screen, ShareDialog};
use crate::config::Config;
use crate::library::ViewMode;
use crate::palette::{hex_to_rgb, status_colors};
use crate::render::card::card_lines;
use crate::render::detail::state_lines;
use crate::render::listing::filter_summary;
use crate::render::table::TableRow;
use crate::render::{header_line, LineStyle, StyledLine, Viewport, EMPTY_HINT, EMPTY_TITLE};
use crate::share::ShareTarget;

const BORDER: Color = Color::Rgb(60, 66, 78);
const TITLE: Color = Color::Rgb(255, 255, 255);
const TEXT: Color = Color::Rgb(200, 205, 215);
const MUTED: Color = Color::Rgb(140, 150, 160);
const STATUS_BG: Color = Color::Rgb(35, 38, 45);
const STATUS_FG: Color = Color::Rgb(160, 170, 180);
const MODAL_BG: Color = Color::Rgb(25, 28, 35);
const HIGHLIGHT_BG: Color = Color::Rgb(45, 50, 59);

/// Card height including its border
const CARD_HEIGHT: u16 = 12;

fn block(title: impl Into<String>) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title.into())
        .border_style(Style::default().fg(BORDER))
        .title_style(Style::default().fg(TITLE))
}

fn modal(title: impl Into<String>) -> Block<'static> {
    block(title)
        .title_style(Style::default().fg(TITLE).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(MODAL_BG))
}

fn highlight() -> Style {
    Style::default()
        .bg(HIGHLIGHT_BG)
        .fg(TITLE)
        .add_modifier(Modifier::BOLD)
}

fn hex_color(hex: &str) -> Option<Color> {
    hex_to_rgb(hex).map(|(r, g, b)| Color::Rgb(r, g, b))
}

fn line_style(style: &LineStyle) -> Style {
    match style {
        LineStyle::Plain => Style::default().fg(TEXT),
        LineStyle::Heading => Style::default().fg(TITLE).add_modifier(Modifier::BOLD),
        LineStyle::Dimmed => Style::default().fg(MUTED),
        LineStyle::Hex(hex) => Style::default().fg(hex_color(hex).unwrap_or(TEXT)),
        LineStyle::Status(kind) => {
            let (_, fg) = status_colors(*kind);
            Style::default().fg(hex_color(fg).unwrap_or(TEXT))
        }
        LineStyle::Rating => Style::default().fg(Color::Yellow),
        LineStyle::Selected => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    }
}

fn to_line(line: StyledLine) -> Line<'static> {
    let style = line_style(&line.style);
    Line::from(Span::styled(line.text, style))
}

pub fn draw(f: &mut Frame, state: &mut BrowserState, config: &Config, table_state: &mut TableState) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(area);

    draw_header(f, state, chunks[0]);
    match state.screen {
        Screen::Listing => draw_listing(f, state, chunks[1], table_state),
        Screen::Detail => draw_detail(f, state, config, chunks[1]),
    }
    draw_status_bar(f, state, chunks[2]);

    match &state.overlay {
        Some(Overlay::Help) => draw_help_overlay(f),
        Some(Overlay::Picker(picker)) => draw_picker(f, picker),
        Some(Overlay::Share(dialog)) => draw_share_dialog(f, dialog),
        Some(Overlay::Lightbox { filename, url }) => draw_lightbox(f, filename, url),
        None => {}
    }
}

fn draw_header(f: &mut Frame, state: &BrowserState, area: Rect) {
    let count = header_line(state.library.visible().len(), state.page, state.total_pages);
    let mut top = vec![
        Span::styled(" Prompt Library ", Style::default().fg(TITLE).add_modifier(Modifier::BOLD)),
        Span::styled(format!("• {}", count), Style::default().fg(MUTED)),
    ];
    if state.loading {
        top.push(Span::styled(" • loading…", Style::default().fg(Color::Yellow)));
    }
    if state.library.selection_mode() {
        top.push(Span::styled(
            format!(" • {} selected", state.library.selected_count()),
            Style::default().fg(Color::Cyan),
        ));
    }

    let criteria = state.library.criteria();
    let second = if state.search_input {
        Line::from(vec![
            Span::styled(" / ", Style::default().fg(Color::Yellow)),
            Span::styled(format!("{}▏", criteria.search), Style::default().fg(TITLE)),
        ])
    } else {
        let summary = filter_summary(criteria).unwrap_or_else(|| "No filters".to_string());
        Line::from(vec![
            Span::styled(format!(" {}", summary), Style::default().fg(MUTED)),
            Span::styled(
                format!(" • Sort: {}", criteria.sort.display_name()),
                Style::default().fg(MUTED),
            ),
        ])
    };

    f.render_widget(Paragraph::new(vec![Line::from(top), second]), area);
}

fn draw_listing(f: &mut Frame, state: &mut BrowserState, area: Rect, table_state: &mut TableState) {
    if state.library.visible().is_empty() {
        draw_empty_listing(f, state, area);
        return;
    }
    match state.library.view_mode() {
        ViewMode::Grid => draw_grid(f, state, area),
        ViewMode::Table => draw_table(f, state, area, table_state),
    }
}

fn draw_empty_listing(f: &mut Frame, state: &BrowserState, area: Rect) {
    let lines = if state.loading {
        vec![Line::from("Loading prompts…")]
    } else if let Some(error) = &state.load_error {
        vec![
            Line::from(Span::styled("Failed to load prompts", Style::default().fg(Color::Red))),
            Line::from(""),
            Line::from(error.clone()),
            Line::from(""),
            Line::from("Press R to retry"),
        ]
    } else {
        vec![
            Line::from(Span::styled(EMPTY_TITLE, Style::default().fg(TITLE).add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(EMPTY_HINT),
        ]
    };

    let paragraph = Paragraph::new(lines)
        .block(block(" Prompts "))
        .style(Style::default().fg(MUTED))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_grid(f: &mut Frame, state: &mut BrowserState, area: Rect) {
    let columns = Viewport::new(area.width).grid_columns();
    state.grid_columns = columns;

    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let cursor_row = state.cursor / columns;
    let first_row = cursor_row.saturating_sub(visible_rows - 1);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    let selection_mode = state.library.selection_mode();
    let records = state.library.visible();

    for (slot, row_area) in row_areas.iter().enumerate() {
        let row = first_row + slot;
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);

        for (col, cell) in cells.iter().enumerate() {
            let index = row * columns + col;
            let Some(record) = records.get(index) else {
                return;
            };
            let selected = selection_mode.then(|| state.library.is_selected(&record.id));
            let inner_width = cell.width.saturating_sub(2) as usize;
            let lines: Vec<Line> = card_lines(record, inner_width, selected)
                .into_iter()
                .map(to_line)
                .collect();

            let border = if index == state.cursor {
                Style::default().fg(TITLE).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(BORDER)
            };
            let card = Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border),
            );
            f.render_widget(card, *cell);
        }
    }
}

fn draw_table(f: &mut Frame, state: &BrowserState, area: Rect, table_state: &mut TableState) {
    let viewport = Viewport::new(area.width);
    let compact = viewport.is_compact();
    let selection_mode = state.library.selection_mode();

    let rows: Vec<Row> = state
        .library
        .visible()
        .iter()
        .map(|record| {
            let selected = selection_mode.then(|| state.library.is_selected(&record.id));
            let row = TableRow::new(record, viewport, selected);
            let checkbox = match row.checkbox {
                Some(true) => "[x] ",
                Some(false) => "[ ] ",
                None => "",
            };
            let title = Cell::from(vec![
                Line::from(Span::styled(
                    format!("{}{}", checkbox, row.title),
                    Style::default().fg(TITLE),
                )),
                Line::from(Span::styled(row.excerpt.clone(), Style::default().fg(MUTED))),
            ]);
            let tool = Cell::from(Span::styled(
                row.tool.clone(),
                Style::default().fg(hex_color(&row.tool_color).unwrap_or(TEXT)),
            ));
            let mut cells = vec![
                title,
                tool,
                Cell::from(row.category.clone()),
                Cell::from(Span::styled(row.rating.clone(), Style::default().fg(Color::Yellow))),
            ];
            if !compact {
                let status = row.status.clone().map(to_line).unwrap_or_default();
                cells.push(Cell::from(status));
                cells.push(Cell::from(row.usage.clone()));
                cells.push(Cell::from(row.date.clone()));
            }
            Row::new(cells).height(2).style(Style::default().fg(TEXT))
        })
        .collect();

    let mut header = vec!["Prompt", "Tool", "Category", "Rating"];
    let mut widths = vec![
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(7),
    ];
    if !compact {
        header.extend(["Status", "Uses", "Created"]);
        widths.extend([Constraint::Length(10), Constraint::Length(6), Constraint::Length(8)]);
    }

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().fg(MUTED).add_modifier(Modifier::BOLD)))
        .block(block(" Prompts "))
        .highlight_style(highlight())
        .highlight_symbol("▶ ");

    table_state.select(Some(state.cursor));
    f.render_stateful_widget(table, area, table_state);
}

fn draw_detail(f: &mut Frame, state: &BrowserState, config: &Config, area: Rect) {
    let copied = state
        .detail
        .detail()
        .and_then(|d| {
            let id = &d.record.id;
            if state.copy_feedback.is_active_for(&format!("body:{}", id)) {
                Some("Prompt copied!")
            } else if state.copy_feedback.is_active_for(&format!("output:{}", id)) {
                Some("Output copied!")
            } else {
                None
            }
        });
    let title = match copied {
        Some(feedback) => format!(" Prompt Detail • ✓ {} ", feedback),
        None => " Prompt Detail ".to_string(),
    };

    let lines: Vec<Line> = state_lines(&state.detail, config)
        .into_iter()
        .map(to_line)
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(block(title))
        .style(Style::default().fg(TEXT))
        .wrap(Wrap { trim: false })
        .scroll((state.detail_scroll, 0));
    f.render_widget(paragraph, area);
}

fn draw_status_bar(f: &mut Frame, state: &BrowserState, area: Rect) {
    let status_text = if let Some((msg, _)) = &state.status_message {
        format!(" {}", msg)
    } else if state.search_input {
        " [Esc/Enter] Done • Type to search title, model or tags".to_string()
    } else {
        match state.screen {
            Screen::Listing if state.library.selection_mode() => {
                " [Space/Enter] Toggle • [a] All/None • [e] Export • [S] Share • [y] Copy • [m] Done".to_string()
            }
            Screen::Listing => {
                " [hjkl] Navigate • [Enter] Open • [/] Search • [t/c/r] Filter • [s] Sort • [v] View • [m] Select • [?] Help • [q] Quit".to_string()
            }
            Screen::Detail => {
                " [Esc] Back • [y] Copy • [Y] Copy output • [s] Share • [F] Favorite • [o] Attachment • [1-3] Related".to_string()
            }
        }
    };

    let status = Paragraph::new(status_text).style(Style::default().bg(STATUS_BG).fg(STATUS_FG));
    f.render_widget(status, area);
}

fn draw_picker(f: &mut Frame, picker: &Picker) {
    let area = centered_rect(40, 50, f.area());
    f.render_widget(Clear, area);

    let items: Vec<ListItem> = picker
        .choices
        .iter()
        .map(|c| ListItem::new(c.clone()))
        .collect();
    let list = List::new(items)
        .block(modal(format!(" {} ", picker.kind.title())))
        .style(Style::default().fg(TEXT))
        .highlight_style(highlight())
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    list_state.select(Some(picker.cursor));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_share_dialog(f: &mut Frame, dialog: &ShareDialog) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)].as_ref())
        .split(area);

    let items: Vec<ListItem> = ShareTarget::ALL
        .iter()
        .map(|t| ListItem::new(t.label()))
        .collect();
    let list = List::new(items)
        .block(modal(format!(" Share: {} ", dialog.payload.subject)))
        .style(Style::default().fg(TEXT))
        .highlight_style(highlight())
        .highlight_symbol("▶ ");
    let mut list_state = ListState::default();
    list_state.select(Some(dialog.cursor));
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    let preview = Paragraph::new(dialog.payload.text.clone())
        .block(modal(" Preview "))
        .style(Style::default().fg(MUTED))
        .wrap(Wrap { trim: false });
    f.render_widget(preview, chunks[1]);
}

fn draw_lightbox(f: &mut Frame, filename: &str, url: &str) {
    let area = centered_rect(70, 30, f.area());
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(filename.to_string(), Style::default().fg(TITLE).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(url.to_string(), Style::default().fg(Color::Cyan))),
        Line::from(""),
        Line::from(Span::styled("[Enter] Open in browser • [Esc] Close", Style::default().fg(MUTED))),
    ];
    let paragraph = Paragraph::new(lines)
        .block(modal(" Attachment "))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(80, 80, f.area());
    f.render_widget(Clear, area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Prompt Library - Help",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Navigation:"),
        Line::from("  j/k, ↑/↓     - Move up/down (a row of cards in grid view)"),
        Line::from("  h/l, ←/→     - Move left/right"),
        Line::from("  g/G          - Go to first/last"),
        Line::from("  n/p          - Next/previous page"),
        Line::from("  Enter        - Open detail (toggle in selection mode)"),
        Line::from(""),
        Line::from("Filters:"),
        Line::from("  /            - Search title, model and tags"),
        Line::from("  t / c / r    - Pick tool / category / minimum rating"),
        Line::from("  s            - Cycle sort order"),
        Line::from("  f            - Favorites only"),
        Line::from("  x            - Clear filters"),
        Line::from("  v            - Toggle grid/table view"),
        Line::from(""),
        Line::from("Selection:"),
        Line::from("  m            - Toggle selection mode"),
        Line::from("  Space        - Toggle prompt"),
        Line::from("  a            - Select all/none"),
        Line::from("  e            - Export selection to a text file"),
        Line::from("  S            - Share selection"),
        Line::from(""),
        Line::from("Actions:"),
        Line::from("  y            - Copy prompt (or the selection)"),
        Line::from("  Y            - Copy output (detail)"),
        Line::from("  s            - Share (detail)"),
        Line::from("  F            - Toggle favorite"),
        Line::from("  o            - Open attachment (detail)"),
        Line::from("  1-3          - Open related prompt (detail)"),
        Line::from("  R            - Reload"),
        Line::from(""),
        Line::from("Other:"),
        Line::from("  q            - Quit (back from detail)"),
        Line::from("  ?            - This help"),
        Line::from("  Esc          - Cancel/back"),
        Line::from(""),
        Line::from("Press any key to close help..."),
    ];

    let help_block = Paragraph::new(help_text)
        .block(modal(" Help "))
        .style(Style::default().fg(TEXT))
        .wrap(Wrap { trim: true });

    f.render_widget(help_block, area);
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
