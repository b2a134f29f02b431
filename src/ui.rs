use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, CANDIDATE_COUNTRIES, YEAR_MAX, YEAR_MIN};
use crate::braille::ColorCanvas;
use crate::chart::line::{LineChart, EVENT_MARKERS, LINE_CHART_TITLE};
use crate::chart::ranking::{Ranking, GAIN_LOSS_NOTE, RANKING_TITLE};
use crate::export::{MAP_SUBTITLE, MAP_TITLE};
use crate::map::geometry::draw_line;

/// Render the full dashboard: title, map, line chart, the two-column
/// bottom section and the status bar
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // Page title
            Constraint::Percentage(38), // Choropleth map
            Constraint::Percentage(30), // Line chart
            Constraint::Min(9),         // Controls | metrics | ranking
            Constraint::Length(1),      // Status bar
        ])
        .split(frame.area());

    render_title(frame, chunks[0]);
    render_map(frame, app, chunks[1]);
    render_line_chart(frame, app, chunks[2]);
    render_bottom(frame, app, chunks[3]);
    render_status_bar(frame, app, chunks[4]);
}

fn panel_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_title(frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(MAP_TITLE, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {MAP_SUBTITLE}"),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Write a clipped string directly into the buffer
fn put_string(buf: &mut Buffer, x: u16, y: u16, max_width: u16, text: &str, style: Style) {
    for (i, ch) in text.chars().enumerate() {
        let i = i as u16;
        if i >= max_width {
            break;
        }
        buf[(x + i, y)].set_char(ch).set_style(style);
    }
}

/// Copy non-empty canvas cells into the buffer at the area origin
fn blit_canvas(canvas: &ColorCanvas, area: Rect, buf: &mut Buffer) {
    for (cx, cy, ch, color) in canvas.cells() {
        let (cx, cy) = (cx as u16, cy as u16);
        if cx < area.width && cy < area.height {
            buf[(area.x + cx, area.y + cy)].set_char(ch).set_fg(color);
        }
    }
}

// --- choropleth section ---

fn render_map(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(app.focus == Focus::Map))
        .title(Span::styled(
            " Cumulative Natural Gas Production by Country ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    // The mouse handlers and hover hit-tests need this frame's geometry
    app.map_area = Some(inner);
    app.viewport.width = inner.width as usize * 2;
    app.viewport.height = inner.height as usize * 4;

    let mut fill = ColorCanvas::new(inner.width as usize, inner.height as usize);
    let mut borders = ColorCanvas::new(inner.width as usize, inner.height as usize);

    let hovered = app.hovered_region().map(|(r, _)| r.name.clone());
    let mut emphasis: Vec<&str> = Vec::new();
    if let Some(name) = app.highlight.as_deref() {
        emphasis.push(name);
    }
    if let Some(name) = hovered.as_deref() {
        emphasis.push(name);
    }
    app.map.render(&app.viewport, &mut fill, &mut borders, &emphasis);

    let buf = frame.buffer_mut();
    blit_canvas(&fill, inner, buf);
    blit_canvas(&borders, inner, buf);

    render_legend(frame, app, inner);
    render_search_prompt(frame, app, inner);
    render_tooltip(frame, app, inner);
}

fn render_legend(frame: &mut Frame, app: &App, inner: Rect) {
    const LEGEND_WIDTH: u16 = 26;
    let stops = app.map.scale().stops();
    let rows = stops.len() as u16 + 1;
    if inner.width < LEGEND_WIDTH + 20 || inner.height < rows + 2 {
        return;
    }
    let area = Rect {
        x: inner.x + inner.width - LEGEND_WIDTH,
        y: inner.y,
        width: LEGEND_WIDTH,
        height: rows,
    };

    let mut lines = vec![Line::from(Span::styled(
        app.map.scale().caption,
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (i, &(threshold, color)) in stops.iter().enumerate().rev() {
        let label = match stops.get(i + 1) {
            Some(&(next, _)) => format!(" {threshold:.0} \u{2013} {next:.0}"),
            None => format!(" \u{2265} {threshold:.0}"),
        };
        lines.push(Line::from(vec![
            Span::styled("\u{2588}\u{2588}", Style::default().fg(color.into())),
            Span::raw(label),
        ]));
    }

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_search_prompt(frame: &mut Frame, app: &App, inner: Rect) {
    let Some(query) = &app.search else {
        return;
    };
    let text = format!(" Search for a country: {query}\u{2590}");
    let width = (text.chars().count() as u16).min(inner.width);
    let area = Rect {
        x: inner.x,
        y: inner.y,
        width,
        height: 1,
    };
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Black).bg(Color::White)),
        area,
    );
}

fn render_tooltip(frame: &mut Frame, app: &App, inner: Rect) {
    let Some((region, (col, row))) = app.hovered_region() else {
        return;
    };
    let name_line = format!(" Country: {} ", region.name);
    let value_line = format!(" Cumulative production (EJ): {:.2} ", region.cumulative);
    let width = name_line.chars().count().max(value_line.chars().count()) as u16;

    let mut x = col.saturating_add(2);
    let mut y = row.saturating_add(1);
    if x + width > inner.x + inner.width {
        x = (inner.x + inner.width).saturating_sub(width);
    }
    if y + 2 > inner.y + inner.height {
        y = row.saturating_sub(2);
    }
    let area = Rect {
        x,
        y,
        width,
        height: 2,
    }
    .intersection(frame.area());

    let style = Style::default().fg(Color::Black).bg(Color::White);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(vec![Line::from(name_line), Line::from(value_line)]).style(style),
        area,
    );
}

// --- line chart section ---

fn render_line_chart(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(false))
        .title(Span::styled(
            format!(" {LINE_CHART_TITLE} "),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Empty selection: no chart, no error
    let Some(chart) = &app.line_chart else {
        return;
    };
    if inner.width < 20 || inner.height < 6 {
        return;
    }
    draw_line_chart(chart, inner, frame.buffer_mut());
}

fn draw_line_chart(chart: &LineChart, inner: Rect, buf: &mut Buffer) {
    const Y_GUTTER: u16 = 8;
    let legend_width: u16 = if inner.width >= 60 { 18 } else { 0 };

    // One row above the plot for marker labels, one below for year ticks
    let plot = Rect {
        x: inner.x + Y_GUTTER,
        y: inner.y + 1,
        width: inner.width - Y_GUTTER - legend_width,
        height: inner.height - 2,
    };
    let pw = plot.width as i32 * 2;
    let ph = plot.height as i32 * 4;
    let x_span = (chart.x_max - chart.x_min).max(1) as f64;

    let to_px = |year: i32| -> i32 {
        ((year - chart.x_min) as f64 / x_span * (pw - 1) as f64).round() as i32
    };
    let to_py = |value: f64| -> i32 { ((1.0 - value / chart.y_max) * (ph - 1) as f64).round() as i32 };

    let mut canvas = ColorCanvas::new(plot.width as usize, plot.height as usize);

    // Dashed event markers sit behind the series lines
    for marker in &EVENT_MARKERS {
        if marker.year < chart.x_min || marker.year > chart.x_max {
            continue;
        }
        let px = to_px(marker.year);
        let mut y = 0;
        while y < ph {
            canvas.set_pixel_signed(px, y, Color::DarkGray);
            y += 3;
        }
    }

    for series in &chart.series {
        let color = series.color.into();
        for segment in &series.segments {
            if segment.len() == 1 {
                let (year, value) = segment[0];
                canvas.set_pixel_signed(to_px(year), to_py(value), color);
                continue;
            }
            for pair in segment.windows(2) {
                let (x0, y0) = (to_px(pair[0].0), to_py(pair[0].1));
                let (x1, y1) = (to_px(pair[1].0), to_py(pair[1].1));
                draw_line(&mut canvas, x0, y0, x1, y1, color);
            }
        }
    }

    blit_canvas(&canvas, plot, buf);

    // Top-anchored marker labels
    let label_style = Style::default().fg(Color::DarkGray);
    for marker in &EVENT_MARKERS {
        if marker.year < chart.x_min || marker.year > chart.x_max {
            continue;
        }
        let char_x = plot.x + (to_px(marker.year) / 2) as u16;
        let remaining = (plot.x + plot.width).saturating_sub(char_x);
        put_string(buf, char_x, inner.y, remaining, marker.label, label_style);
    }

    // Year ticks every 10 years
    for year in chart.decade_ticks() {
        let char_x = plot.x + (to_px(year) / 2) as u16;
        let label = year.to_string();
        if char_x + label.len() as u16 <= plot.x + plot.width {
            put_string(
                buf,
                char_x,
                plot.y + plot.height,
                label.len() as u16,
                &label,
                label_style,
            );
        }
    }

    // Y extent labels in the left gutter
    put_string(
        buf,
        inner.x,
        plot.y,
        Y_GUTTER - 1,
        &format!("{:.1}", chart.y_max),
        label_style,
    );
    put_string(
        buf,
        inner.x,
        plot.y + plot.height - 1,
        Y_GUTTER - 1,
        "0.0",
        label_style,
    );

    // Per-series legend on the right
    if legend_width > 0 {
        for (i, series) in chart.series.iter().enumerate() {
            let y = plot.y + i as u16;
            if y >= plot.y + plot.height {
                break;
            }
            let x = plot.x + plot.width + 1;
            put_string(
                buf,
                x,
                y,
                2,
                "\u{2500}",
                Style::default().fg(series.color.into()),
            );
            put_string(
                buf,
                x + 2,
                y,
                legend_width.saturating_sub(3),
                &series.name,
                Style::default(),
            );
        }
    }
}

// --- bottom section: controls | metrics | ranking bars ---

fn render_bottom(frame: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),
            Constraint::Percentage(28),
            Constraint::Percentage(44),
        ])
        .split(area);

    render_controls(frame, app, columns[0]);
    render_metrics(frame, app, columns[1]);
    render_ranking(frame, app, columns[2]);
}

fn render_controls(frame: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = CANDIDATE_COUNTRIES
        .iter()
        .map(|&name| {
            let marker = if app.is_selected(name) { "[x] " } else { "[ ] " };
            let style = if app.is_selected(name) {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::raw(name),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(panel_border(app.focus == Focus::Countries))
                .title(" Select countries to display "),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, rows[0], &mut app.list_state);

    render_year_slider(frame, app, rows[1]);
}

fn render_year_slider(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(app.focus == Focus::Year))
        .title(format!(" Select a Year \u{2014} {} ", app.year));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width < 14 || inner.height < 1 {
        return;
    }

    let min_label = YEAR_MIN.to_string();
    let max_label = YEAR_MAX.to_string();
    let track_width = inner.width as usize - min_label.len() - max_label.len() - 2;
    let ratio = (app.year - YEAR_MIN) as f64 / (YEAR_MAX - YEAR_MIN) as f64;
    let knob = ((track_width - 1) as f64 * ratio).round() as usize;

    let mut track = String::new();
    for i in 0..track_width {
        track.push(if i == knob { '\u{25CF}' } else { '\u{2500}' });
    }

    let knob_style = if app.focus == Focus::Year {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let line = Line::from(vec![
        Span::styled(min_label, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(track, knob_style),
        Span::raw(" "),
        Span::styled(max_label, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_metrics(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(false))
        .title(" Top Gains/Losses ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(gain_loss) = app.ranking.as_ref().and_then(|r| r.gain_loss.as_ref()) else {
        return;
    };

    let metric_lines = |country: &str, delta: f64| -> Vec<Line<'static>> {
        let color = if delta >= 0.0 { Color::Green } else { Color::Red };
        let arrow = if delta >= 0.0 { '\u{25B2}' } else { '\u{25BC}' };
        vec![
            Line::from(Span::styled(
                country.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            // The indicator echoes the primary value
            Line::from(vec![
                Span::styled(format!("{delta:+.2}"), Style::default().fg(color)),
                Span::styled(
                    format!("  {arrow} {delta:+.2}"),
                    Style::default().fg(color),
                ),
            ]),
        ]
    };

    let mut lines = metric_lines(&gain_loss.top_gain.country, gain_loss.top_gain.delta);
    lines.push(Line::default());
    lines.extend(metric_lines(&gain_loss.top_loss.country, gain_loss.top_loss.delta));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        GAIN_LOSS_NOTE,
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_ranking(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(panel_border(false))
        .title(format!(" {RANKING_TITLE} "))
        .title_bottom(
            Line::from(" Production (Billion Cubic Feet) ")
                .style(Style::default().fg(Color::DarkGray)),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(ranking) = &app.ranking else {
        return;
    };
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    draw_ranking_bars(ranking, inner, frame);
}

fn draw_ranking_bars(ranking: &Ranking, inner: Rect, frame: &mut Frame) {
    // Bar values are fixed-point hundredths so fractional production
    // still ranks correctly
    let bars: Vec<Bar> = ranking
        .bars
        .iter()
        .map(|(country, production)| {
            Bar::default()
                .value((production * 100.0).round() as u64)
                .text_value(format!("{production:.2}"))
                .label(Line::from(country.clone()))
                .style(Style::default().fg(Color::Blue))
                .value_style(Style::default().fg(Color::White).bg(Color::Blue))
        })
        .collect();

    let chart = BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, inner);
}

// --- status bar ---

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let focus_name = match app.focus {
        Focus::Countries => "countries",
        Focus::Year => "year",
        Focus::Map => "map",
    };
    let keys = match app.focus {
        Focus::Countries => "\u{2191}\u{2193}:move space:toggle",
        Focus::Year => "\u{2190}\u{2192}:\u{b1}1 pgup/pgdn:\u{b1}10 home/end:bounds",
        Focus::Map => "hjkl:pan +/-:zoom /:search r:reset",
    };

    let mut spans = vec![
        Span::styled(" Focus: ", Style::default().fg(Color::DarkGray)),
        Span::styled(focus_name, Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(keys, Style::default().fg(Color::Gray)),
    ];
    if app.focus == Focus::Map {
        spans.extend([
            Span::styled(" | Zoom: ", Style::default().fg(Color::DarkGray)),
            Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        ]);
    }
    spans.push(Span::styled(
        " | tab:panel q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
