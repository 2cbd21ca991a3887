use crate::export::report::PAGE_BREAK;
use crate::map;
use crate::model::{CostStatus, FarStatus, LetterGrade, ProjectEvaluation, RoaStatus};
use crate::ui::app::{App, EditTarget, Field, Notice};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table,
        Wrap,
    },
    Frame,
};

// Brand colors
const BRAND_DARK: Color = Color::Rgb(0x1F, 0x2F, 0x3C);
const BRAND_ACCENT: Color = Color::Rgb(0x58, 0x6B, 0x71);
const BRAND_SELECT_BG: Color = Color::Rgb(0xC3, 0xD3, 0xE0);
const BRAND_GREEN: Color = Color::Rgb(0x82, 0x9A, 0x68);
const BRAND_ORANGE: Color = Color::Rgb(0x9E, 0x68, 0x3C);
const BRAND_RED: Color = Color::Rgb(0xA8, 0x44, 0x3C);
const BRAND_MUTED: Color = Color::Rgb(0x71, 0x65, 0x65);

// Styles
const HEADER_STYLE: Style = Style::new().fg(BRAND_DARK).add_modifier(Modifier::BOLD);
const SELECTED_STYLE: Style = Style::new()
    .bg(BRAND_SELECT_BG)
    .fg(BRAND_DARK)
    .add_modifier(Modifier::BOLD);
const LABEL_STYLE: Style = Style::new().fg(BRAND_MUTED);
const GOOD_STYLE: Style = Style::new().fg(BRAND_GREEN).add_modifier(Modifier::BOLD);
const WARN_STYLE: Style = Style::new().fg(BRAND_ORANGE).add_modifier(Modifier::BOLD);
const BAD_STYLE: Style = Style::new().fg(BRAND_RED).add_modifier(Modifier::BOLD);

pub fn draw_dashboard(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(12),   // Main content
        Constraint::Length(1), // Notice
        Constraint::Length(3), // Footer
    ])
    .split(frame.area());

    draw_header(frame, chunks[0], app);
    draw_main_content(frame, chunks[1], app);
    draw_notice(frame, chunks[2], app);

    let help = if app.edit.is_some() {
        " Enter Save | Esc Cancel | Backspace Delete "
    } else {
        " ↑↓ Field | Enter Edit | +/- Adjust | r Report | e Export | g Grade | p Provider | a API key | q Quit "
    };
    draw_footer(frame, chunks[3], help);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let verdict = match &app.evaluation {
        Ok(evaluation) if evaluation.passes() => Span::styled("PASS", GOOD_STYLE),
        Ok(_) => Span::styled("REVIEW", WARN_STYLE),
        Err(_) => Span::styled("NO RESULT", BAD_STYLE),
    };

    let title = Line::from(vec![
        Span::styled(
            format!(" Land Audit | {} | ", app.project.project_name),
            HEADER_STYLE,
        ),
        verdict,
        Span::styled(format!(" | grader: {} ", app.settings.provider), HEADER_STYLE),
    ]);

    let header = Paragraph::new(title).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_main_content(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::horizontal([
        Constraint::Percentage(38), // Inputs
        Constraint::Percentage(62), // Results
    ])
    .split(area);

    draw_inputs(frame, chunks[0], app);

    match &app.evaluation {
        Ok(evaluation) => draw_results(frame, chunks[1], app, evaluation),
        Err(e) => {
            let lines = vec![
                Line::from(Span::styled("No result", BAD_STYLE)),
                Line::from(""),
                Line::from(format!("{} ({})", e, e.code())),
                Line::from(Span::styled(e.thai_message(), LABEL_STYLE)),
            ];
            let panel = Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(titled(" Evaluation ", Some(BRAND_RED)));
            frame.render_widget(panel, chunks[1]);
        }
    }
}

fn draw_inputs(frame: &mut Frame, area: Rect, app: &App) {
    let header = Row::new(vec!["Input", "Value", "Unit"])
        .style(HEADER_STYLE)
        .height(1);

    let rows: Vec<Row> = Field::ALL
        .iter()
        .enumerate()
        .map(|(i, &field)| {
            let is_selected = i == app.selected;
            let editing = app
                .edit
                .as_ref()
                .filter(|e| e.target == EditTarget::Field(field));

            let value = match editing {
                Some(edit) => format!("{}▏", edit.buffer),
                None => format_value(app.field_value(field), field.decimals()),
            };

            let style = if editing.is_some() {
                SELECTED_STYLE.fg(BRAND_ORANGE)
            } else if is_selected {
                SELECTED_STYLE
            } else {
                Style::default()
            };

            Row::new(vec![
                field.label().to_string(),
                value,
                field.unit().to_string(),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(48),
        Constraint::Percentage(36),
        Constraint::Percentage(16),
    ];

    let border = app
        .edit
        .as_ref()
        .is_some_and(|e| matches!(e.target, EditTarget::Field(_)))
        .then_some(BRAND_ORANGE);

    let table = Table::new(rows, widths)
        .header(header)
        .block(titled(" Inputs ", border));
    frame.render_widget(table, area);
}

fn draw_results(frame: &mut Frame, area: Rect, app: &App, evaluation: &ProjectEvaluation) {
    let rows = Layout::vertical([
        Constraint::Length(8), // FAR + finance
        Constraint::Min(6),    // Bertaud + grading
    ])
    .split(area);
    let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    draw_far_panel(frame, top[0], evaluation);
    draw_finance_panel(frame, top[1], evaluation);
    draw_model_panel(frame, bottom[0], app, evaluation);
    draw_grade_panel(frame, bottom[1], app);
}

fn draw_far_panel(frame: &mut Frame, area: Rect, evaluation: &ProjectEvaluation) {
    let far = &evaluation.far;
    let status_style = match far.status {
        FarStatus::Optimal => GOOD_STYLE,
        FarStatus::Under => WARN_STYLE,
        FarStatus::Over => BAD_STYLE,
    };

    let lines = vec![
        metric("Proposed FAR", format!("{:.2}", far.proposed_far)),
        metric("Theoretical FAR", format!("{:.2}", far.theoretical_far)),
        metric("Legal max FAR", format!("{:.2}", far.legal_max_far)),
        metric("Efficiency", format!("{:.2}", far.efficiency_score)),
        Line::from(vec![
            Span::styled("Status          ", LABEL_STYLE),
            Span::styled(far.status.as_str(), status_style),
            Span::styled(format!("  {}", far.status.thai_label()), LABEL_STYLE),
        ]),
        metric("Land area", format!("{:.0} m²", far.land_size_sqm)),
    ];

    let panel = Paragraph::new(lines).block(titled(" FAR ", None));
    frame.render_widget(panel, area);
}

fn draw_finance_panel(frame: &mut Frame, area: Rect, evaluation: &ProjectEvaluation) {
    let fin = &evaluation.financial;
    let npv_style = if fin.npv > 0.0 { GOOD_STYLE } else { BAD_STYLE };
    let cost_style = match fin.cost_status {
        CostStatus::Pass => GOOD_STYLE,
        CostStatus::Anomaly => BAD_STYLE,
    };
    let roa_style = match fin.roa_status {
        RoaStatus::Target => GOOD_STYLE,
        RoaStatus::Low => WARN_STYLE,
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("30-yr NPV       ", LABEL_STYLE),
            Span::styled(format!("{:.0} THB", fin.npv), npv_style),
        ]),
        metric(
            "Standard cost",
            format!("{:.0} THB/m² (×{:.2})", fin.standard_cost, fin.regional_factor),
        ),
        Line::from(vec![
            Span::styled("Cost deviation  ", LABEL_STYLE),
            Span::raw(format!("{:+.1}% ", fin.cost_deviation_percent())),
            Span::styled(fin.cost_status.as_str(), cost_style),
        ]),
        Line::from(vec![
            Span::styled("ROA             ", LABEL_STYLE),
            Span::raw(format!("{:.2}% ", fin.roa_percent())),
            Span::styled(fin.roa_status.as_str(), roa_style),
        ]),
        metric(
            "Breakeven",
            fin.breakeven_years
                .map_or_else(|| "never".to_string(), |years| format!("{years:.1} years")),
        ),
        metric(
            "NPV ±2 pts",
            format!(
                "{:.0} / {:.0} THB",
                fin.sensitivity.minus_two_npv, fin.sensitivity.plus_two_npv
            ),
        ),
    ];

    let panel = Paragraph::new(lines).block(titled(" Financial audit ", None));
    frame.render_widget(panel, area);
}

fn draw_model_panel(frame: &mut Frame, area: Rect, app: &App, evaluation: &ProjectEvaluation) {
    let gap = &evaluation.gap;
    let mut lines = vec![
        metric("Density band", evaluation.density_band.as_str().to_string()),
        metric("FAR gap", format!("{:+.2}", gap.far_gap)),
        metric(
            "Zoning",
            if gap.is_constrained {
                "constrained".to_string()
            } else {
                "not binding".to_string()
            },
        ),
        Line::from(Span::styled(gap.recommendation.as_str(), LABEL_STYLE)),
    ];

    if let Some(polycentric) = evaluation.polycentric_far {
        lines.push(metric("Polycentric FAR", format!("{polycentric:.2}")));
    }

    if let Some(warning) = &evaluation.gradient_warning {
        lines.push(Line::from(Span::styled(warning.as_str(), WARN_STYLE)));
    }

    if let Some(location) = app.site.location {
        lines.push(Line::from(Span::styled(
            map::view_url(location, 16),
            Style::default().fg(BRAND_ACCENT),
        )));
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(titled(" Bertaud model ", None));
    frame.render_widget(panel, area);
}

fn draw_grade_panel(frame: &mut Frame, area: Rect, app: &App) {
    let blueprint = app.blueprint.as_ref().map_or_else(
        || "no blueprint loaded".to_string(),
        |b| format!("{} ({} page(s))", b.file_name, b.page_count()),
    );

    let mut lines = vec![metric("Blueprint", blueprint)];

    match &app.grade {
        Some(report) => {
            let grade_style = match report.grade {
                LetterGrade::A | LetterGrade::B => GOOD_STYLE,
                LetterGrade::C | LetterGrade::D => WARN_STYLE,
                LetterGrade::F => BAD_STYLE,
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<16}", "Grade"), LABEL_STYLE),
                Span::styled(report.grade.as_str(), grade_style),
                Span::raw(format!(
                    "  {:.1}/100 via {}",
                    report.overall_score, report.provider
                )),
            ]));
            for category in &report.categories {
                lines.push(metric(
                    category.category.label(),
                    format!("{:>3.0}  {}", category.score, category.comment),
                ));
            }
            if !report.summary.is_empty() {
                lines.push(Line::from(Span::styled(report.summary.as_str(), LABEL_STYLE)));
            }
        }
        None => lines.push(Line::from(Span::styled(
            "Press g to grade the blueprint",
            LABEL_STYLE,
        ))),
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(titled(" Blueprint grade ", None));
    frame.render_widget(panel, area);
}

fn draw_notice(frame: &mut Frame, area: Rect, app: &App) {
    let line = match &app.notice {
        Some(Notice::Info(message)) => Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(BRAND_GREEN),
        )),
        Some(Notice::Error(message)) => {
            Line::from(Span::styled(format!(" {message}"), BAD_STYLE))
        }
        None => match &app.edit {
            Some(edit) if edit.target == EditTarget::ApiKey => Line::from(vec![
                Span::styled(format!(" API key for {}: ", app.settings.provider), LABEL_STYLE),
                Span::raw("•".repeat(edit.buffer.chars().count())),
                Span::raw("▏"),
            ]),
            _ => Line::from(""),
        },
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_footer(frame: &mut Frame, area: Rect, help: &str) {
    let footer = Paragraph::new(help)
        .style(Style::default().fg(BRAND_MUTED))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

pub fn draw_report(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(10),   // Report body
        Constraint::Length(1), // Notice
        Constraint::Length(3), // Footer
    ])
    .split(frame.area());

    let header = Paragraph::new(format!(" Report preview: {} ", app.project.project_name))
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let text = app
        .report_text()
        .unwrap_or_else(|| "No report: the current inputs do not evaluate.".to_string());
    let mut lines: Vec<Line> = Vec::new();
    for line in text.lines() {
        match line.strip_prefix(PAGE_BREAK) {
            Some(rest) => {
                lines.push(Line::from(Span::styled("═".repeat(60), LABEL_STYLE)));
                lines.push(Line::from(rest.to_string()));
            }
            None => lines.push(Line::from(line.to_string())),
        }
    }
    let total = lines.len();

    let body = Paragraph::new(lines)
        .scroll((app.report_scroll, 0))
        .block(titled(" Report ", None));
    frame.render_widget(body, chunks[1]);

    let visible_rows = (chunks[1].height as usize).saturating_sub(2);
    if total > visible_rows && chunks[1].height > 2 {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state =
            ScrollbarState::new(total).position(usize::from(app.report_scroll));

        let scrollbar_area = Rect {
            x: chunks[1].x + chunks[1].width - 1,
            y: chunks[1].y + 1,
            width: 1,
            height: chunks[1].height - 2,
        };
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }

    draw_notice(frame, chunks[2], app);
    draw_footer(
        frame,
        chunks[3],
        " Esc Back | ↑↓ Scroll | PgUp/PgDn Page | e Export | q Quit ",
    );
}

fn titled(title: &str, border: Option<Color>) -> Block<'_> {
    let style = border.map_or_else(Style::default, |c| Style::default().fg(c));
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn metric(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<16}"), LABEL_STYLE),
        Span::raw(value),
    ])
}

fn format_value(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    if decimals > 0 || value.abs() < 1_000.0 {
        return text;
    }

    // Group thousands for money and areas.
    let (sign, digits) = text.strip_prefix('-').map_or(("", text.as_str()), |d| ("-", d));
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}
