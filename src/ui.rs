use crate::format::{format_brl, format_count, format_count_value, format_currency};
use crate::models::{CohortRow, KpiValues};
use crate::state::Snapshot;
use crate::summary::breakdown;
use crate::view::{KeyMap, Projection, STUDENT_KEYS, TEACHER_KEYS, View};
use std::fmt::Write;

const MISSING_NAME: &str = "Sem Nome";

/// Formatted values for the four KPI cards. Reads only through the key map.
pub fn kpi_values(projection: &Projection<'_>) -> KpiValues {
    let totals = &projection.totals;
    let keys = projection.keys;
    KpiValues {
        paid: format_currency(totals.get(keys.paid)),
        missing: format_currency(totals.get(keys.missing)),
        people_confirmed: format_count(totals.get(keys.people_confirmed)),
        companions: format_count(totals.get(keys.companions)),
    }
}

pub fn render_dashboard(title: &str, snapshot: &Snapshot, projection: &Projection<'_>) -> String {
    let mut body = String::new();
    body.push_str(&render_header(title, projection.view));
    body.push_str(&render_cards(projection));

    if projection.view == View::Consolidated {
        body.push_str(&render_summary_panel(snapshot));
    } else {
        let _ = write!(
            body,
            r#"<section class="detail">{}{}</section>"#,
            render_chart(&projection.line_items, projection.keys),
            render_table(&projection.line_items, &projection.totals, projection.keys)
        );
    }

    let _ = write!(
        body,
        r#"<p class="hint">Sincronizado em {}.</p>"#,
        snapshot.fetched_at.format("%d/%m/%Y %H:%M")
    );

    render_page(title, "", &body)
}

pub fn render_loading(title: &str) -> String {
    let body = r#"<div class="notice"><div class="spinner"></div><p>Sincronizando com Google Sheets...</p></div>"#;
    render_page(title, r#"<meta http-equiv="refresh" content="1" />"#, body)
}

pub fn render_error(title: &str) -> String {
    let body = r#"<div class="notice error"><p>Erro ao carregar dados.</p></div>"#;
    render_page(title, "", body)
}

fn render_page(title: &str, head_extra: &str, body: &str) -> String {
    PAGE_HTML
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{HEAD}}", head_extra)
        .replace("{{BODY}}", body)
}

fn render_header(title: &str, active: View) -> String {
    let mut tabs = String::new();
    for view in View::ALL {
        let class = if view == active { "tab active" } else { "tab" };
        let _ = write!(
            tabs,
            r#"<a class="{class}" href="/?view={}" aria-selected="{}">{}</a>"#,
            view.as_str(),
            view == active,
            view.tab_label()
        );
    }

    format!(
        r#"<header><div><h1>{}</h1><p class="subtitle">Acompanhamento em tempo real</p></div><nav class="tabs" role="tablist">{tabs}</nav></header>"#,
        escape_html(title)
    )
}

fn render_cards(projection: &Projection<'_>) -> String {
    let keys = projection.keys;
    let kpis = kpi_values(projection);

    let mut cards = String::from(r#"<section class="cards">"#);
    cards.push_str(&card("paid", "Arrecadado", &kpis.paid, keys.kpi_money_label));
    cards.push_str(&card("missing", "Faltante", &kpis.missing, keys.kpi_money_label));
    cards.push_str(&card(
        "people",
        keys.kpi_people_title,
        &kpis.people_confirmed,
        keys.kpi_people_label,
    ));
    cards.push_str(&card(
        "companions",
        "Total Acompanhantes",
        &kpis.companions,
        keys.kpi_companion_label,
    ));
    cards.push_str("</section>");
    cards
}

fn card(tone: &str, title: &str, value: &str, subtitle: &str) -> String {
    let subtitle = if subtitle.is_empty() {
        String::new()
    } else {
        format!(r#"<span class="card-subtitle">{}</span>"#, escape_html(subtitle))
    };
    format!(
        r#"<div class="card {tone}"><span class="card-title">{}</span><span class="card-value">{}</span>{subtitle}</div>"#,
        escape_html(title),
        escape_html(value)
    )
}

fn row_name(row: &CohortRow, keys: &KeyMap) -> String {
    match row.get(keys.name).and_then(|value| value.as_str()) {
        Some(name) if !name.is_empty() => escape_html(name),
        _ => MISSING_NAME.to_string(),
    }
}

fn render_chart(items: &[&CohortRow], keys: &KeyMap) -> String {
    const WIDTH: f64 = 360.0;
    const LABEL_WIDTH: f64 = 96.0;
    const ROW_HEIGHT: f64 = 52.0;
    const BAR_HEIGHT: f64 = 16.0;
    const TOP: f64 = 8.0;

    let mut out = String::from(r#"<div class="panel chart"><h3>Comparativo Visual</h3>"#);
    if items.is_empty() {
        out.push_str(r#"<p class="empty">Nenhum grupo para exibir.</p></div>"#);
        return out;
    }

    let max = items
        .iter()
        .flat_map(|row| [row.number(keys.paid), row.number(keys.missing)])
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let usable = WIDTH - LABEL_WIDTH - 12.0;
    let height = TOP * 2.0 + ROW_HEIGHT * items.len() as f64;

    let _ = write!(
        out,
        r#"<svg viewBox="0 0 {WIDTH} {height}" role="img" aria-label="Pago e faltante por grupo">"#
    );
    for (index, row) in items.iter().enumerate() {
        let y = TOP + ROW_HEIGHT * index as f64;
        let paid = row.number(keys.paid).max(0.0);
        let missing = row.number(keys.missing).max(0.0);
        let _ = write!(
            out,
            r#"<text class="bar-label" x="{x:.1}" y="{ly:.1}" text-anchor="end">{name}</text>"#,
            x = LABEL_WIDTH - 8.0,
            ly = y + BAR_HEIGHT + 4.0,
            name = row_name(row, keys)
        );
        let _ = write!(
            out,
            r#"<rect class="bar-paid" x="{LABEL_WIDTH}" y="{y:.1}" width="{w:.1}" height="{BAR_HEIGHT}" rx="4"><title>Pago: {v}</title></rect>"#,
            w = usable * paid / max,
            v = format_brl(paid)
        );
        let _ = write!(
            out,
            r#"<rect class="bar-missing" x="{LABEL_WIDTH}" y="{my:.1}" width="{w:.1}" height="{BAR_HEIGHT}" rx="4"><title>Faltante: {v}</title></rect>"#,
            my = y + BAR_HEIGHT + 4.0,
            w = usable * missing / max,
            v = format_brl(missing)
        );
    }
    out.push_str("</svg>");
    out.push_str(
        r#"<div class="legend"><span class="swatch paid"></span>Pago<span class="swatch missing"></span>Faltante</div></div>"#,
    );
    out
}

fn render_table(items: &[&CohortRow], totals: &CohortRow, keys: &KeyMap) -> String {
    let mut out = String::from(
        r#"<div class="panel table"><h3>Detalhamento por Grupo</h3><table><thead><tr><th>Grupo</th><th class="num">Confirmados</th><th class="num">Acompanhantes</th><th class="money">Pago</th><th class="money missing">Faltante</th></tr></thead><tbody>"#,
    );
    for row in items {
        let _ = write!(
            out,
            r#"<tr><td>{}</td><td class="num">{}</td><td class="num">{}</td><td class="money paid">{}</td><td class="money missing">{}</td></tr>"#,
            row_name(row, keys),
            format_count(row.get(keys.people_confirmed)),
            format_count(row.get(keys.companions)),
            format_currency(row.get(keys.paid)),
            format_currency(row.get(keys.missing))
        );
    }
    let _ = write!(
        out,
        r#"</tbody><tfoot><tr><td>TOTAL POR ABA</td><td class="num">{}</td><td class="num">{}</td><td class="money paid">{}</td><td class="money missing">{}</td></tr></tfoot></table></div>"#,
        format_count(totals.get(keys.people_confirmed)),
        format_count(totals.get(keys.companions)),
        format_currency(totals.get(keys.paid)),
        format_currency(totals.get(keys.missing))
    );
    out
}

enum Line {
    Total,
    Subtotal,
}

fn money_line(out: &mut String, line: Line, tone: &str, label: &str, amount: f64) {
    let class = match line {
        Line::Total => "line total",
        Line::Subtotal => "line subtotal",
    };
    let _ = write!(
        out,
        r#"<div class="{class}"><span>{label}</span><span class="{tone}">{}</span></div>"#,
        format_brl(amount)
    );
}

fn count_line(out: &mut String, bold: bool, label: &str, count: f64) {
    let class = if bold { "line total" } else { "line" };
    let _ = write!(
        out,
        r#"<div class="{class}"><span>{label}</span><span>{}</span></div>"#,
        format_count_value(count)
    );
}

fn render_summary_panel(snapshot: &Snapshot) -> String {
    let summary = snapshot.summary.unwrap_or_default();
    let teachers = breakdown(snapshot.data.teacher_totals(), &TEACHER_KEYS);
    let students = breakdown(snapshot.data.student_totals(), &STUDENT_KEYS);

    let mut out =
        String::from(r#"<section class="panel summary"><h2>Resumo Consolidado Detalhado</h2>"#);

    money_line(&mut out, Line::Total, "paid", "Arrecadado Total", summary.total_paid);
    money_line(&mut out, Line::Subtotal, "muted", "Arrecadado (Professores)", teachers.paid);
    money_line(&mut out, Line::Subtotal, "muted", "Arrecadado (Alunos)", students.paid);

    money_line(&mut out, Line::Total, "missing", "Faltante Total", summary.total_missing);
    money_line(&mut out, Line::Subtotal, "missing", "Faltante (Professores)", teachers.missing);
    money_line(&mut out, Line::Subtotal, "missing", "Faltante (Alunos)", students.missing);

    money_line(&mut out, Line::Total, "expected", "Esperado Total", summary.total_expected);
    money_line(&mut out, Line::Subtotal, "muted", "Esperado (Professores)", teachers.expected);
    money_line(&mut out, Line::Subtotal, "muted", "Esperado (Alunos)", students.expected);

    out.push_str("<hr />");
    count_line(
        &mut out,
        false,
        "Total de Pessoas (Base: Prof + Aluno)",
        summary.confirmed_base,
    );
    count_line(&mut out, false, "Total de Acompanhantes", summary.total_companions);
    count_line(&mut out, true, "PESSOAS TOTAIS GERAIS", summary.grand_total_people);

    out.push_str("</section>");
    out
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-br">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  {{HEAD}}
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f8fafc;
      --ink: #1e293b;
      --muted: #64748b;
      --line: #e2e8f0;
      --paid: #10b981;
      --missing: #f43f5e;
      --people: #3b82f6;
      --companions: #a855f7;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 32px 18px 48px;
    }

    main {
      width: min(1120px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 28px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: flex-end;
      gap: 16px;
      border-bottom: 1px solid var(--line);
      padding-bottom: 24px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.6rem, 3vw, 2rem);
    }

    .subtitle {
      margin: 4px 0 0;
      color: var(--muted);
    }

    .tabs {
      display: flex;
      gap: 4px;
      padding: 4px;
      background: white;
      border: 1px solid var(--line);
      border-radius: 10px;
    }

    .tab {
      padding: 8px 18px;
      border-radius: 8px;
      color: var(--muted);
      text-decoration: none;
      font-size: 0.9rem;
    }

    .tab.active {
      color: #2563eb;
      font-weight: 700;
      box-shadow: 0 1px 4px rgba(15, 23, 42, 0.12);
    }

    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }

    .card {
      background: white;
      border: 1px solid var(--line);
      border-top: 4px solid var(--muted);
      border-radius: 12px;
      padding: 18px;
      display: grid;
      gap: 6px;
    }

    .card.paid { border-top-color: var(--paid); }
    .card.missing { border-top-color: var(--missing); }
    .card.people { border-top-color: var(--people); }
    .card.companions { border-top-color: var(--companions); }

    .card-title {
      font-size: 0.75rem;
      font-weight: 600;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: #94a3b8;
    }

    .card-value {
      font-size: 1.5rem;
      font-weight: 700;
    }

    .card-subtitle {
      font-size: 0.85rem;
      color: var(--muted);
    }

    .detail {
      display: grid;
      grid-template-columns: minmax(260px, 1fr) minmax(0, 2fr);
      gap: 24px;
    }

    .panel {
      background: white;
      border: 1px solid var(--line);
      border-radius: 12px;
      padding: 20px;
      overflow-x: auto;
    }

    .panel h2, .panel h3 {
      margin: 0 0 16px;
    }

    .bar-label {
      font-size: 11px;
      fill: var(--muted);
    }

    .bar-paid { fill: var(--paid); }
    .bar-missing { fill: var(--missing); }

    .legend {
      display: flex;
      align-items: center;
      gap: 8px;
      font-size: 0.8rem;
      color: var(--muted);
    }

    .swatch {
      width: 12px;
      height: 12px;
      border-radius: 3px;
    }

    .swatch.paid { background: var(--paid); }
    .swatch.missing { background: var(--missing); margin-left: 12px; }

    table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.9rem;
    }

    th {
      text-align: left;
      text-transform: uppercase;
      font-size: 0.72rem;
      color: var(--muted);
      background: var(--bg);
    }

    th, td {
      padding: 12px 16px;
      border-bottom: 1px solid var(--line);
    }

    tfoot td {
      font-weight: 700;
      background: #f1f5f9;
    }

    .num { text-align: center; }
    .money { text-align: right; }
    .paid { color: #059669; }
    .missing { color: #e11d48; }
    .expected { color: #2563eb; }
    .muted { color: #475569; }

    .summary .line {
      display: flex;
      justify-content: space-between;
      padding: 6px 0;
      font-size: 0.9rem;
    }

    .summary .line.total {
      font-weight: 700;
      font-size: 1rem;
      border-top: 1px solid var(--line);
      padding-top: 10px;
    }

    .summary .line.subtotal {
      margin-left: 24px;
      opacity: 0.85;
    }

    .notice {
      min-height: 60vh;
      display: grid;
      place-items: center;
      align-content: center;
      gap: 12px;
      color: var(--muted);
    }

    .notice.error {
      color: #ef4444;
    }

    .spinner {
      width: 32px;
      height: 32px;
      border: 3px solid var(--line);
      border-top-color: #2563eb;
      border-radius: 50%;
      animation: spin 900ms linear infinite;
    }

    .hint, .empty {
      margin: 0;
      color: var(--muted);
      font-size: 0.85rem;
    }

    @keyframes spin {
      to {
        transform: rotate(360deg);
      }
    }

    @media (max-width: 800px) {
      .detail {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <main>
{{BODY}}
  </main>
</body>
</html>
"#;
