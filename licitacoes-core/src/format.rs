//! pt-BR display helpers shared by the server pages and the CLI.

use chrono::NaiveDate;

/// Label used for events without a date.
pub const DATA_INDEFINIDA: &str = "Data indefinida";

/// `30/07/2025`
pub fn format_data(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Trim the seconds the backend appends to `time` columns (`14:00:00` → `14:00`).
pub fn format_hora(hora: &str) -> &str {
    let hora = hora.trim();
    match hora.match_indices(':').nth(1) {
        Some((idx, _)) => &hora[..idx],
        None => hora,
    }
}

/// Brazilian real, e.g. `R$ 1.234,56`.
pub fn format_brl(valor: f64) -> String {
    let cents = (valor.abs() * 100.0).round() as u64;
    let reais = (cents / 100).to_string();
    let centavos = cents % 100;

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, ch) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if valor < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{centavos:02}")
}

/// Currency or a dash when the value is absent.
pub fn format_valor(valor: Option<f64>) -> String {
    valor.map(format_brl).unwrap_or_else(|| "-".to_string())
}
