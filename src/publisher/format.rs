//! Message text for draw results.

use chrono::Local;
use html_escape::encode_text;

use crate::domain::DrawResult;

pub const ANNOUNCEMENT_HEADER: &str = "🎰 NUOVA ESTRAZIONE DEL LOTTO!";
pub const NO_RESULTS: &str = "Nessun risultato disponibile al momento. Riprova più tardi.";

const NAME_WIDTH: usize = 10;

/// Render a result as HTML-mode message text. Entries keep their order.
pub fn format_results(draw: &DrawResult, source_name: &str) -> String {
    let mut lines = vec![
        "LOTTO - Risultati Ultima Estrazione".to_string(),
        String::new(),
        format!("Data: {}", draw.draw_date().format("%d/%m/%Y")),
    ];
    if let Some(number) = draw.draw_number() {
        lines.push(format!("Estrazione N: {}", number));
    }
    lines.push(String::new());

    let width = draw
        .entries()
        .iter()
        .map(|e| e.category.chars().count())
        .max()
        .unwrap_or(0)
        .max(NAME_WIDTH);

    let table = draw
        .entries()
        .iter()
        .map(|entry| {
            let numbers = entry
                .numbers
                .iter()
                .map(|n| format!("{:>2}", n))
                .collect::<Vec<_>>()
                .join(" ");
            format!(
                "{}: {}",
                encode_text(&format!("{:<width$}", entry.category)),
                numbers
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    lines.push(format!("<pre>{}</pre>", table));

    lines.push(String::new());
    lines.push(format!("Fonte: {}", encode_text(source_name)));
    lines.push(format!(
        "Aggiornato: {}",
        draw.fetched_at()
            .with_timezone(&Local)
            .format("%d/%m/%Y %H:%M:%S")
    ));

    lines.join("\n")
}

/// Text for a scheduled channel post.
pub fn format_announcement(draw: &DrawResult, source_name: &str) -> String {
    format!("{}\n\n{}", ANNOUNCEMENT_HEADER, format_results(draw, source_name))
}
