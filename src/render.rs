// src/render.rs
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PipelineConfig;
use crate::models::{FranchiseSummary, Lexicon, SentimentLabel};
use crate::sentiment::{sentiment_label, SentimentIndex};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\W_]+").unwrap());

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped HTML with strongly weighted words wrapped for highlighting.
pub fn highlight_text(text: &str, lex: &Lexicon) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in WORD.find_iter(text) {
        out.push_str(&escape_html(&text[last..m.start()]));
        let tok = escape_html(m.as_str());
        let w = lex.weight(m.as_str());
        if w >= 1.0 {
            out.push_str(&format!("<span class=\"hi-pos\">{}</span>", tok));
        } else if w <= -1.0 {
            out.push_str(&format!("<span class=\"hi-neg\">{}</span>", tok));
        } else {
            out.push_str(&tok);
        }
        last = m.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

/// Compact "1.2M" style figure for the digest.
pub fn short_number(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{:.0}", v)
    }
}

fn label_mark(label: Option<SentimentLabel>) -> &'static str {
    match label {
        Some(SentimentLabel::Positive) => "+",
        Some(SentimentLabel::Negative) => "−",
        Some(SentimentLabel::Neutral) => "=",
        None => "?",
    }
}

pub fn render_digest_markdown(
    summaries: &[FranchiseSummary],
    sentiment: &SentimentIndex,
    cfg: &PipelineConfig,
) -> String {
    let mut md = String::new();
    md.push_str("# Franchise Viewing Digest\n\n");
    md.push_str(&format!(
        "Top {} franchises by total viewing. Season marks: `+` positive, `=` neutral, `−` negative, `?` no sentiment.\n\n",
        summaries.len()
    ));

    if summaries.is_empty() {
        md.push_str("_No franchises survived filtering._\n");
        return md;
    }

    md.push_str("| # | Franchise | Total | Latest share | Seasons |\n");
    md.push_str("|---|-----------|-------|--------------|---------|\n");
    for (i, fr) in summaries.iter().enumerate() {
        let seasons: Vec<String> = fr
            .parts
            .iter()
            .map(|p| {
                let label = sentiment
                    .lookup(&fr.franchise, p.season_index)
                    .map(|e| sentiment_label(e.avg, cfg.neutral_epsilon));
                format!("S{}{} {}", p.season_index, label_mark(label), short_number(p.views))
            })
            .collect();
        md.push_str(&format!(
            "| {} | {} | {} | {:.0}% | {} |\n",
            i + 1,
            fr.franchise.replace('|', "\\|"),
            short_number(fr.total),
            fr.latest_share * 100.0,
            seasons.join(", ")
        ));
    }
    md
}
