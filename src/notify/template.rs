use super::{AlertContent, AlertEmail};
use crate::models::RiskLabel;

/// Items longer than this many characters are cut and suffixed with "...".
pub const ITEM_CHAR_LIMIT: usize = 400;

/// Paragraphs and steps shown per list.
pub const MAX_ITEMS: usize = 3;

const NO_EXPLANATION_ITEM: &str = "No detailed explanation available.";
const NO_STEPS_ITEM: &str = "Consult a doctor for personalized advice.";

/// Banner colour and emoji for a risk label.
pub fn risk_style(risk: RiskLabel) -> (&'static str, &'static str) {
    match risk {
        RiskLabel::Good => ("#4CAF50", "🟢"),
        RiskLabel::Fair => ("#FFC107", "🟠"),
        RiskLabel::Bad => ("#F44336", "🔴"),
        RiskLabel::Unknown => ("#9E9E9E", "⚪"),
    }
}

pub fn render_subject(risk: RiskLabel) -> String {
    let (_, emoji) = risk_style(risk);
    format!("{emoji} Smart Health Alert: {risk} Risk Detected")
}

pub fn render_alert(content: &AlertContent<'_>) -> AlertEmail {
    AlertEmail {
        to: content.recipient.to_string(),
        subject: render_subject(content.risk),
        html: render_html(content),
    }
}

pub fn render_html(content: &AlertContent<'_>) -> String {
    let (color, emoji) = risk_style(content.risk);
    let risk = content.risk.as_str();
    let name = escape_html(content.display_name);

    let paragraphs: Vec<&str> = content
        .explanation
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let explanation_items = list_items(&paragraphs, NO_EXPLANATION_ITEM);

    let steps: Vec<&str> = content.next_steps.iter().map(String::as_str).collect();
    let step_items = list_items(&steps, NO_STEPS_ITEM);

    format!(
        r#"<html>
<body style="font-family: 'Segoe UI', Arial, sans-serif; margin:0; padding:0; background-color:#f5f7fa;">
  <div style="max-width:600px; margin:30px auto; background:#fff; border-radius:10px; box-shadow:0 2px 6px rgba(0,0,0,0.1); overflow:hidden;">
    <div style="background:{color}; color:white; text-align:center; padding:16px 20px; font-size:20px; font-weight:bold;">
      {emoji} Health Risk Level: {risk}
    </div>
    <div style="padding:20px;">
      <p>Dear {name},</p>
      <p>Our system has detected a <strong>{risk}</strong> health risk based on your recent vitals.</p>
      <h3 style="color:{color}; margin-top:20px;">🧠 Results Explanation</h3>
      <ul style="line-height:1.5; color:#333;">
{explanation_items}
      </ul>
      <h3 style="color:{color}; margin-top:20px;">💡 Recommended Next Steps</h3>
      <ul style="line-height:1.5; color:#333;">
{step_items}
      </ul>
      <p style="margin-top:30px; color:#666; font-size:14px;">
        Stay safe and healthy,<br>
        <strong>Smart Health Assistant</strong>
      </p>
    </div>
  </div>
</body>
</html>"#
    )
}

fn list_items(items: &[&str], empty: &str) -> String {
    let rendered: Vec<String> = items
        .iter()
        .take(MAX_ITEMS)
        .map(|item| format!("        <li>{}</li>", escape_html(&shorten(item, ITEM_CHAR_LIMIT))))
        .collect();
    if rendered.is_empty() {
        format!("        <li>{empty}</li>")
    } else {
        rendered.join("\n")
    }
}

/// Cut `text` to `limit` characters, appending "..." when anything was dropped.
pub fn shorten(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit).collect();
    cut.push_str("...");
    cut
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
