//! Suppressed-warning maintenance for `<NoWarn>`
//!
//! Codes compare without a `CS` prefix or leading zeros, so `CS1591`, `1591`
//! and `01591` are the same code.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static NO_WARN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<open><NoWarn(?:\s[^>]*)?>)(?P<codes>[^<]*)(?P<close></NoWarn>)")
        .expect("NoWarn pattern must compile")
});

static PROPERTY_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<PropertyGroup(?:\s[^>]*[^/>])?>(?P<indent>\r?\n[ \t]*)?")
        .expect("PropertyGroup pattern must compile")
});

fn normalize(code: &str) -> String {
    let code = code.trim();
    let code = code
        .strip_prefix("CS")
        .or_else(|| code.strip_prefix("cs"))
        .unwrap_or(code);
    let trimmed = code.trim_start_matches('0');
    if trimmed.is_empty() && !code.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_ascii_uppercase()
    }
}

/// Codes from `required` not already present in `existing`, deduplicated
fn missing_codes<'a>(existing: &str, required: &'a [String]) -> Vec<&'a str> {
    let mut present: Vec<String> = existing
        .split([';', ','])
        .filter(|c| !c.trim().is_empty())
        .map(normalize)
        .collect();
    let mut missing = Vec::new();
    for code in required {
        let code = code.trim();
        if code.is_empty() {
            continue;
        }
        let key = normalize(code);
        if !present.contains(&key) {
            present.push(key);
            missing.push(code);
        }
    }
    missing
}

fn merge(existing: &str, missing: &[&str]) -> String {
    let separator = if existing.contains(',') && !existing.contains(';') {
        ","
    } else {
        ";"
    };
    let base = existing.trim_end_matches([';', ',', ' ', '\t']);
    if base.trim().is_empty() {
        missing.join(separator)
    } else {
        format!("{base}{separator}{}", missing.join(separator))
    }
}

/// Ensure every code in `required` appears in the descriptor's `<NoWarn>`
///
/// Missing codes are appended to each existing `<NoWarn>` element. Without
/// one, an element is inserted into the first `<PropertyGroup>`. Returns
/// `None` when nothing needed to change.
#[must_use]
pub fn ensure_suppressed(text: &str, required: &[String]) -> Option<String> {
    if required.iter().all(|c| c.trim().is_empty()) {
        return None;
    }

    if NO_WARN.is_match(text) {
        let mut changed = false;
        let out = NO_WARN.replace_all(text, |caps: &Captures<'_>| {
            let codes = &caps["codes"];
            let missing = missing_codes(codes, required);
            if missing.is_empty() {
                caps[0].to_string()
            } else {
                changed = true;
                format!("{}{}{}", &caps["open"], merge(codes, &missing), &caps["close"])
            }
        });
        return changed.then(|| out.into_owned());
    }

    let Some(caps) = PROPERTY_GROUP.captures(text) else {
        tracing::debug!("descriptor has no PropertyGroup; cannot add NoWarn");
        return None;
    };
    let whole = caps.get(0)?;
    let indent = caps.name("indent").map_or("", |m| m.as_str());
    let element = format!("<NoWarn>{}</NoWarn>", merge("", &missing_codes("", required)));

    let mut out = String::with_capacity(text.len() + element.len() + indent.len());
    out.push_str(&text[..whole.end()]);
    out.push_str(&element);
    if indent.is_empty() {
        out.push_str(&text[whole.end()..]);
    } else {
        out.push_str(indent);
        out.push_str(text[whole.end()..].trim_start_matches([' ', '\t']));
    }
    Some(out)
}
