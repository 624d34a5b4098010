//! Best-effort company and role extraction from confirmation emails.
//!
//! Each field is derived by an ordered table of independent rules. A rule
//! looks at the subject and sender and either produces a value or passes;
//! the first non-empty value wins and a field with no match stays empty.

use regex::Regex;
use std::sync::OnceLock;

/// A single extraction rule over `(subject, sender)`.
pub type Rule = fn(&str, &str) -> Option<String>;

/// Role rules, most specific first.
pub const ROLE_RULES: &[Rule] = &[quoted_role, role_after_for];

/// Company rules, most specific first.
pub const COMPANY_RULES: &[Rule] = &[sender_display_name, company_after_at];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub company: String,
    pub role: String,
}

pub fn extract(subject: &str, sender: &str) -> Extracted {
    Extracted {
        company: first_match(COMPANY_RULES, subject, sender),
        role: first_match(ROLE_RULES, subject, sender),
    }
}

fn first_match(rules: &[Rule], subject: &str, sender: &str) -> String {
    rules
        .iter()
        .filter_map(|rule| rule(subject, sender))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

fn re_quoted() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["“](.+?)["”]"#).unwrap())
}

fn re_for() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)for (.+?)(?: at| with|$)").unwrap())
}

fn re_at() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i) at ([^-–|]+)").unwrap())
}

fn re_angle_address() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<.*?>").unwrap())
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `Thanks for applying to "Backend Engineer"` -> `Backend Engineer`.
fn quoted_role(subject: &str, _sender: &str) -> Option<String> {
    capture(re_quoted(), subject)
}

/// `Your application for Data Analyst at Initech` -> `Data Analyst`.
fn role_after_for(subject: &str, _sender: &str) -> Option<String> {
    capture(re_for(), subject)
}

/// `Acme Careers <careers@acme.com>` -> `Acme Careers`.
///
/// Bare addresses and no-reply senders carry no company name.
fn sender_display_name(_subject: &str, sender: &str) -> Option<String> {
    let name = re_angle_address().replace_all(sender, "");
    let name = name.trim();
    if name.is_empty() || name.contains('@') || name.to_lowercase().starts_with("no-reply") {
        return None;
    }
    Some(name.to_string())
}

/// `... at Globex | Careers` -> `Globex`.
fn company_after_at(subject: &str, _sender: &str) -> Option<String> {
    capture(re_at(), subject).map(|company| company.trim_matches([' ', '.']).to_string())
}
