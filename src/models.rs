use serde::Serialize;

const THREAD_LINK_PREFIX: &str = "https://mail.google.com/mail/u/0/#all/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Read-only view of a message returned by the mail source.
#[derive(Debug, Clone, Default)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub headers: Vec<Header>,
}

impl Message {
    /// First header whose name matches `name`, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// The `Message-ID` header, or the provider id when the header is
    /// missing or blank.
    pub fn dedup_key(&self) -> &str {
        match self.header("Message-ID") {
            Some(value) if !value.is_empty() => value,
            _ => &self.id,
        }
    }

    pub fn thread_link(&self) -> String {
        format!("{}{}", THREAD_LINK_PREFIX, self.thread_id)
    }
}

/// One row destined for the sheet. Column order matches `into_row`; the
/// serialized form is what a dry run prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub date: String,
    pub company: String,
    pub role: String,
    pub sender: String,
    pub subject: String,
    pub thread_link: String,
    pub dedup_key: String,
}

impl Record {
    pub fn into_row(self) -> Vec<String> {
        vec![
            self.date,
            self.company,
            self.role,
            self.sender,
            self.subject,
            self.thread_link,
            self.dedup_key,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(headers: &[(&str, &str)]) -> Message {
        Message {
            id: "18c0ffee".to_string(),
            thread_id: "18c0ffee".to_string(),
            headers: headers.iter().map(|(n, v)| Header::new(*n, *v)).collect(),
        }
    }

    #[test]
    fn header_lookup_ignores_case() {
        let msg = message(&[("SUBJECT", "Hello"), ("from", "a@b.com")]);
        assert_eq!(msg.header("Subject"), Some("Hello"));
        assert_eq!(msg.header("From"), Some("a@b.com"));
        assert_eq!(msg.header("Date"), None);
    }

    #[test]
    fn dedup_key_prefers_message_id_header() {
        let msg = message(&[("Message-Id", "<abc@mail.example.com>")]);
        assert_eq!(msg.dedup_key(), "<abc@mail.example.com>");
    }

    #[test]
    fn dedup_key_falls_back_to_message_id() {
        assert_eq!(message(&[]).dedup_key(), "18c0ffee");
        assert_eq!(message(&[("Message-ID", "")]).dedup_key(), "18c0ffee");
    }

    fn sample_record() -> Record {
        Record {
            date: "2025-10-06 14:03".to_string(),
            company: "Acme".to_string(),
            role: "Engineer".to_string(),
            sender: "Acme <jobs@acme.com>".to_string(),
            subject: "Thanks".to_string(),
            thread_link: message(&[]).thread_link(),
            dedup_key: "<k@acme.com>".to_string(),
        }
    }

    #[test]
    fn record_row_keeps_key_in_seventh_column() {
        let row = sample_record().into_row();
        assert_eq!(row.len(), 7);
        assert_eq!(row[5], "https://mail.google.com/mail/u/0/#all/18c0ffee");
        assert_eq!(row[6], "<k@acme.com>");
    }

    #[test]
    fn record_serializes_with_field_names() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["company"], "Acme");
        assert_eq!(json["dedup_key"], "<k@acme.com>");
        assert_eq!(json.as_object().unwrap().len(), 7);
    }
}
