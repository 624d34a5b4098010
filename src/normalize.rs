use chrono::{DateTime, Local};

use crate::datetime::local_timestamp;
use crate::extract::extract;
use crate::models::{Message, Record};

/// Builds the sheet record for `message`, stamping unparseable dates with
/// the current local time.
pub fn normalize(message: &Message) -> Record {
    normalize_at(message, Local::now())
}

pub fn normalize_at(message: &Message, now: DateTime<Local>) -> Record {
    let subject = message.header("Subject").unwrap_or_default();
    let sender = message.header("From").unwrap_or_default();
    let date = local_timestamp(message.header("Date").unwrap_or_default(), now);
    let fields = extract(subject, sender);

    Record {
        date,
        company: fields.company,
        role: fields.role,
        sender: sender.to_string(),
        subject: subject.to_string(),
        thread_link: message.thread_link(),
        dedup_key: message.dedup_key().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::RECORD_DATE_FORMAT;
    use crate::models::Header;
    use chrono::TimeZone;

    fn confirmation(date: &str) -> Message {
        Message {
            id: "msg-1".to_string(),
            thread_id: "thread-9".to_string(),
            headers: vec![
                Header::new("subject", "Your application for Software Engineer at Globex"),
                Header::new("FROM", "no-reply@globex.com"),
                Header::new("Date", date),
                Header::new("Message-ID", "<abc123@globex.com>"),
            ],
        }
    }

    #[test]
    fn builds_full_record() {
        let record = normalize(&confirmation("Mon, 6 Oct 2025 14:03:27 +0000"));
        let expected_date = Local
            .from_utc_datetime(
                &chrono::NaiveDate::from_ymd_opt(2025, 10, 6)
                    .unwrap()
                    .and_hms_opt(14, 3, 27)
                    .unwrap(),
            )
            .format(RECORD_DATE_FORMAT)
            .to_string();

        assert_eq!(record.date, expected_date);
        assert_eq!(record.company, "Globex");
        assert_eq!(record.role, "Software Engineer");
        assert_eq!(record.sender, "no-reply@globex.com");
        assert_eq!(record.subject, "Your application for Software Engineer at Globex");
        assert_eq!(record.thread_link, "https://mail.google.com/mail/u/0/#all/thread-9");
        assert_eq!(record.dedup_key, "<abc123@globex.com>");
    }

    #[test]
    fn unparseable_date_uses_processing_time() {
        let now = Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let record = normalize_at(&confirmation("sometime last week"), now);
        assert_eq!(record.date, "2026-03-14 09:26");
    }

    #[test]
    fn missing_headers_yield_empty_fields() {
        let now = Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 0).unwrap();
        let message = Message {
            id: "bare".to_string(),
            thread_id: "t".to_string(),
            headers: Vec::new(),
        };
        let record = normalize_at(&message, now);
        assert_eq!(record.subject, "");
        assert_eq!(record.sender, "");
        assert_eq!(record.company, "");
        assert_eq!(record.role, "");
        assert_eq!(record.date, "2026-03-14 09:26");
        assert_eq!(record.dedup_key, "bare");
    }
}
