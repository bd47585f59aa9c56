use super::{
    container_failure, resolve_field, split_tags, FileParser, ParseOutcome, RawRecord,
};
use crate::domain::report::snippet;
use crate::utils::error::{IntakeError, Result};
use roxmltree::{Document, Node, ParsingOptions};
use std::collections::BTreeSet;

const TICKET_TAGS: [&str; 2] = ["ticket", "Ticket"];
const TAG_ELEMENT: &str = "tag";

/// Collects `<ticket>` elements wherever they sit in the document, usually
/// under a `<tickets>` container.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

impl XmlParser {
    pub fn new() -> Self {
        Self
    }

    fn text_content(node: Node<'_, '_>) -> String {
        node.descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect()
    }

    fn ticket_nodes<'a, 'input>(document: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
        TICKET_TAGS
            .iter()
            .map(|name| {
                document
                    .descendants()
                    .filter(|n| n.is_element() && n.tag_name().name() == *name)
                    .collect::<Vec<_>>()
            })
            .find(|nodes| !nodes.is_empty())
            .unwrap_or_default()
    }

    fn tags(element: Node<'_, '_>) -> BTreeSet<String> {
        let nested: BTreeSet<String> = element
            .children()
            .filter(|n| n.is_element() && n.tag_name().name().eq_ignore_ascii_case(TAG_ELEMENT))
            .map(|n| Self::text_content(n).trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();

        if nested.is_empty() {
            split_tags(&Self::text_content(element))
        } else {
            nested
        }
    }

    /// Field values come from the first matching descendant element; an
    /// attribute of the same name on the ticket fills anything left empty.
    fn raw_record(ticket: Node<'_, '_>) -> RawRecord {
        let mut raw = RawRecord::new();

        for element in ticket.descendants().skip(1).filter(|n| n.is_element()) {
            match resolve_field(element.tag_name().name()) {
                Some("tags") => raw.set_tags(Self::tags(element)),
                Some(field) => raw.insert(field, &Self::text_content(element)),
                None => {}
            }
        }

        for attribute in ticket.attributes() {
            match resolve_field(attribute.name()) {
                Some("tags") => raw.set_tags(split_tags(attribute.value())),
                Some(field) => raw.insert(field, attribute.value()),
                None => {}
            }
        }

        raw
    }
}

impl FileParser for XmlParser {
    fn parse(&self, data: &[u8]) -> Result<ParseOutcome> {
        let text = std::str::from_utf8(data).map_err(|e| container_failure("XML", e))?;
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let document =
            Document::parse_with_options(text, options).map_err(|e| container_failure("XML", e))?;

        let tickets = Self::ticket_nodes(&document);
        if tickets.is_empty() {
            tracing::error!("❌ No ticket elements found in XML file");
            return Err(IntakeError::Parse {
                message: "No ticket elements found in XML file".to_string(),
                total_records: 0,
                failed_records: Vec::new(),
            });
        }

        let mut outcome = ParseOutcome::default();
        for (index, ticket) in tickets.into_iter().enumerate() {
            let row_number = index + 1;
            let label = format!("Ticket {}", row_number);
            let raw = Self::raw_record(ticket);
            if raw.fields().is_empty() {
                let content = snippet(Self::text_content(ticket).trim());
                outcome.reject(row_number, &label, "Ticket element has no recognised fields", content);
            } else {
                outcome.accept(row_number, &label, raw);
            }
        }

        outcome.finish(self.supported_format())
    }

    fn supported_format(&self) -> &'static str {
        "XML"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Category;

    fn parse(input: &str) -> Result<ParseOutcome> {
        XmlParser::new().parse(input.as_bytes())
    }

    #[test]
    fn test_parse_tickets_in_container() {
        let input = r#"<?xml version="1.0" encoding="UTF-8"?>
<tickets>
  <ticket>
    <customer_id>C1</customer_id>
    <customer_email>a@example.com</customer_email>
    <customer_name>Ann</customer_name>
    <subject>Cannot login</subject>
    <description>Password reset does not work</description>
    <category>account access</category>
    <tags><tag>login</tag><tag> vip </tag></tags>
  </ticket>
  <ticket>
    <customerId>C2</customerId>
    <customerEmail>b@example.com</customerEmail>
    <customerName>Bob</customerName>
    <subject>Invoice</subject>
    <description>Invoice total looks wrong</description>
    <tags>billing, invoice</tags>
  </ticket>
</tickets>"#;

        let outcome = parse(input).unwrap();
        assert_eq!(outcome.records.len(), 2);
        let first = &outcome.records[0].request;
        assert_eq!(first.category, Some(Category::AccountAccess));
        assert!(first.tags.contains("vip"));
        assert_eq!(first.tags.len(), 2);

        let second = &outcome.records[1];
        assert_eq!(second.row_number, 2);
        assert_eq!(second.request.customer_id, "C2");
        assert!(second.request.tags.contains("invoice"));
    }

    #[test]
    fn test_attribute_fallback_and_capitalised_tag() {
        let input = r#"<Tickets>
  <Ticket customer_id="C9" customer_email="z@example.com">
    <customer_name>Zed</customer_name>
    <subject>Slow dashboard</subject>
    <description>The dashboard takes a minute to load</description>
  </Ticket>
</Tickets>"#;

        let outcome = parse(input).unwrap();
        let request = &outcome.records[0].request;
        assert_eq!(request.customer_id, "C9");
        assert_eq!(request.customer_email, "z@example.com");
    }

    #[test]
    fn test_missing_field_is_row_error() {
        let input = r#"<tickets>
  <ticket>
    <customer_id>C1</customer_id>
    <customer_email>a@example.com</customer_email>
    <customer_name>Ann</customer_name>
    <subject></subject>
    <description>Nothing in the subject line</description>
  </ticket>
  <ticket>
    <customer_id>C2</customer_id>
    <customer_email>b@example.com</customer_email>
    <customer_name>Bob</customer_name>
    <subject>Fine</subject>
    <description>This one is complete</description>
  </ticket>
</tickets>"#;

        let outcome = parse(input).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].row_number, 2);
        assert_eq!(
            outcome.errors[0].reason,
            "Ticket 1: Missing required field: subject"
        );
    }

    #[test]
    fn test_doctype_is_accepted() {
        let input = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE tickets>
<tickets>
  <ticket>
    <customer_id>C1</customer_id>
    <customer_email>a@example.com</customer_email>
    <customer_name>Ann</customer_name>
    <subject>Cannot login</subject>
    <description>Password reset does not work</description>
  </ticket>
</tickets>"#;

        let outcome = parse(input).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].row_number, 1);
        assert_eq!(outcome.records[0].request.customer_id, "C1");
    }

    #[test]
    fn test_no_ticket_elements_is_container_failure() {
        let err = parse("<orders><order/></orders>").unwrap_err();
        match err {
            IntakeError::Parse { message, .. } => {
                assert_eq!(message, "No ticket elements found in XML file")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_xml_is_container_failure() {
        let err = parse("<tickets><ticket></tickets>").unwrap_err();
        assert!(matches!(err, IntakeError::Parse { .. }));
    }
}
