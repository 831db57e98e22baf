//! XML Parser Module
//!
//! This module parses DMARC aggregate-report XML and extracts one authentication
//! record per `<record>` element. It enforces a recursion depth limit to protect
//! against attacks such as the Billion Laughs attack. Moreover, it completely
//! disables the processing of DOCTYPE declarations (and hence external/internal
//! entities) by removing any DOCTYPE block from the input. If a DOCTYPE block
//! contains two or more entity definitions, the XML is rejected.

use crate::error::{DmarcError, Result};
use crate::models::{AuthRecord, Disposition, DkimVerdict, SpfVerdict};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// Parses DMARC aggregate-report XML content into authentication records.
///
/// The sequence length equals the number of `<record>` elements in the
/// document; no record is dropped once the document is confirmed well-formed.
/// Missing SPF/DKIM/disposition values default to `none`, a missing
/// `header_from` defaults to `"unknown"`, and a missing or unparsable
/// `count` defaults to 1.
///
/// # Errors
///
/// Returns an error if the XML cannot be parsed, if the recursion depth limit
/// is exceeded, or if the DOCTYPE block (if present) defines two or more
/// entity definitions.
pub fn parse_report(xml_content: &str) -> Result<Vec<AuthRecord>> {
    // Check if the XML contains a DOCTYPE declaration.
    // If found, extract and inspect the DOCTYPE block.
    // If the DOCTYPE defines two or more entities, reject the XML.
    // Otherwise, remove the DOCTYPE block entirely.
    let cleaned_xml = if let Some(start) = xml_content.find("<!DOCTYPE") {
        if let Some(end) = xml_content[start..].find("]>") {
            let doctype = &xml_content[start..start + end + 2];
            let entity_count = doctype.matches("<!ENTITY").count();
            if entity_count >= 2 {
                return Err(DmarcError::Format("Recursive entities detected".into()));
            }
            let before = &xml_content[..start];
            let after = &xml_content[start + end + 2..];
            format!("{}{}", before, after)
        } else {
            // If we cannot find the end of the DOCTYPE, use the original XML.
            xml_content.to_string()
        }
    } else {
        xml_content.to_string()
    };

    let mut reader = Reader::from_str(&cleaned_xml);
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut current_record: Option<AuthRecord> = None;
    let mut depth: u32 = 0;
    let max_depth = 20; // Prevent excessive recursion

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                if depth > max_depth {
                    return Err(DmarcError::Format(
                        "XML recursion depth limit exceeded".into(),
                    ));
                }
                match e.name().as_ref() {
                    b"record" => {
                        current_record = Some(AuthRecord {
                            source_ip: String::new(),
                            count: 1,
                            header_from: "unknown".to_string(),
                            spf: SpfVerdict::None,
                            dkim: DkimVerdict::None,
                            disposition: Disposition::None,
                        });
                    }
                    b"source_ip" => {
                        if let Some(record) = current_record.as_mut() {
                            record.source_ip = reader.read_text(e.name())?.trim().to_string();
                            // read_text consumed the matching end tag
                            depth = depth.saturating_sub(1);
                        }
                    }
                    b"count" => {
                        if let Some(record) = current_record.as_mut() {
                            let parsed: u32 =
                                reader.read_text(e.name())?.trim().parse().unwrap_or(1);
                            record.count = parsed.max(1);
                            depth = depth.saturating_sub(1);
                        }
                    }
                    b"header_from" => {
                        if let Some(record) = current_record.as_mut() {
                            let domain = reader.read_text(e.name())?.trim().to_string();
                            if !domain.is_empty() {
                                record.header_from = domain;
                            }
                            depth = depth.saturating_sub(1);
                        }
                    }
                    b"policy_evaluated" => {
                        if let Some(record) = current_record.as_mut() {
                            parse_policy_evaluated(&mut reader, record)?;
                            depth = depth.saturating_sub(1);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"record" {
                    if let Some(record) = current_record.take() {
                        records.push(record);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DmarcError::Xml(e)),
            _ => (),
        }
    }

    Ok(records)
}

/// Parses the `<policy_evaluated>` element into the current record.
///
/// Consuming this subtree here keeps the top-level loop from confusing the
/// policy-evaluated `<spf>`/`<dkim>` verdicts with the raw `<auth_results>`
/// entries that use the same element names.
fn parse_policy_evaluated(reader: &mut Reader<&[u8]>, record: &mut AuthRecord) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"disposition" => {
                    let text = reader.read_text(e.name())?.trim().to_string();
                    record.disposition = text.parse().unwrap_or(Disposition::None);
                }
                b"dkim" => {
                    let text = reader.read_text(e.name())?.trim().to_string();
                    record.dkim = text.parse().unwrap_or(DkimVerdict::None);
                }
                b"spf" => {
                    let text = reader.read_text(e.name())?.trim().to_string();
                    record.spf = text.parse().unwrap_or(SpfVerdict::None);
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"policy_evaluated" {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DmarcError::Xml(e)),
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
    <feedback>
        <record>
            <row>
                <source_ip>192.0.2.10</source_ip>
                <count>12</count>
                <policy_evaluated>
                    <disposition>quarantine</disposition>
                    <dkim>fail</dkim>
                    <spf>pass</spf>
                </policy_evaluated>
            </row>
            <identifiers>
                <header_from>example.com</header_from>
            </identifiers>
        </record>
        <record>
            <row>
                <source_ip>198.51.100.7</source_ip>
                <count>3</count>
                <policy_evaluated>
                    <disposition>reject</disposition>
                    <dkim>fail</dkim>
                    <spf>fail</spf>
                </policy_evaluated>
            </row>
            <identifiers>
                <header_from>other.org</header_from>
            </identifiers>
        </record>
    </feedback>
    "#;

    #[test]
    fn test_parse_sample_report() {
        let records = parse_report(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].source_ip, "192.0.2.10");
        assert_eq!(records[0].count, 12);
        assert_eq!(records[0].header_from, "example.com");
        assert_eq!(records[0].spf, SpfVerdict::Pass);
        assert_eq!(records[0].dkim, DkimVerdict::Fail);
        assert_eq!(records[0].disposition, Disposition::Quarantine);

        assert_eq!(records[1].header_from, "other.org");
        assert_eq!(records[1].disposition, Disposition::Reject);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let xml = r#"
        <feedback>
            <record>
                <row>
                    <source_ip>203.0.113.4</source_ip>
                </row>
            </record>
        </feedback>
        "#;
        let records = parse_report(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].count, 1);
        assert_eq!(records[0].header_from, "unknown");
        assert_eq!(records[0].spf, SpfVerdict::None);
        assert_eq!(records[0].dkim, DkimVerdict::None);
        assert_eq!(records[0].disposition, Disposition::None);
    }

    #[test]
    fn test_auth_results_do_not_override_policy_verdicts() {
        // The raw auth_results section reuses the spf/dkim element names with
        // a nested structure; only policy_evaluated verdicts must be read.
        let xml = r#"
        <feedback>
            <record>
                <row>
                    <source_ip>192.0.2.1</source_ip>
                    <count>2</count>
                    <policy_evaluated>
                        <disposition>none</disposition>
                        <dkim>pass</dkim>
                        <spf>fail</spf>
                    </policy_evaluated>
                </row>
                <identifiers>
                    <header_from>example.net</header_from>
                </identifiers>
                <auth_results>
                    <spf>
                        <domain>mailer.example.net</domain>
                        <result>pass</result>
                    </spf>
                    <dkim>
                        <domain>example.net</domain>
                        <result>fail</result>
                    </dkim>
                </auth_results>
            </record>
        </feedback>
        "#;
        let records = parse_report(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].spf, SpfVerdict::Fail);
        assert_eq!(records[0].dkim, DkimVerdict::Pass);
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        let result = parse_report("<feedback><record><row></feedback>");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_document_yields_no_records() {
        let records = parse_report("<feedback></feedback>").unwrap();
        assert!(records.is_empty());
    }
}
