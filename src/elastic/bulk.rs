//! NDJSON encoding for the `_bulk` endpoint.

use crate::documents::OutputDocument;
use serde_json::json;

/// Encode documents as `index` actions, one action line and one source line each.
pub(crate) fn encode_bulk_body(documents: &[OutputDocument]) -> Result<String, serde_json::Error> {
    let mut body = String::new();
    for document in documents {
        let action = json!({
            "index": {
                "_index": document.kind().index_name(),
                "_id": document.document_id(),
            }
        });
        let source = document.to_source()?;
        body.push_str(&action.to_string());
        body.push('\n');
        body.push_str(&source.to_string());
        body.push('\n');
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{Abstract, BaseFields, Paper};
    use serde_json::Value;

    fn base(uid: &str) -> BaseFields {
        BaseFields {
            cord_uid: uid.into(),
            title: "Title".into(),
            publish_time: "2020-03-01".into(),
            url: "https://example.org".into(),
            journal: "Journal".into(),
            authors: "Author".into(),
            abstract_text: None,
        }
    }

    #[test]
    fn each_document_becomes_action_and_source_lines() {
        let documents = vec![
            OutputDocument::Paper(Paper {
                base: base("p1"),
                body: "covid body\nsecond line".into(),
            }),
            OutputDocument::Abstract(Abstract {
                base: base("p1"),
                body: "abstract".into(),
            }),
        ];
        let body = encode_bulk_body(&documents).expect("encode");
        assert!(body.ends_with('\n'));

        let lines: Vec<Value> = body
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["index"]["_index"], "papers");
        assert_eq!(lines[0]["index"]["_id"], "p1");
        assert_eq!(lines[1]["body"], "covid body\nsecond line");
        assert_eq!(lines[2]["index"]["_index"], "abstracts");
        assert_eq!(lines[3]["body"], "abstract");
    }

    #[test]
    fn empty_batch_encodes_to_empty_body() {
        assert_eq!(encode_bulk_body(&[]).expect("encode"), "");
    }
}
