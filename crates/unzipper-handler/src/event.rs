//! COS PutObject notifications and archive selection.

use serde::{Deserialize, Serialize};
use unzipper_core::constants::NESTED_ARCHIVE_EXTENSION;
use unzipper_core::Config;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CosEvent {
    #[serde(rename = "Records", default)]
    pub records: Option<Vec<CosRecord>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CosRecord {
    #[serde(default)]
    pub cos: CosInfo,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CosInfo {
    #[serde(rename = "cosBucket", default)]
    pub cos_bucket: CosBucket,
    #[serde(rename = "cosObject", default)]
    pub cos_object: CosObject,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CosBucket {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CosObject {
    #[serde(default)]
    pub key: Option<String>,
}

impl CosEvent {
    /// Event with a single record, as COS would send for one upload.
    pub fn single(bucket: Option<String>, key: impl Into<String>) -> Self {
        Self {
            records: Some(vec![CosRecord {
                cos: CosInfo {
                    cos_bucket: CosBucket { name: bucket },
                    cos_object: CosObject {
                        key: Some(key.into()),
                    },
                },
            }]),
        }
    }

    pub fn records(&self) -> &[CosRecord] {
        self.records.as_deref().unwrap_or_default()
    }
}

/// A key as it arrived (decoded) and after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeenKey {
    pub raw: String,
    pub normalized: String,
}

/// What the handler learned from an event.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// First non-empty bucket name in the records, else the configured bucket.
    pub bucket: Option<String>,
    /// First archive key under the input prefix.
    pub archive_key: Option<String>,
    /// Every key examined, in record order, up to and including the selected one.
    pub seen: Vec<SeenKey>,
}

/// Fully URL-decode an object key: `+` is a space, then percent escapes.
pub fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

fn is_app_id(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}

/// Strip a leading `/` and a leading `<appid>/<bucket>/` from a decoded key.
///
/// The bucket segment matches either the full bucket name or its short name
/// (the part before the first `-`).
pub fn normalize_key(decoded: &str, bucket: Option<&str>) -> String {
    let key = decoded.trim_start_matches('/');
    let parts: Vec<&str> = key.split('/').collect();

    if parts.len() >= 3 && is_app_id(parts[0]) {
        if let Some(bucket) = bucket.filter(|b| !b.is_empty()) {
            let short = bucket.split('-').next().unwrap_or(bucket);
            if parts[1] == bucket || parts[1] == short {
                return parts[2..].join("/");
            }
        }
    }
    key.to_string()
}

fn is_archive_key(key: &str, input_prefix: &str) -> bool {
    let lower = key.to_lowercase();
    lower.ends_with(NESTED_ARCHIVE_EXTENSION) && (input_prefix.is_empty() || key.starts_with(input_prefix))
}

/// Walk the records and pick the archive to extract.
pub fn select_archive(event: &CosEvent, config: &Config) -> Selection {
    let mut selection = Selection::default();

    for record in event.records() {
        if selection.bucket.is_none() {
            selection.bucket = record
                .cos
                .cos_bucket
                .name
                .clone()
                .filter(|name| !name.is_empty())
                .or_else(|| config.cos_bucket.clone());
        }

        let raw = decode_key(record.cos.cos_object.key.as_deref().unwrap_or_default());
        let key = normalize_key(&raw, selection.bucket.as_deref());
        selection.seen.push(SeenKey {
            raw,
            normalized: key.clone(),
        });

        // Folder markers
        if key.is_empty() || key.ends_with('/') {
            continue;
        }
        // Our own output would otherwise trigger another extraction.
        if !config.output_prefix.is_empty() && key.starts_with(&config.output_prefix) {
            continue;
        }
        if is_archive_key(&key, &config.input_prefix) {
            selection.archive_key = Some(key);
            break;
        }
    }

    selection
}

/// Recover the full `<bucket>-<appid>` name.
///
/// A short candidate is completed from a raw key of the form
/// `/<appid>/<bucket>/...`; a configured bucket already in full form wins.
pub fn resolve_bucket(candidate: &str, seen: &[SeenKey], configured: Option<&str>) -> String {
    if let Some(configured) = configured.filter(|b| b.contains('-')) {
        return configured.to_string();
    }

    if !candidate.is_empty() && !candidate.contains('-') {
        for key in seen.iter().filter(|k| k.raw.starts_with('/')) {
            let mut parts = key.raw.trim_matches('/').split('/');
            if let (Some(app_id), Some(bucket)) = (parts.next(), parts.next()) {
                if is_app_id(app_id) && bucket == candidate {
                    return format!("{}-{}", bucket, app_id);
                }
            }
        }
    }

    candidate.to_string()
}

/// `join(output_prefix, basename without .zip)`
pub fn destination_prefix(output_prefix: &str, archive_key: &str) -> String {
    let base = archive_key.rsplit('/').next().unwrap_or(archive_key);
    let split = base.len().saturating_sub(NESTED_ARCHIVE_EXTENSION.len());
    let stem = match base.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(NESTED_ARCHIVE_EXTENSION) => &base[..split],
        _ => base,
    };
    unzipper_storage::join_key(output_prefix, stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned()).unwrap()
    }

    fn event(records: &[(Option<&str>, &str)]) -> CosEvent {
        CosEvent {
            records: Some(
                records
                    .iter()
                    .map(|(bucket, key)| {
                        CosEvent::single(bucket.map(str::to_string), *key)
                            .records
                            .unwrap_or_default()
                            .remove(0)
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn decode_handles_plus_and_percent() {
        assert_eq!(decode_key("uploads/my+file%20v2.zip"), "uploads/my file v2.zip");
        assert_eq!(decode_key("uploads/%E4%B8%AD%E6%96%87.zip"), "uploads/中文.zip");
        assert_eq!(decode_key("uploads/a%2Bb.zip"), "uploads/a+b.zip");
        // Invalid UTF-8 is replaced rather than rejected.
        assert_eq!(decode_key("uploads/%FF.zip"), "uploads/\u{FFFD}.zip");
    }

    #[test]
    fn normalize_strips_appid_and_bucket() {
        assert_eq!(
            normalize_key("/1250000000/media/uploads/a.zip", Some("media-1250000000")),
            "uploads/a.zip"
        );
        assert_eq!(
            normalize_key("/1250000000/media-1250000000/uploads/a.zip", Some("media-1250000000")),
            "uploads/a.zip"
        );
        assert_eq!(normalize_key("/uploads/a.zip", Some("media")), "uploads/a.zip");
        // Different bucket segment: only the leading slash goes.
        assert_eq!(
            normalize_key("/1250000000/other/uploads/a.zip", Some("media")),
            "1250000000/other/uploads/a.zip"
        );
        // Too few segments.
        assert_eq!(normalize_key("/1250000000/media", Some("media")), "1250000000/media");
        assert_eq!(normalize_key("/1250000000/media/a.zip", None), "1250000000/media/a.zip");
    }

    #[test]
    fn select_first_archive_under_input_prefix() {
        let cfg = config(&[]);
        let ev = event(&[
            (Some("media"), "uploads/notes.txt"),
            (Some("media"), "other/skip.zip"),
            (Some("media"), "uploads/first.ZIP"),
            (Some("media"), "uploads/second.zip"),
        ]);

        let selection = select_archive(&ev, &cfg);
        assert_eq!(selection.bucket.as_deref(), Some("media"));
        assert_eq!(selection.archive_key.as_deref(), Some("uploads/first.ZIP"));
        assert_eq!(selection.seen.len(), 3);
    }

    #[test]
    fn select_skips_folder_markers_and_output_prefix() {
        let cfg = config(&[("INPUT_PREFIX", "")]);
        let ev = event(&[
            (Some("media"), "uploads/"),
            (Some("media"), "extracted/a/inner.zip"),
        ]);

        let selection = select_archive(&ev, &cfg);
        assert!(selection.archive_key.is_none());
        assert_eq!(selection.seen.len(), 2);
    }

    #[test]
    fn bucket_falls_back_to_configuration() {
        let cfg = config(&[("COS_BUCKET", "media-1250000000")]);
        let ev = event(&[(None, "uploads/a.zip")]);
        let selection = select_archive(&ev, &cfg);
        assert_eq!(selection.bucket.as_deref(), Some("media-1250000000"));

        let selection = select_archive(&event(&[(Some(""), "uploads/a.zip")]), &config(&[]));
        assert!(selection.bucket.is_none());
    }

    #[test]
    fn resolve_completes_short_bucket_from_raw_key() {
        let seen = vec![SeenKey {
            raw: "/1250000000/media/uploads/a.zip".to_string(),
            normalized: "uploads/a.zip".to_string(),
        }];
        assert_eq!(resolve_bucket("media", &seen, None), "media-1250000000");
        assert_eq!(resolve_bucket("media", &[], None), "media");
        assert_eq!(
            resolve_bucket("media-1250000000", &seen, None),
            "media-1250000000"
        );
    }

    #[test]
    fn configured_full_bucket_always_wins() {
        assert_eq!(
            resolve_bucket("media", &[], Some("archive-1300000000")),
            "archive-1300000000"
        );
        // A short configured name does not override the event.
        assert_eq!(resolve_bucket("media-1", &[], Some("short")), "media-1");
    }

    #[test]
    fn destination_prefix_drops_directories_and_extension() {
        assert_eq!(
            destination_prefix("extracted/", "uploads/2024/Report.ZIP"),
            "extracted/Report"
        );
        assert_eq!(destination_prefix("", "uploads/a.zip"), "a");
    }

    #[test]
    fn deserializes_cos_notification() {
        let json = r#"{"Records":[{"cos":{"cosBucket":{"name":"media"},"cosObject":{"key":"/1250000000/media/uploads/a.zip","size":12}},"event":{"eventName":"cos:ObjectCreated:Put"}}]}"#;
        let ev: CosEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev.records().len(), 1);
        assert_eq!(ev.records()[0].cos.cos_bucket.name.as_deref(), Some("media"));

        let ev: CosEvent = serde_json::from_str(r#"{"Records":null}"#).unwrap();
        assert!(ev.records().is_empty());
    }
}
