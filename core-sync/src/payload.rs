//! Record payload builder
//!
//! Turns a [`MediaItem`] into the store-agnostic [`RecordPayload`]. Store
//! field and option identifiers come from the injected [`RecordSchema`].

use bridge_traits::record::RecordPayload;
use chrono::SecondsFormat;
use core_media::{MediaItem, MediaType};
use core_runtime::config::RecordSchema;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct RecordPayloadBuilder {
    schema: RecordSchema,
}

impl RecordPayloadBuilder {
    pub fn new(schema: RecordSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn build(&self, item: &MediaItem) -> RecordPayload {
        let link = item.best_link().to_string();
        let original_timestamp = item.original_uploaded_at;
        let mut custom_fields = BTreeMap::new();

        if let Some(field_id) = &self.schema.link_field_id {
            custom_fields.insert(field_id.clone(), Value::String(link.clone()));
        }

        if let (Some(field_id), Some(timestamp)) =
            (&self.schema.original_date_field_id, original_timestamp)
        {
            custom_fields.insert(
                field_id.clone(),
                Value::String(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }

        if let (Some(field_id), Some(option_id)) = (
            &self.schema.media_type_field_id,
            self.media_option(item.media_type),
        ) {
            custom_fields.insert(field_id.clone(), Value::String(option_id.to_string()));
        }

        RecordPayload {
            title: item.file_name.clone(),
            description: Some(format!("<a href=\"{0}\">{0}</a>", link)),
            link,
            media_tag: item.media_type.tag().to_string(),
            original_timestamp,
            tags: vec![item.media_type.tag().to_string()],
            custom_fields,
            project_id: self.schema.project_id.clone(),
        }
    }

    fn media_option(&self, media_type: MediaType) -> Option<&str> {
        match media_type {
            MediaType::Photo => self.schema.photo_option_id.as_deref(),
            MediaType::Video => self.schema.video_option_id.as_deref(),
            MediaType::Unknown => None,
        }
    }
}
