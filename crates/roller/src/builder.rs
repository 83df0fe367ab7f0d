//! Writer Builder
//!
//! Converts the `[writer]` configuration section into a `WriterConfig` ready
//! for `RotatingWriter::open`.

use anyhow::{Result, bail};
use bytes::Bytes;
use roller_config::{ActionConfig, Layout, RotationConfig, SizeUnit, WriterSection};
use roller_sinks::{
    CountRotationPolicy, CountSyncPolicy, DefaultFileNameFormat, DelimitedRecordFormat,
    FileNameFormat, FileSizeRotationPolicy, MoveFileAction, RotationAction, RotationPolicy,
    SyncPolicy, TimeBucket, TimeBucketFileNameFormat, TimedRotationPolicy, TimedSyncPolicy,
    WriterConfig,
};
use tracing::info;

/// Build the writer configuration from a validated section
pub fn build_writer_config(section: &WriterSection) -> Result<WriterConfig> {
    let config = WriterConfig {
        id: section.id.clone(),
        file_name_format: build_file_name_format(section),
        record_format: Box::new(build_record_format(section)),
        sync_policy: build_sync_policy(section)?,
        rotation_policy: build_rotation_policy(&section.rotation),
        actions: section.actions.iter().map(build_action).collect(),
    };

    info!(
        writer = %section.id,
        path = %section.path,
        layout = ?section.layout,
        rotation = section.rotation.type_name(),
        actions = config.actions.len(),
        "configured writer"
    );

    Ok(config)
}

fn build_file_name_format(section: &WriterSection) -> Box<dyn FileNameFormat> {
    let bucket = match section.layout {
        Layout::Flat => {
            return Box::new(
                DefaultFileNameFormat::new(&section.path)
                    .with_prefix(section.prefix.as_str())
                    .with_extension(section.extension.as_str()),
            );
        }
        Layout::Daily => TimeBucket::Daily,
        Layout::Hourly => TimeBucket::Hourly,
    };

    Box::new(
        TimeBucketFileNameFormat::new(&section.path, bucket)
            .with_prefix(section.prefix.as_str())
            .with_extension(section.extension.as_str()),
    )
}

fn build_record_format(section: &WriterSection) -> DelimitedRecordFormat {
    let format = DelimitedRecordFormat::new()
        .with_field_delimiter(Bytes::from(section.field_delimiter.clone()))
        .with_record_delimiter(Bytes::from(section.record_delimiter.clone()));

    match &section.fields {
        Some(fields) => format.with_fields(fields.clone()),
        None => format,
    }
}

fn build_sync_policy(section: &WriterSection) -> Result<Box<dyn SyncPolicy>> {
    match (section.sync.count, section.sync.interval) {
        (Some(count), None) => Ok(Box::new(CountSyncPolicy::new(count))),
        (None, Some(interval)) => Ok(Box::new(TimedSyncPolicy::new(interval))),
        _ => bail!("writer '{}' needs exactly one sync trigger", section.id),
    }
}

fn build_rotation_policy(rotation: &RotationConfig) -> Box<dyn RotationPolicy> {
    match *rotation {
        RotationConfig::Size { size, unit } => {
            Box::new(FileSizeRotationPolicy::new(size, size_unit(unit)))
        }
        RotationConfig::Count { count } => Box::new(CountRotationPolicy::new(count)),
        RotationConfig::Timed { interval } => Box::new(TimedRotationPolicy::new(interval)),
    }
}

fn size_unit(unit: SizeUnit) -> roller_sinks::SizeUnit {
    match unit {
        SizeUnit::Kb => roller_sinks::SizeUnit::Kb,
        SizeUnit::Mb => roller_sinks::SizeUnit::Mb,
        SizeUnit::Gb => roller_sinks::SizeUnit::Gb,
        SizeUnit::Tb => roller_sinks::SizeUnit::Tb,
    }
}

fn build_action(action: &ActionConfig) -> Box<dyn RotationAction> {
    match action {
        ActionConfig::Move { dest } => Box::new(MoveFileAction::new(dest)),
    }
}
