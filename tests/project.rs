#[path = "project/config_schema.rs"]
mod config_schema;
#[path = "project/palette_pipeline.rs"]
mod palette_pipeline;
