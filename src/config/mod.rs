pub mod schema;

pub use schema::{
    Config, GatewayConfig, LimitsConfig, PaletteConfig, UploadsConfig, VisionConfig,
};
