pub mod config;
pub mod converter;
pub mod destination;
pub mod engine;
pub mod metrics;
pub mod notifier;
pub mod orchestrator;
pub mod testing;
pub mod util;
pub mod volumes;
pub mod watcher;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ConversionConfig,
    DestinationConfig, DestinationMode, NasConfig, SourceConfig, SourceMode,
};
pub use converter::{ConversionOutcome, Converter, ConverterError, ScriptConverter};
pub use destination::{DestinationError, DestinationResolver, Mounter};
pub use engine::{Engine, EngineCapabilities, EngineError, EngineHandle, EngineStatus};
pub use notifier::{LogNotifier, Notifier, OsaScriptNotifier};
pub use orchestrator::{
    ConversionJob, ConversionOrchestrator, OrchestratorConfig, OrchestratorStatus,
};
pub use volumes::{VolumeDescriptor, VolumeEnumerator, VolumeError, VolumeEvent, VolumeRegistry};
pub use watcher::{ReadyFile, RootOrigin, StabilityTracker, WatchError, WatchRootManager};
