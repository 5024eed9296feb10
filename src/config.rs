//! Configuration management for selftime

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{ProfilerError, ProfilerResult};
use crate::profiling::{
    Clock, MonotonicClock, NoopProfiler, NullObserver, OutputFormat, Profiler, TimerProfiler,
    TracingObserver,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilingConfig {
    pub enabled: bool,
    pub log_events: bool,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_events: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentConfig {
    pub verbose_logging: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    pub profiling: ProfilingConfig,
    pub output: OutputConfig,
    pub development: DevelopmentConfig,
}

impl ProfilerConfig {
    /// Real profiler when profiling is enabled, `NoopProfiler` otherwise.
    pub fn build_profiler(&self) -> Box<dyn TimerProfiler> {
        self.build_profiler_with_clock(MonotonicClock::new())
    }

    pub fn build_profiler_with_clock<C: Clock + 'static>(&self, clock: C) -> Box<dyn TimerProfiler> {
        if !self.profiling.enabled {
            return Box::new(NoopProfiler);
        }
        let profiler = Profiler::with_clock(clock);
        if self.profiling.log_events {
            Box::new(profiler.with_observer(TracingObserver))
        } else {
            Box::new(profiler.with_observer(NullObserver))
        }
    }
}

/// Loads, saves and edits a `ProfilerConfig`
#[derive(Debug, Default)]
pub struct ConfigManager {
    config: ProfilerConfig,
    config_file: Option<PathBuf>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_file = Some(path);
        self
    }

    pub fn load_from_file(&mut self, path: &Path) -> ProfilerResult<()> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ProfilerError::config_error("Failed to read config file", e))?;

        let config: ProfilerConfig = serde_json::from_str(&content)
            .map_err(|e| ProfilerError::config_error("Failed to parse config file", e))?;

        self.config = config;
        self.config_file = Some(path.to_path_buf());

        tracing::info!("Configuration loaded from {:?}", path);
        Ok(())
    }

    pub fn save_to_file(&self, path: &Path) -> ProfilerResult<()> {
        let content = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(path, content)?;

        tracing::info!("Configuration saved to {:?}", path);
        Ok(())
    }

    pub fn get_config(&self) -> &ProfilerConfig {
        &self.config
    }

    pub fn update_config<F>(&mut self, f: F) -> ProfilerResult<()>
    where
        F: FnOnce(&mut ProfilerConfig),
    {
        f(&mut self.config);

        // Save to file if configured
        if let Some(ref path) = self.config_file {
            self.save_to_file(path)?;
        }

        Ok(())
    }
}

/// Fluent construction of a `ProfilerConfig`
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: ProfilerConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profiling(mut self, f: impl FnOnce(&mut ProfilingConfig)) -> Self {
        f(&mut self.config.profiling);
        self
    }

    pub fn output(mut self, f: impl FnOnce(&mut OutputConfig)) -> Self {
        f(&mut self.config.output);
        self
    }

    pub fn development(mut self, f: impl FnOnce(&mut DevelopmentConfig)) -> Self {
        f(&mut self.config.development);
        self
    }

    pub fn build(self) -> ProfilerConfig {
        self.config
    }
}
